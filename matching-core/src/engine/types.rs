use mimalloc::MiMalloc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Trading symbol (e.g. "BTC-USDT"). A thin newtype so book/engine keys
/// can't be confused with arbitrary strings at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Symbol(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol(s)
    }
}

/// OrderId is the stable identifier assigned to an order on admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        OrderId(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// TradeId is the unique identifier assigned to each trade execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub Uuid);

impl TradeId {
    pub fn new() -> Self {
        TradeId(Uuid::new_v4())
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Side indicates the direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side of the book a taker on this side matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// OrderType determines how the order is routed by the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Executes immediately against the book with no price bound; any
    /// unfilled remainder is discarded, never rests.
    Market,
    /// Executes against marketable liquidity at admission; any remainder
    /// rests on the book at the order's limit price.
    Limit,
    /// Immediate-or-cancel: like Limit, but any remainder is cancelled
    /// instead of resting.
    Ioc,
    /// Fill-or-kill: fills the entire quantity immediately or is cancelled
    /// with no fills at all.
    Fok,
}

impl OrderType {
    /// Limit orders are the only type allowed to rest on the book.
    pub fn can_rest(self) -> bool {
        matches!(self, OrderType::Limit)
    }

    /// Market orders carry no limit price; all other types require one.
    pub fn requires_price(self) -> bool {
        !matches!(self, OrderType::Market)
    }
}

/// OrderStatus represents the current lifecycle state of an order.
///
/// Transitions form a DAG: `Pending -> {PartiallyFilled, Filled, Cancelled,
/// Rejected}`, `PartiallyFilled -> {Filled, Cancelled}`. `Filled`,
/// `Cancelled`, and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// An order as held by the engine. Mutated only by the task that owns its
/// symbol's lock (see `SymbolBook`); never shared across symbols.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub original_quantity: Decimal,
    pub filled_quantity: Decimal,
    pub price: Option<Decimal>,
    pub status: OrderStatus,
    /// Strictly monotonic admission sequence, used as the FIFO tie-breaker
    /// within a price level. Not derived from wall-clock time.
    pub sequence: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub user_id: Option<String>,
}

impl Order {
    pub fn remaining_quantity(&self) -> Decimal {
        self.original_quantity - self.filled_quantity
    }

    pub fn is_resting_eligible(&self) -> bool {
        self.order_type.can_rest()
            && matches!(self.status, OrderStatus::Pending | OrderStatus::PartiallyFilled)
            && self.remaining_quantity() > Decimal::ZERO
    }

    /// Applies a fill of `quantity` to this order and updates its status.
    /// `quantity` must not exceed `remaining_quantity()`.
    pub fn apply_fill(&mut self, quantity: Decimal) {
        debug_assert!(quantity > Decimal::ZERO);
        debug_assert!(quantity <= self.remaining_quantity());
        self.filled_quantity += quantity;
        self.status = if self.remaining_quantity() == Decimal::ZERO {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// The JSON wire representation described by the transport contract:
    /// decimals as strings, status/side/type as lowercase tags.
    pub fn to_wire(&self) -> WireOrder {
        WireOrder {
            order_id: self.id,
            symbol: self.symbol.clone(),
            side: self.side,
            order_type: self.order_type,
            quantity: self.original_quantity,
            price: self.price,
            filled_quantity: self.filled_quantity,
            remaining_quantity: self.remaining_quantity(),
            status: self.status,
            timestamp: self.created_at,
            user_id: self.user_id.clone(),
        }
    }
}

/// Role played by an order in a matched trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeRole {
    Maker,
    Taker,
}

/// An immutable record of one matched fill. Always priced at the resting
/// (maker) order's limit price -- price improvement accrues to the taker.
#[derive(Debug, Clone)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: Symbol,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Trade {
    pub fn to_wire(&self) -> WireTradeExecution {
        WireTradeExecution {
            trade_id: self.id,
            symbol: self.symbol.clone(),
            price: self.price,
            quantity: self.quantity,
            aggressor_side: self.aggressor_side,
            maker_order_id: self.maker_order_id,
            taker_order_id: self.taker_order_id,
            timestamp: self.timestamp,
            fee: None,
        }
    }
}

/// (price, aggregate_quantity, order_count) snapshot of one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub quantity: Decimal,
    pub order_count: usize,
}

/// Derived best-bid/best-ask view of a symbol book.
#[derive(Debug, Clone)]
pub struct BestBidOffer {
    pub symbol: Symbol,
    pub best_bid: Option<Level>,
    pub best_ask: Option<Level>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl BestBidOffer {
    pub fn to_wire(&self) -> WireBbo {
        WireBbo {
            symbol: self.symbol.clone(),
            best_bid: self.best_bid,
            best_ask: self.best_ask,
            timestamp: self.timestamp,
        }
    }
}

/// Full depth snapshot of a symbol book, best to worst on each side.
#[derive(Debug, Clone)]
pub struct OrderBookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl OrderBookSnapshot {
    pub fn to_wire(&self) -> WireSnapshot {
        WireSnapshot {
            symbol: self.symbol.clone(),
            bids: self.bids.clone(),
            asks: self.asks.clone(),
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order {
            id: OrderId::new(),
            symbol: Symbol::from("BTC-USDT"),
            side: Side::Buy,
            order_type: OrderType::Limit,
            original_quantity: Decimal::new(10, 0),
            filled_quantity: Decimal::ZERO,
            price: Some(Decimal::new(50_000, 0)),
            status: OrderStatus::Pending,
            sequence: 1,
            created_at: chrono::Utc::now(),
            user_id: None,
        }
    }

    #[test]
    fn remaining_quantity_tracks_fills() {
        let mut order = sample_order();
        assert_eq!(order.remaining_quantity(), Decimal::new(10, 0));
        order.apply_fill(Decimal::new(4, 0));
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining_quantity(), Decimal::new(6, 0));
        order.apply_fill(Decimal::new(6, 0));
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.remaining_quantity(), Decimal::ZERO);
    }

    #[test]
    fn resting_eligibility_excludes_other_types_and_terminal_states() {
        let mut order = sample_order();
        assert!(order.is_resting_eligible());

        order.order_type = OrderType::Ioc;
        assert!(!order.is_resting_eligible());

        order.order_type = OrderType::Limit;
        order.status = OrderStatus::Cancelled;
        assert!(!order.is_resting_eligible());
    }
}
