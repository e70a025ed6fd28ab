//! The matching engine: validation, per-type routing, the price-time
//! matching walk, event emission, and per-symbol serialization.

use super::config::EngineConfig;
use super::error::{EngineError, EngineResult};
use super::sinks::{MarketDataSink, TradeSink};
use super::symbol_book::SymbolBook;
use super::types::{
    BestBidOffer, Order, OrderBookSnapshot, OrderId, OrderStatus, OrderType, Side, Symbol, Trade,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

/// An unvalidated order submission, as received from the transport layer.
/// The engine assigns the id, admission sequence, and creation timestamp;
/// none of those are caller-supplied.
#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub user_id: Option<String>,
}

/// The result of a successful `submit`. A rejection is never represented
/// here -- it is an `Err(EngineError)`, since a rejected order is never
/// admitted and is assigned no id.
#[derive(Debug, Clone)]
pub struct SubmitAck {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub fills: Vec<Trade>,
    pub filled_qty: Decimal,
    pub remaining_qty: Decimal,
}

#[derive(Debug, Clone)]
pub struct CancelAck {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Output of a single matching-walk pass: the trades it produced and
/// whether the book's resting state changed (and so a BBO update is due).
struct MatchOutcome {
    fills: Vec<Trade>,
    book_changed: bool,
}

/// The per-symbol-serialized core engine. Each symbol's book lives behind
/// its own `tokio::sync::Mutex`, so two symbols can match concurrently
/// while a single symbol is strictly serialized. The `order_index` is a
/// routing-only map shared across symbols; the orders themselves are owned
/// and mutated only by the task holding their symbol's lock.
pub struct Engine {
    config: EngineConfig,
    books: DashMap<Symbol, Arc<Mutex<SymbolBook>>>,
    order_index: DashMap<OrderId, Symbol>,
    trade_sinks: RwLock<Vec<Arc<dyn TradeSink>>>,
    market_data_sinks: RwLock<Vec<Arc<dyn MarketDataSink>>>,
    sequence: AtomicU64,
    running: AtomicBool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let books = DashMap::new();
        for symbol in &config.supported_symbols {
            books.insert(symbol.clone(), Arc::new(Mutex::new(SymbolBook::new(symbol.clone()))));
        }
        Engine {
            config,
            books,
            order_index: DashMap::new(),
            trade_sinks: RwLock::new(Vec::new()),
            market_data_sinks: RwLock::new(Vec::new()),
            sequence: AtomicU64::new(1),
            running: AtomicBool::new(true),
        }
    }

    pub fn register_trade_sink(&self, sink: Arc<dyn TradeSink>) {
        self.trade_sinks.write().unwrap().push(sink);
    }

    pub fn register_market_data_sink(&self, sink: Arc<dyn MarketDataSink>) {
        self.market_data_sinks.write().unwrap().push(sink);
    }

    pub fn supported_symbols(&self) -> Vec<Symbol> {
        self.config.supported_symbols.clone()
    }

    /// Stops the engine: every subsequent `submit`/`cancel` across all
    /// symbols fails with `EngineError::EngineStopped`. Irreversible.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn validate(&self, req: &NewOrderRequest) -> EngineResult<()> {
        if req.quantity <= Decimal::ZERO
            || req.quantity < self.config.min_order_size
            || req.quantity > self.config.max_order_size
        {
            return Err(EngineError::Validation(format!(
                "quantity {} outside [{}, {}]",
                req.quantity, self.config.min_order_size, self.config.max_order_size
            )));
        }
        match req.price {
            Some(price) if req.order_type == OrderType::Market => {
                return Err(EngineError::Validation(format!(
                    "market orders must not carry a price, got {price}"
                )));
            }
            Some(price) => {
                if price <= Decimal::ZERO
                    || price < self.config.min_price
                    || price > self.config.max_price
                {
                    return Err(EngineError::Validation(format!(
                        "price {} outside [{}, {}]",
                        price, self.config.min_price, self.config.max_price
                    )));
                }
            }
            None if req.order_type.requires_price() => {
                return Err(EngineError::Validation(format!(
                    "{:?} orders require a price",
                    req.order_type
                )));
            }
            None => {}
        }
        if !self.config.is_supported(&req.symbol) {
            return Err(EngineError::UnsupportedSymbol(req.symbol.clone()));
        }
        Ok(())
    }

    /// The core matching walk: repeatedly takes the best-marketable maker
    /// on the opposite side and crosses it against the taker until either
    /// the taker is fully filled or no further marketable maker remains.
    fn run_walk(book: &mut SymbolBook, taker: &mut Order, bound: Option<Decimal>) -> Vec<Trade> {
        let mut fills = Vec::new();
        while taker.remaining_quantity() > Decimal::ZERO {
            let Some(maker_id) = book.best_marketable_maker(taker.side, bound) else {
                break;
            };
            let maker_price = book
                .get(maker_id)
                .and_then(|o| o.price)
                .expect("maker order must have a price");
            let maker_remaining = book
                .get(maker_id)
                .map(|o| o.remaining_quantity())
                .expect("maker order must exist");
            let fill_qty = taker.remaining_quantity().min(maker_remaining);

            taker.apply_fill(fill_qty);
            book.apply_maker_fill(taker.side, maker_id, fill_qty);

            fills.push(Trade {
                id: super::types::TradeId::new(),
                symbol: taker.symbol.clone(),
                price: maker_price,
                quantity: fill_qty,
                aggressor_side: taker.side,
                maker_order_id: maker_id,
                taker_order_id: taker.id,
                timestamp: chrono::Utc::now(),
            });
        }
        fills
    }

    /// MARKET: walk with no price bound; any remainder is discarded, never
    /// rests. Caller must have already confirmed liquidity exists.
    fn match_market(book: &mut SymbolBook, taker: &mut Order) -> MatchOutcome {
        let fills = Self::run_walk(book, taker, None);
        taker.status = if taker.remaining_quantity() == Decimal::ZERO {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        book.record(taker.clone());
        let book_changed = !fills.is_empty();
        MatchOutcome { fills, book_changed }
    }

    /// LIMIT: walk bounded by the order's own price; any remainder rests
    /// on the own side.
    fn match_limit(book: &mut SymbolBook, taker: &mut Order) -> MatchOutcome {
        let bound = taker.price;
        let fills = Self::run_walk(book, taker, bound);
        let rests = taker.remaining_quantity() > Decimal::ZERO;
        taker.status = if !rests {
            OrderStatus::Filled
        } else if taker.filled_quantity > Decimal::ZERO {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Pending
        };
        let book_changed = !fills.is_empty() || rests;
        if rests {
            book.add_resting(taker.clone());
        } else {
            book.record(taker.clone());
        }
        MatchOutcome { fills, book_changed }
    }

    /// IOC: like LIMIT, but any remainder is cancelled instead of resting.
    fn match_ioc(book: &mut SymbolBook, taker: &mut Order) -> MatchOutcome {
        let bound = taker.price;
        let fills = Self::run_walk(book, taker, bound);
        taker.status = if taker.filled_quantity == Decimal::ZERO {
            OrderStatus::Cancelled
        } else if taker.remaining_quantity() == Decimal::ZERO {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        book.record(taker.clone());
        let book_changed = !fills.is_empty();
        MatchOutcome { fills, book_changed }
    }

    /// FOK: a dry-run sufficiency check, then either a full fill or no
    /// fills at all.
    fn match_fok(book: &mut SymbolBook, taker: &mut Order) -> MatchOutcome {
        let bound = taker.price;
        let available = book.marketable_quantity(taker.side, bound);
        if available < taker.remaining_quantity() {
            taker.status = OrderStatus::Cancelled;
            book.record(taker.clone());
            return MatchOutcome { fills: Vec::new(), book_changed: false };
        }
        let fills = Self::run_walk(book, taker, bound);
        debug_assert_eq!(
            taker.remaining_quantity(),
            Decimal::ZERO,
            "FOK dry-run guaranteed a full fill"
        );
        taker.status = OrderStatus::Filled;
        book.record(taker.clone());
        let book_changed = !fills.is_empty();
        MatchOutcome { fills, book_changed }
    }

    fn dispatch_trades(&self, fills: &[Trade]) {
        let trade_sinks = self.trade_sinks.read().unwrap();
        for trade in fills {
            for sink in trade_sinks.iter() {
                sink.on_trade(trade);
            }
        }
    }

    fn dispatch_bbo(&self, bbo: &BestBidOffer) {
        let market_data_sinks = self.market_data_sinks.read().unwrap();
        for sink in market_data_sinks.iter() {
            sink.on_market_data(bbo);
        }
    }

    fn book_handle(&self, symbol: &Symbol) -> Option<Arc<Mutex<SymbolBook>>> {
        self.books.get(symbol).map(|entry| entry.value().clone())
    }

    /// Validates, routes by type, matches, emits events, and returns the
    /// acknowledgement. All mutation to the symbol's book happens while
    /// its per-symbol lock is held; sink callbacks run before the lock is
    /// released, so no other order can interleave trade events for this
    /// symbol.
    pub async fn submit(&self, req: NewOrderRequest) -> EngineResult<SubmitAck> {
        if !self.is_running() {
            return Err(EngineError::EngineStopped);
        }
        self.validate(&req)?;

        let book_handle = self
            .book_handle(&req.symbol)
            .expect("validate() already confirmed the symbol is supported");
        let mut book = book_handle.lock().await;

        if book.is_halted() {
            tracing::warn!(symbol = %req.symbol, "rejecting submission: symbol halted after prior invariant violation");
            return Err(EngineError::EngineStopped);
        }

        if req.order_type == OrderType::Market
            && book.best_marketable_maker(req.side, None).is_none()
        {
            tracing::debug!(symbol = %req.symbol, side = ?req.side, "market order rejected: no liquidity");
            return Err(EngineError::NoLiquidity);
        }

        let order_id = OrderId::new();
        let mut order = Order {
            id: order_id,
            symbol: req.symbol.clone(),
            side: req.side,
            order_type: req.order_type,
            original_quantity: req.quantity,
            filled_quantity: Decimal::ZERO,
            price: req.price,
            status: OrderStatus::Pending,
            sequence: self.next_sequence(),
            created_at: chrono::Utc::now(),
            user_id: req.user_id,
        };

        let outcome = match req.order_type {
            OrderType::Market => Self::match_market(&mut book, &mut order),
            OrderType::Limit => Self::match_limit(&mut book, &mut order),
            OrderType::Ioc => Self::match_ioc(&mut book, &mut order),
            OrderType::Fok => Self::match_fok(&mut book, &mut order),
        };

        self.order_index.insert(order_id, req.symbol.clone());

        if outcome.book_changed && book.is_crossed() {
            tracing::error!(symbol = %req.symbol, "crossed book detected after matching pass; halting symbol");
            book.halt();
        }

        tracing::trace!(
            order_id = %order_id,
            symbol = %req.symbol,
            status = ?order.status,
            fills = outcome.fills.len(),
            "order processed"
        );

        // Sinks are invoked while the symbol's lock is still held, so no
        // other order can interleave trade events for this symbol.
        self.dispatch_trades(&outcome.fills);
        if outcome.book_changed {
            self.dispatch_bbo(&book.bbo(chrono::Utc::now()));
        }

        Ok(SubmitAck {
            order_id,
            status: order.status,
            filled_qty: order.filled_quantity,
            remaining_qty: order.remaining_quantity(),
            fills: outcome.fills,
        })
    }

    /// Cancels a resting order. Idempotent in effect: cancelling an
    /// already-terminal or never-resting order fails with `OrderTerminal`
    /// without changing any state.
    pub async fn cancel(&self, order_id: OrderId) -> EngineResult<CancelAck> {
        if !self.is_running() {
            return Err(EngineError::EngineStopped);
        }
        let symbol = self
            .order_index
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .ok_or(EngineError::OrderNotFound(order_id))?;
        let book_handle = self
            .book_handle(&symbol)
            .expect("order_index only maps ids to supported symbols");
        let mut book = book_handle.lock().await;

        match book.get(order_id).map(|o| o.status) {
            None => return Err(EngineError::OrderNotFound(order_id)),
            Some(status) if status.is_terminal() => {
                return Err(EngineError::OrderTerminal(order_id));
            }
            Some(_) => {}
        }

        let Some(book_changed) = book.cancel(order_id) else {
            return Err(EngineError::OrderTerminal(order_id));
        };

        tracing::trace!(order_id = %order_id, symbol = %symbol, "order cancelled");

        if book_changed {
            self.dispatch_bbo(&book.bbo(chrono::Utc::now()));
        }

        Ok(CancelAck { order_id, status: OrderStatus::Cancelled })
    }

    pub async fn get_order(&self, order_id: OrderId) -> Option<Order> {
        let symbol = self.order_index.get(&order_id)?.value().clone();
        let book_handle = self.book_handle(&symbol)?;
        let book = book_handle.lock().await;
        book.get(order_id).cloned()
    }

    pub async fn bbo(&self, symbol: &Symbol) -> Option<BestBidOffer> {
        let book_handle = self.book_handle(symbol)?;
        let book = book_handle.lock().await;
        Some(book.bbo(chrono::Utc::now()))
    }

    pub async fn snapshot(&self, symbol: &Symbol, depth: usize) -> Option<OrderBookSnapshot> {
        let book_handle = self.book_handle(symbol)?;
        let book = book_handle.lock().await;
        Some(book.snapshot(depth.max(1), chrono::Utc::now()))
    }
}
