//! One symbol's order book: a pair of `PriceLevelBook`s (bids, asks) plus
//! the order records that belong to this symbol. Thin composition -- the
//! interesting data-structure work lives in `book.rs`.

use super::book::PriceLevelBook;
use super::types::{BestBidOffer, Order, OrderBookSnapshot, OrderId, OrderStatus, Side, Symbol};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// All orders that have ever touched this symbol, keyed by id. Entries are
/// never removed -- a cancelled or filled order stays retrievable via
/// `get`, only its presence in the `PriceLevelBook` queues changes. Each
/// symbol's book owns the orders that belong to it; the engine's
/// `order_index` is routing-only.
pub struct SymbolBook {
    pub symbol: Symbol,
    bids: PriceLevelBook,
    asks: PriceLevelBook,
    orders: HashMap<OrderId, Order>,
    /// Set after a fatal invariant violation; once `true` the engine stops
    /// admitting new orders for this symbol specifically.
    halted: bool,
}

impl SymbolBook {
    pub fn new(symbol: Symbol) -> Self {
        SymbolBook {
            symbol,
            bids: PriceLevelBook::new(Side::Buy),
            asks: PriceLevelBook::new(Side::Sell),
            orders: HashMap::new(),
            halted: false,
        }
    }

    fn side_book(&self, side: Side) -> &PriceLevelBook {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_book_mut(&mut self, side: Side) -> &mut PriceLevelBook {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// The side an incoming order on `taker_side` matches against.
    fn opposite_book(&self, taker_side: Side) -> &PriceLevelBook {
        self.side_book(taker_side.opposite())
    }

    fn opposite_book_mut(&mut self, taker_side: Side) -> &mut PriceLevelBook {
        self.side_book_mut(taker_side.opposite())
    }

    /// Records the final state of an order for later `get` lookups without
    /// touching either side's `PriceLevelBook`. Used for non-resting
    /// outcomes (market/IOC/FOK orders, and limit orders that filled in
    /// full) where there is nothing to queue.
    pub fn record(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    /// Admits a resting limit order: inserts it at its price on its own
    /// side and records it for lookup.
    pub fn add_resting(&mut self, order: Order) {
        let (id, side, price, quantity) = (
            order.id,
            order.side,
            order.price.expect("resting order must carry a limit price"),
            order.remaining_quantity(),
        );
        self.side_book_mut(side).insert(id, price, quantity);
        self.record(order);
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// A restartable walk: repeatedly called by the matching loop after
    /// each fill, this always returns the earliest-admitted maker at the
    /// best marketable price, tolerating orders being fully consumed and
    /// levels being deleted between calls.
    pub fn best_marketable_maker(&self, taker_side: Side, bound: Option<Decimal>) -> Option<OrderId> {
        let book = self.opposite_book(taker_side);
        let price = book.best_price()?;
        if book.is_marketable(price, bound) {
            book.front_of_best()
        } else {
            None
        }
    }

    /// Applies a fill of `quantity` to the maker `id`, updating its order
    /// record and the aggregate quantity of its price level. Removes the
    /// maker from the book (but not from the lookup table) once it is
    /// fully filled.
    pub fn apply_maker_fill(&mut self, taker_side: Side, id: OrderId, quantity: Decimal) {
        let price = self
            .orders
            .get(&id)
            .and_then(|o| o.price)
            .expect("maker order must be resting with a price");
        let maker_filled = {
            let maker = self.orders.get_mut(&id).expect("maker order must exist");
            maker.apply_fill(quantity);
            maker.remaining_quantity() == Decimal::ZERO
        };
        self.opposite_book_mut(taker_side)
            .apply_fill_at_head(price, quantity, maker_filled);
    }

    /// Sum of remaining quantity across every level marketable against
    /// `bound` on the side a `taker_side` order would walk -- used by the
    /// fill-or-kill dry-run pass.
    pub fn marketable_quantity(&self, taker_side: Side, bound: Option<Decimal>) -> Decimal {
        self.opposite_book(taker_side).marketable_quantity(bound)
    }

    /// Cancels `id` if it is resting-eligible. Returns `Ok(true)` if the
    /// book changed (the order was actually removed from a price level),
    /// `Ok(false)` if the order was found but was never resting (nothing
    /// to remove from a level, e.g. already filled elsewhere in the same
    /// call), and the caller is responsible for mapping "not found" /
    /// "not resting-eligible" to the appropriate `EngineError` -- this
    /// method only performs the removal and status update.
    pub fn cancel(&mut self, id: OrderId) -> Option<bool> {
        let order = self.orders.get(&id)?;
        if !order.is_resting_eligible() {
            return None;
        }
        let (side, price, quantity) = (
            order.side,
            order.price.expect("resting order must carry a limit price"),
            order.remaining_quantity(),
        );
        let removed = self.side_book_mut(side).remove(id, quantity);
        if let Some(order) = self.orders.get_mut(&id) {
            order.status = OrderStatus::Cancelled;
        }
        Some(removed)
    }

    pub fn bbo(&self, timestamp: chrono::DateTime<chrono::Utc>) -> BestBidOffer {
        BestBidOffer {
            symbol: self.symbol.clone(),
            best_bid: self.bids.best(),
            best_ask: self.asks.best(),
            timestamp,
        }
    }

    pub fn snapshot(&self, depth: usize, timestamp: chrono::DateTime<chrono::Utc>) -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: self.symbol.clone(),
            bids: self.bids.snapshot(depth),
            asks: self.asks.snapshot(depth),
            timestamp,
        }
    }

    pub fn order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    /// No crossed book: best bid strictly below best ask whenever both
    /// sides are non-empty.
    pub fn is_crossed(&self) -> bool {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }
}
