use super::types::{Level, OrderId, Side};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// One price level: a FIFO queue of resting order ids plus an aggregate
/// remaining quantity that is maintained incrementally on every insert,
/// removal, and partial fill -- never recomputed by summation on read.
#[derive(Debug)]
pub struct PriceLevel {
    pub price: Decimal,
    queue: VecDeque<OrderId>,
    aggregate_quantity: Decimal,
}

impl PriceLevel {
    fn new(price: Decimal) -> Self {
        PriceLevel {
            price,
            queue: VecDeque::new(),
            aggregate_quantity: Decimal::ZERO,
        }
    }

    fn insert(&mut self, id: OrderId, quantity: Decimal) {
        self.queue.push_back(id);
        self.aggregate_quantity += quantity;
    }

    /// Removes a specific order from the queue, preserving the relative
    /// order of the survivors. O(k) in queue length.
    fn remove(&mut self, id: OrderId, quantity: Decimal) -> bool {
        if let Some(pos) = self.queue.iter().position(|&o| o == id) {
            self.queue.remove(pos);
            self.aggregate_quantity -= quantity;
            true
        } else {
            false
        }
    }

    /// Records a partial fill against the order at the head of the queue
    /// without removing it (it keeps its place; it's still the earliest
    /// resting order at this price).
    fn reduce_head(&mut self, quantity: Decimal) {
        self.aggregate_quantity -= quantity;
    }

    /// Removes and returns the order at the head of the queue, used when
    /// the head has been fully filled.
    fn pop_front(&mut self) -> Option<OrderId> {
        self.queue.pop_front()
    }

    pub fn front(&self) -> Option<OrderId> {
        self.queue.front().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.queue.len()
    }

    pub fn aggregate_quantity(&self) -> Decimal {
        self.aggregate_quantity
    }

    pub fn to_level(&self) -> Level {
        Level {
            price: self.price,
            quantity: self.aggregate_quantity,
            order_count: self.queue.len(),
        }
    }
}

/// Ordered index of price levels for one side of one symbol's book.
///
/// Backed by a `BTreeMap`, the platform's balanced ordered map, rather
/// than a hand-rolled red-black tree: insertion, removal, and best-price
/// lookup are all O(log L) in the number of distinct price levels, with no
/// tick-alignment assumption required.
#[derive(Debug)]
pub struct PriceLevelBook {
    side: Side,
    levels: BTreeMap<Decimal, PriceLevel>,
    locations: HashMap<OrderId, Decimal>,
}

impl PriceLevelBook {
    pub fn new(side: Side) -> Self {
        PriceLevelBook {
            side,
            levels: BTreeMap::new(),
            locations: HashMap::new(),
        }
    }

    /// Appends a resting order to the queue at `price`, creating the level
    /// if absent.
    pub fn insert(&mut self, id: OrderId, price: Decimal, quantity: Decimal) {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .insert(id, quantity);
        self.locations.insert(id, price);
    }

    /// Removes `id` (with its current remaining `quantity`) from its
    /// level, deleting the level if it becomes empty. Returns whether the
    /// order was found.
    pub fn remove(&mut self, id: OrderId, quantity: Decimal) -> bool {
        let Some(price) = self.locations.remove(&id) else {
            return false;
        };
        if let Some(level) = self.levels.get_mut(&price) {
            let removed = level.remove(id, quantity);
            if level.is_empty() {
                self.levels.remove(&price);
            }
            removed
        } else {
            false
        }
    }

    /// The price this side considers "best": highest for bids, lowest for
    /// asks. `None` when the side is empty.
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    pub fn best(&self) -> Option<Level> {
        let price = self.best_price()?;
        self.levels.get(&price).map(PriceLevel::to_level)
    }

    /// True if `price` is marketable against `bound` from this side: for
    /// bids (walked by a SELL taker) `price >= bound`; for asks (walked by
    /// a BUY taker) `price <= bound`. A `None` bound means "everything is
    /// marketable" (a market order's unbounded walk).
    pub fn is_marketable(&self, price: Decimal, bound: Option<Decimal>) -> bool {
        match bound {
            None => true,
            Some(bound) => match self.side {
                Side::Buy => price >= bound,
                Side::Sell => price <= bound,
            },
        }
    }

    pub fn level_at_mut(&mut self, price: Decimal) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// The earliest-admitted order id at this side's best price, or `None`
    /// if the side is empty. The head of the FIFO queue at the best level
    /// is always the next maker in price-time priority.
    pub fn front_of_best(&self) -> Option<OrderId> {
        let price = self.best_price()?;
        self.levels.get(&price).and_then(PriceLevel::front)
    }

    /// Records a fill against the resting order at the head of `price`'s
    /// queue, removing it from the level (and the level from the book, if
    /// it becomes empty) when it's been fully consumed.
    pub fn apply_fill_at_head(&mut self, price: Decimal, quantity: Decimal, maker_filled: bool) {
        if let Some(level) = self.levels.get_mut(&price) {
            level.reduce_head(quantity);
            if maker_filled {
                if let Some(id) = level.pop_front() {
                    self.locations.remove(&id);
                }
            }
            if level.is_empty() {
                self.levels.remove(&price);
            }
        }
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::order_count).sum()
    }

    /// Sum of aggregate quantities across every level marketable against
    /// `bound`, used by the FOK dry-run pass to check sufficiency before
    /// committing to a real matching walk.
    pub fn marketable_quantity(&self, bound: Option<Decimal>) -> Decimal {
        self.levels
            .iter()
            .filter(|(&price, _)| self.is_marketable(price, bound))
            .map(|(_, level)| level.aggregate_quantity())
            .sum()
    }

    /// Up to `depth` levels, best to worst.
    pub fn snapshot(&self, depth: usize) -> Vec<Level> {
        match self.side {
            Side::Buy => self
                .levels
                .values()
                .rev()
                .take(depth)
                .map(PriceLevel::to_level)
                .collect(),
            Side::Sell => self
                .levels
                .values()
                .take(depth)
                .map(PriceLevel::to_level)
                .collect(),
        }
    }
}
