//! Event sink contracts. The engine is fire-and-forget from a sink's
//! perspective: `on_trade`/`on_market_data` run inside the matching
//! critical section and must not block or do I/O -- an implementation that
//! needs to talk to the outside world hands off to a queue and returns
//! immediately.
//!
//! Native `async fn` in traits isn't object-safe, so sinks are registered
//! as trait objects (`Arc<dyn TradeSink>`) with plain synchronous methods;
//! an implementation wanting asynchronous delivery drains its own queue
//! from a separate task, same as the bounded-channel sinks below.

use super::types::{BestBidOffer, Trade};
use crossbeam::channel::{Receiver, Sender, bounded};

/// Invoked once per fill, in the order produced by the matching walk.
pub trait TradeSink: Send + Sync {
    fn on_trade(&self, trade: &Trade);
}

/// Invoked once per book-changing operation, after all trade events for
/// that operation have been delivered.
pub trait MarketDataSink: Send + Sync {
    fn on_market_data(&self, bbo: &BestBidOffer);
}

/// A `TradeSink` that spills into a bounded channel instead of doing I/O
/// inline. When the channel is full the oldest queued trade is dropped to
/// make room for the new one.
pub struct ChannelTradeSink {
    sender: Sender<Trade>,
    receiver: Receiver<Trade>,
}

impl ChannelTradeSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        ChannelTradeSink { sender, receiver }
    }

    /// Drains one queued trade, for a consumer task running outside the
    /// matching critical section.
    pub fn try_recv(&self) -> Option<Trade> {
        self.receiver.try_recv().ok()
    }
}

impl TradeSink for ChannelTradeSink {
    fn on_trade(&self, trade: &Trade) {
        if self.sender.try_send(trade.clone()).is_err() {
            let _ = self.receiver.try_recv();
            let _ = self.sender.try_send(trade.clone());
        }
    }
}

/// Drop-oldest bounded-channel `MarketDataSink`, mirroring `ChannelTradeSink`.
pub struct ChannelMarketDataSink {
    sender: Sender<BestBidOffer>,
    receiver: Receiver<BestBidOffer>,
}

impl ChannelMarketDataSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        ChannelMarketDataSink { sender, receiver }
    }

    pub fn try_recv(&self) -> Option<BestBidOffer> {
        self.receiver.try_recv().ok()
    }
}

impl MarketDataSink for ChannelMarketDataSink {
    fn on_market_data(&self, bbo: &BestBidOffer) {
        if self.sender.try_send(bbo.clone()).is_err() {
            let _ = self.receiver.try_recv();
            let _ = self.sender.try_send(bbo.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{OrderId, Side, Symbol, TradeId};
    use rust_decimal_macros::dec;

    fn sample_trade() -> Trade {
        Trade {
            id: TradeId::new(),
            symbol: Symbol::from("BTC-USDT"),
            price: dec!(50000),
            quantity: dec!(1),
            aggressor_side: Side::Buy,
            maker_order_id: OrderId::new(),
            taker_order_id: OrderId::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn channel_trade_sink_drops_oldest_when_full() {
        let sink = ChannelTradeSink::new(1);
        let first = sample_trade();
        let second = sample_trade();
        sink.on_trade(&first);
        sink.on_trade(&second);

        let received = sink.try_recv().unwrap();
        assert_eq!(received.id, second.id);
        assert!(sink.try_recv().is_none());
    }
}
