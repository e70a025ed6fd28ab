//! JSON wire shapes for transport compatibility.
//!
//! The core never serializes anything itself -- these types exist so the
//! transport layer has a stable, serde-derived shape to serialize into and
//! deserialize out of, with decimals carried as strings to preserve
//! precision across the wire.

use super::types::{Level, OrderId, OrderStatus, OrderType, Side, Symbol, TradeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireOrder {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub filled_quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub status: OrderStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTradeExecution {
    pub trade_id: TradeId,
    pub symbol: Symbol,
    pub price: Decimal,
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Always `None` coming out of the core -- fee computation is an
    /// external concern. Present so a downstream fee service can populate
    /// it without changing the wire shape.
    pub fee: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireBbo {
    pub symbol: Symbol,
    pub best_bid: Option<Level>,
    pub best_ask: Option<Level>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
