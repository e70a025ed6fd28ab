use matching_core::prelude::*;
use rust_decimal::Decimal;

pub const SYMBOL: &str = "BTC-USDT";

pub fn bench_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.supported_symbols = vec![Symbol::from(SYMBOL)];
    config
}

pub fn limit_request(side: Side, price: i64, qty: i64) -> NewOrderRequest {
    NewOrderRequest {
        symbol: Symbol::from(SYMBOL),
        side,
        order_type: OrderType::Limit,
        quantity: Decimal::from(qty),
        price: Some(Decimal::from(price)),
        user_id: None,
    }
}

pub fn market_request(side: Side, qty: i64) -> NewOrderRequest {
    NewOrderRequest {
        symbol: Symbol::from(SYMBOL),
        side,
        order_type: OrderType::Market,
        quantity: Decimal::from(qty),
        price: None,
        user_id: None,
    }
}
