use matching_core::prelude::*;
use rust_decimal::Decimal;

pub const BTC_USDT: &str = "BTC-USDT";

pub fn test_engine() -> Engine {
    Engine::new(EngineConfig::default())
}

pub fn limit(symbol: &str, side: Side, price: Decimal, qty: Decimal) -> NewOrderRequest {
    NewOrderRequest {
        symbol: Symbol::from(symbol),
        side,
        order_type: OrderType::Limit,
        quantity: qty,
        price: Some(price),
        user_id: None,
    }
}

pub fn market(symbol: &str, side: Side, qty: Decimal) -> NewOrderRequest {
    NewOrderRequest {
        symbol: Symbol::from(symbol),
        side,
        order_type: OrderType::Market,
        quantity: qty,
        price: None,
        user_id: None,
    }
}

pub fn ioc(symbol: &str, side: Side, price: Decimal, qty: Decimal) -> NewOrderRequest {
    NewOrderRequest {
        symbol: Symbol::from(symbol),
        side,
        order_type: OrderType::Ioc,
        quantity: qty,
        price: Some(price),
        user_id: None,
    }
}

pub fn fok(symbol: &str, side: Side, price: Decimal, qty: Decimal) -> NewOrderRequest {
    NewOrderRequest {
        symbol: Symbol::from(symbol),
        side,
        order_type: OrderType::Fok,
        quantity: qty,
        price: Some(price),
        user_id: None,
    }
}
