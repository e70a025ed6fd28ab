//! Order status state machine: `Pending -> {PartiallyFilled, Filled,
//! Cancelled, Rejected}`, `PartiallyFilled -> {Filled, Cancelled}`;
//! `Filled`/`Cancelled`/`Rejected` are terminal.

mod common;

use common::*;
use matching_core::prelude::*;
use rust_decimal_macros::dec;

#[tokio::test]
async fn resting_limit_order_starts_pending() {
    let engine = test_engine();
    let ack = engine
        .submit(limit(BTC_USDT, Side::Buy, dec!(100), dec!(10)))
        .await
        .unwrap();
    assert_eq!(ack.status, OrderStatus::Pending);
    assert!(!ack.status.is_terminal());
}

#[tokio::test]
async fn full_fill_transitions_both_sides_to_filled() {
    let engine = test_engine();
    let sell = engine
        .submit(limit(BTC_USDT, Side::Sell, dec!(100), dec!(10)))
        .await
        .unwrap();
    let buy = engine
        .submit(limit(BTC_USDT, Side::Buy, dec!(100), dec!(10)))
        .await
        .unwrap();

    assert_eq!(buy.status, OrderStatus::Filled);
    let maker = engine.get_order(sell.order_id).await.unwrap();
    assert_eq!(maker.status, OrderStatus::Filled);
    assert!(maker.status.is_terminal());
}

#[tokio::test]
async fn partial_fill_transitions_to_partially_filled_then_filled() {
    let engine = test_engine();
    let sell = engine
        .submit(limit(BTC_USDT, Side::Sell, dec!(100), dec!(10)))
        .await
        .unwrap();
    engine
        .submit(limit(BTC_USDT, Side::Buy, dec!(100), dec!(4)))
        .await
        .unwrap();

    let maker = engine.get_order(sell.order_id).await.unwrap();
    assert_eq!(maker.status, OrderStatus::PartiallyFilled);
    assert!(!maker.status.is_terminal());

    engine
        .submit(limit(BTC_USDT, Side::Buy, dec!(100), dec!(6)))
        .await
        .unwrap();
    let maker = engine.get_order(sell.order_id).await.unwrap();
    assert_eq!(maker.status, OrderStatus::Filled);
}

#[tokio::test]
async fn cancellation_is_terminal_and_final() {
    let engine = test_engine();
    let ack = engine
        .submit(limit(BTC_USDT, Side::Buy, dec!(100), dec!(10)))
        .await
        .unwrap();
    let cancel = engine.cancel(ack.order_id).await.unwrap();
    assert_eq!(cancel.status, OrderStatus::Cancelled);

    let order = engine.get_order(ack.order_id).await.unwrap();
    assert!(order.status.is_terminal());
    assert!(engine.cancel(ack.order_id).await.is_err());
}

#[tokio::test]
async fn rejection_never_admits_the_order() {
    let engine = test_engine();
    let err = engine
        .submit(limit("DOGE-BTC", Side::Buy, dec!(1), dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedSymbol(_)));
    // A rejected order is never assigned an id or admitted anywhere, so
    // there is nothing to look up and nothing resting on any book.
}
