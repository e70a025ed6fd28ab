//! Core of a cryptocurrency matching engine: a per-symbol limit order book
//! plus the matching engine state machine that validates, routes, and
//! matches MARKET / LIMIT / IOC / FOK orders under strict price-time
//! priority with internal order protection.
//!
//! Transport (HTTP/WebSocket), authentication, persistence, account/balance
//! management, fee computation, and market-data fan-out are out of scope --
//! this crate exposes the `Engine` and the `TradeSink`/`MarketDataSink`
//! contracts a transport layer drives and consumes.

pub mod engine;

pub use engine::prelude;
