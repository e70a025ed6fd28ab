use super::types::{OrderId, Symbol};
use thiserror::Error;

/// Every way the engine can refuse to admit an order or act on a request.
/// Reported by return value -- the engine never uses exceptions/panics as
/// control flow across its public boundary.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Malformed order: bad quantity/price, or a price missing/present
    /// where the order type forbids it. The order is never admitted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Symbol is not in the configured supported set.
    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(Symbol),

    /// A MARKET order found the opposite side of the book empty.
    #[error("no liquidity available")]
    NoLiquidity,

    /// `cancel`/`get_order` referenced an id the engine has never seen.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// `cancel` referenced an order already in a terminal state.
    #[error("order already terminal: {0}")]
    OrderTerminal(OrderId),

    /// The engine (or the specific symbol, after a fatal invariant
    /// violation) is no longer accepting requests.
    #[error("engine stopped")]
    EngineStopped,
}

pub type EngineResult<T> = Result<T, EngineError>;
