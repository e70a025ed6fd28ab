use super::types::Symbol;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Immutable, process-wide matching engine configuration. Loaded once by
/// the transport layer and handed to `Engine::new`; the core never reads
/// environment variables or files itself -- configuration *loading* is an
/// external concern, this struct is only the typed shape of what gets
/// loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub supported_symbols: Vec<Symbol>,
    pub min_order_size: Decimal,
    pub max_order_size: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Depth returned by `snapshot(symbol, depth)` when the caller omits one.
    pub default_snapshot_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            supported_symbols: [
                "BTC-USDT", "ETH-USDT", "BNB-USDT", "ADA-USDT", "SOL-USDT", "XRP-USDT",
                "DOT-USDT", "DOGE-USDT", "AVAX-USDT", "MATIC-USDT",
            ]
            .iter()
            .map(|s| Symbol::from(*s))
            .collect(),
            min_order_size: dec!(0.00000001),
            max_order_size: dec!(1000000),
            min_price: dec!(0.00000001),
            max_price: dec!(1000000),
            default_snapshot_depth: 20,
        }
    }
}

impl EngineConfig {
    pub fn is_supported(&self, symbol: &Symbol) -> bool {
        self.supported_symbols.contains(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_original_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.supported_symbols.len(), 10);
        assert!(config.is_supported(&Symbol::from("BTC-USDT")));
        assert!(!config.is_supported(&Symbol::from("FOO-BAR")));
        assert_eq!(config.max_order_size, dec!(1000000));
    }
}
