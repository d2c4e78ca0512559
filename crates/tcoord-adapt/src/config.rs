use serde::{Deserialize, Serialize};
use tcoord_models::WeightConfig;

/// Configuration for the adaptation daemon.
///
/// The daemon opens its own connection to the shared ledger file; it never
/// holds an in-process lock with the trading path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdaptConfig {
    /// Path to the ledger SQLite file shared with the trading coordinator.
    pub sqlite_path: String,
    #[serde(default)]
    pub weights: WeightConfig,
    /// Buffer depth for the in-process outcome event channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
sqlite_path = "data/tcoord_ledger.db"
channel_capacity = 64

[weights]
min_weight = "0.10"
max_weight = "0.90"
default_weight = "0.25"
learning_rate = "0.02"
"#;
        let config: AdaptConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sqlite_path, "data/tcoord_ledger.db");
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.weights.learning_rate, dec!(0.02));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config: AdaptConfig = toml::from_str(r#"sqlite_path = "ledger.db""#).unwrap();
        assert_eq!(config.channel_capacity, 256);
        assert_eq!(config.weights, WeightConfig::default());
    }
}
