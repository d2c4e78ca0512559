use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point in an agent's trust-weight history.
///
/// The history is append-only; the current weight for an agent is the value
/// of its most recent sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightSample {
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub weight: Decimal,
}

impl WeightSample {
    pub fn now(agent_id: &str, weight: Decimal) -> Self {
        Self {
            timestamp: Utc::now(),
            agent_id: agent_id.to_string(),
            weight,
        }
    }
}

/// Bounds and learning rate for the trust-weight controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightConfig {
    /// Floor weight. Never zero: a silenced agent must be able to recover.
    #[serde(default = "default_min_weight")]
    pub min_weight: Decimal,
    #[serde(default = "default_max_weight")]
    pub max_weight: Decimal,
    /// Weight assigned to agents with no sample history.
    #[serde(default = "default_weight")]
    pub default_weight: Decimal,
    /// Fixed per-outcome learning rate for the bounded update rule.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: Decimal,
}

impl WeightConfig {
    pub fn in_bounds(&self, weight: Decimal) -> bool {
        weight >= self.min_weight && weight <= self.max_weight
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
            default_weight: default_weight(),
            learning_rate: default_learning_rate(),
        }
    }
}

fn default_min_weight() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_max_weight() -> Decimal {
    Decimal::ONE
}
fn default_weight() -> Decimal {
    Decimal::new(30, 2) // 0.30
}
fn default_learning_rate() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
