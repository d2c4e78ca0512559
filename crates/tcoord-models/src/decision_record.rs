use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signal::{AgentSignal, MarketRegime, SignalDirection};

/// One agent signal captured at one decision cycle.
///
/// Immutable at creation; the outcome fields are the only legal late write
/// and transition unset -> set exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub cycle_id: Uuid,
    pub asset: String,

    pub signal_type: String,
    pub direction: SignalDirection,
    pub confidence: Decimal,
    pub reasoning: String,
    pub signal_value: serde_json::Value,
    pub data_sources: Vec<String>,
    pub market_regime: MarketRegime,

    /// Whether this signal fed an executed trade. Known at append time.
    pub contributed_to_trade: bool,
    /// Realized result, attributed later. None until resolved.
    pub outcome: Option<Outcome>,
}

/// Realized result attributed back to a DecisionRecord.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub pnl: Decimal,
    /// Days between decision and outcome resolution.
    pub latency_days: u32,
    /// Set only for records that contributed to an executed trade.
    pub trade_was_profitable: Option<bool>,
}

impl Outcome {
    /// Enforce the outcome pairing invariants:
    /// a non-contributing record must not carry a profitability label,
    /// a contributing record must carry one.
    pub fn validate_for(&self, contributed_to_trade: bool) -> Result<(), String> {
        match (contributed_to_trade, self.trade_was_profitable) {
            (false, Some(_)) => Err(
                "trade_was_profitable must be null when the record did not contribute to a trade"
                    .to_string(),
            ),
            (true, None) => Err(
                "trade_was_profitable must be set when the record contributed to a trade"
                    .to_string(),
            ),
            _ => Ok(()),
        }
    }
}

impl DecisionRecord {
    /// Build a record from a collected agent signal.
    pub fn from_signal(
        cycle_id: Uuid,
        asset: &str,
        agent_id: &str,
        signal: &AgentSignal,
        contributed_to_trade: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            agent_id: agent_id.to_string(),
            cycle_id,
            asset: asset.to_string(),
            signal_type: signal.signal_type.clone(),
            direction: signal.direction,
            confidence: signal.confidence,
            reasoning: signal.reasoning.clone(),
            signal_value: signal.signal_value.clone(),
            data_sources: signal.data_sources.clone(),
            market_regime: signal.market_regime,
            contributed_to_trade,
            outcome: None,
        }
    }
}
