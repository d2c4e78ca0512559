use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signal::SignalDirection;

/// One responding agent's stake in a consensus decision, captured with the
/// trust weight that was in effect at decision time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contribution {
    pub record_id: Uuid,
    pub agent_id: String,
    pub weight: Decimal,
    pub confidence: Decimal,
    pub direction: SignalDirection,
}

/// The weighted aggregate decision for one cycle.
///
/// Derived, never stored as its own table; the trade-relevant subset is
/// embedded in the cycle note and in the contributing records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsensusDecision {
    pub cycle_id: Uuid,
    pub asset: String,
    /// Signed aggregate in [-1, 1]: positive buys, negative sells.
    pub aggregate: Decimal,
    pub direction: SignalDirection,
    /// Aggregate confidence in [0, 1], depressed when agents are absent.
    pub confidence: Decimal,
    pub contributions: Vec<Contribution>,
}

/// Terminal disposition of a decision cycle. Exactly one per cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CycleDisposition {
    ApprovedExecuted,
    ApprovedExecutionFailed,
    Rejected,
    AbortedQuorum,
    AbortedNoConsensus,
}

impl CycleDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleDisposition::ApprovedExecuted => "approved_executed",
            CycleDisposition::ApprovedExecutionFailed => "approved_execution_failed",
            CycleDisposition::Rejected => "rejected",
            CycleDisposition::AbortedQuorum => "aborted_quorum",
            CycleDisposition::AbortedNoConsensus => "aborted_no_consensus",
        }
    }
}

/// Audit note recording how a cycle terminated. There is no silent cycle:
/// every cycle writes exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleNote {
    pub cycle_id: Uuid,
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub disposition: CycleDisposition,
    /// Human-readable detail: rejection reason, order id, quorum counts.
    pub detail: String,
}

impl CycleNote {
    pub fn new(cycle_id: Uuid, asset: &str, disposition: CycleDisposition, detail: String) -> Self {
        Self {
            cycle_id,
            asset: asset.to_string(),
            timestamp: Utc::now(),
            disposition,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn disposition_serialization() {
        assert_eq!(
            serde_json::to_string(&CycleDisposition::AbortedQuorum).unwrap(),
            "\"aborted_quorum\""
        );
        assert_eq!(CycleDisposition::ApprovedExecuted.as_str(), "approved_executed");
    }

    #[test]
    fn roundtrip_consensus_decision() {
        let decision = ConsensusDecision {
            cycle_id: Uuid::new_v4(),
            asset: "AAPL".to_string(),
            aggregate: dec!(0.58),
            direction: SignalDirection::Buy,
            confidence: dec!(0.57),
            contributions: vec![Contribution {
                record_id: Uuid::new_v4(),
                agent_id: "technical_agent".to_string(),
                weight: dec!(0.5),
                confidence: dec!(0.9),
                direction: SignalDirection::Buy,
            }],
        };

        let json = serde_json::to_string(&decision).unwrap();
        let parsed: ConsensusDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(decision, parsed);
    }
}
