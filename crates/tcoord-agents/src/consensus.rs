use rust_decimal::Decimal;
use tcoord_models::{
    AgentSignal, ConsensusConfig, ConsensusDecision, Contribution, SignalDirection,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::CycleError;

/// One responder's signal paired with the trust weight in effect when it
/// was collected.
#[derive(Debug, Clone)]
pub struct WeightedSignal {
    pub record_id: Uuid,
    pub agent_id: String,
    pub weight: Decimal,
    pub signal: AgentSignal,
}

/// Weighted-vote aggregation over the responders of one cycle.
///
/// Pure arithmetic over `Decimal`; identical inputs always produce the
/// identical decision regardless of input ordering.
pub struct ConsensusEngine {
    config: ConsensusConfig,
}

impl ConsensusEngine {
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    /// Aggregate responder signals into one decision.
    ///
    /// The signed aggregate is `sum(w*c*sign) / sum(w*c)` over responders.
    /// Aggregate confidence is the responder confidence mass over the total
    /// registered weight, so absent agents depress confidence without
    /// skewing direction. Fails with `NoConsensus` when the confidence mass
    /// is effectively zero.
    pub fn compute(
        &self,
        cycle_id: Uuid,
        asset: &str,
        inputs: &[WeightedSignal],
        total_registered_weight: Decimal,
    ) -> Result<ConsensusDecision, CycleError> {
        let mut ordered: Vec<&WeightedSignal> = inputs.iter().collect();
        ordered.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));

        let mut numerator = Decimal::ZERO;
        let mut confidence_mass = Decimal::ZERO;
        let mut contributions = Vec::with_capacity(ordered.len());

        for input in &ordered {
            let effective_confidence = self.effective_confidence(input, &ordered);
            let stake = input.weight * effective_confidence;
            numerator += stake * input.signal.direction.sign();
            confidence_mass += stake;
            contributions.push(Contribution {
                record_id: input.record_id,
                agent_id: input.agent_id.clone(),
                weight: input.weight,
                confidence: input.signal.confidence,
                direction: input.signal.direction,
            });
        }

        let epsilon = Decimal::new(1, 4);
        if confidence_mass < epsilon || total_registered_weight < epsilon {
            return Err(CycleError::NoConsensus);
        }

        let aggregate = numerator / confidence_mass;
        let confidence = confidence_mass / total_registered_weight;
        let direction = if aggregate > Decimal::ZERO {
            SignalDirection::Buy
        } else if aggregate < Decimal::ZERO {
            SignalDirection::Sell
        } else {
            SignalDirection::Hold
        };

        debug!(
            cycle_id = %cycle_id,
            asset = %asset,
            aggregate = %aggregate,
            confidence = %confidence,
            responders = contributions.len(),
            "Consensus computed"
        );

        Ok(ConsensusDecision {
            cycle_id,
            asset: asset.to_string(),
            aggregate,
            direction,
            confidence,
            contributions,
        })
    }

    /// Confidence after the optional corroboration bonus: a responder whose
    /// data sources overlap another responder's gets its confidence scaled
    /// by `1 + bonus`, capped at 1.
    fn effective_confidence(&self, input: &WeightedSignal, all: &[&WeightedSignal]) -> Decimal {
        let Some(bonus) = self.config.source_overlap_bonus else {
            return input.signal.confidence;
        };

        let corroborated = all.iter().any(|other| {
            other.agent_id != input.agent_id
                && other
                    .signal
                    .data_sources
                    .iter()
                    .any(|s| input.signal.data_sources.contains(s))
        });

        if corroborated {
            (input.signal.confidence * (Decimal::ONE + bonus)).min(Decimal::ONE)
        } else {
            input.signal.confidence
        }
    }
}
