use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tcoord_models::{AgentSignal, CollectorConfig, MarketRegime, SignalRequest};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agent::SignalAgent;
use crate::error::{AgentError, CycleError};

/// What one registered agent produced this cycle.
///
/// Absence is an explicit state, never a zero-confidence signal: the two
/// must stay distinguishable for audit and for weight updates (absence
/// does not penalize weight).
#[derive(Debug, Clone, PartialEq)]
pub enum CollectedSignal {
    Responded(AgentSignal),
    Absent,
}

/// All per-agent results for one cycle, keyed by agent id.
///
/// BTreeMap keeps iteration order stable so downstream aggregation is
/// deterministic.
#[derive(Debug, Clone)]
pub struct CollectedSignals {
    pub cycle_id: Uuid,
    pub asset: String,
    pub signals: BTreeMap<String, CollectedSignal>,
}

impl CollectedSignals {
    /// Responding agents and their signals, in agent-id order.
    pub fn responses(&self) -> impl Iterator<Item = (&str, &AgentSignal)> {
        self.signals.iter().filter_map(|(id, s)| match s {
            CollectedSignal::Responded(signal) => Some((id.as_str(), signal)),
            CollectedSignal::Absent => None,
        })
    }

    pub fn responded_count(&self) -> usize {
        self.responses().count()
    }
}

/// Gathers per-agent signals for one decision cycle under a bounded
/// time budget.
pub struct Collector {
    agents: Vec<Arc<dyn SignalAgent>>,
    timeout: Duration,
    quorum: usize,
}

impl Collector {
    pub fn new(agents: Vec<Arc<dyn SignalAgent>>, config: &CollectorConfig) -> Self {
        Self {
            agents,
            timeout: Duration::from_millis(config.collect_timeout_ms),
            quorum: config.quorum,
        }
    }

    /// Ids of all registered agents, in registration order.
    pub fn agent_ids(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.agent_id().to_string()).collect()
    }

    /// Request a signal from every registered agent concurrently and wait
    /// up to the collection budget.
    ///
    /// Agents that time out or fail are recorded as `Absent` for this cycle;
    /// they are not retried mid-cycle, and slow agents are left to finish on
    /// their own (fire-and-forget on expiry). Fails with `QuorumNotMet` when
    /// fewer than the configured quorum respond.
    pub async fn collect(
        &self,
        asset: &str,
        cycle_id: Uuid,
        market_regime: MarketRegime,
    ) -> Result<CollectedSignals, CycleError> {
        let mut handles = Vec::with_capacity(self.agents.len());
        for agent in &self.agents {
            // Keep the id outside the task so a panicked task still gets an
            // Absent entry under the right agent.
            let agent_id = agent.agent_id().to_string();
            let agent = Arc::clone(agent);
            let budget = self.timeout;
            let request = SignalRequest {
                request_id: Uuid::new_v4(),
                cycle_id,
                asset: asset.to_string(),
                market_regime,
            };

            let handle = tokio::spawn(async move {
                match tokio::time::timeout(budget, agent.signal(&request)).await {
                    Ok(inner) => inner,
                    Err(_) => Err(AgentError::Timeout(budget.as_millis() as u64)),
                }
            });
            handles.push((agent_id, handle));
        }

        let mut signals = BTreeMap::new();
        for (agent_id, handle) in handles {
            match handle.await {
                Ok(Ok(signal)) => {
                    info!(agent = %agent_id, confidence = %signal.confidence, direction = ?signal.direction, "Agent responded");
                    signals.insert(agent_id, CollectedSignal::Responded(signal));
                }
                Ok(Err(AgentError::Timeout(ms))) => {
                    // Expected under load; absence is handled, not retried.
                    info!(agent = %agent_id, budget_ms = ms, "Agent absent: timed out");
                    signals.insert(agent_id, CollectedSignal::Absent);
                }
                Ok(Err(e)) => {
                    warn!(agent = %agent_id, error = %e, "Agent absent: request failed");
                    signals.insert(agent_id, CollectedSignal::Absent);
                }
                Err(e) => {
                    error!(agent = %agent_id, error = %e, "Agent absent: task panicked");
                    signals.insert(agent_id, CollectedSignal::Absent);
                }
            }
        }

        let collected = CollectedSignals {
            cycle_id,
            asset: asset.to_string(),
            signals,
        };

        let responded = collected.responded_count();
        if responded < self.quorum {
            return Err(CycleError::QuorumNotMet {
                responded,
                required: self.quorum,
            });
        }

        Ok(collected)
    }
}
