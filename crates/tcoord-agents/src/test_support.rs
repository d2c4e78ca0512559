//! Scripted agents for exercising collection and cycle paths without
//! real subprocesses.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tcoord_models::{AgentSignal, MarketRegime, SignalDirection, SignalRequest};

use crate::agent::SignalAgent;
use crate::error::AgentError;

enum Behavior {
    Respond(AgentSignal),
    Sleep(Duration),
    Fail,
    Panic,
}

/// An agent that follows a fixed script: respond, stall, or fail.
pub struct ScriptedAgent {
    agent_id: String,
    behavior: Behavior,
}

impl ScriptedAgent {
    pub fn responding(agent_id: &str, direction: SignalDirection, confidence: Decimal) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            behavior: Behavior::Respond(AgentSignal {
                signal_type: "scripted".to_string(),
                direction,
                confidence,
                reasoning: format!("scripted {} response", agent_id),
                signal_value: serde_json::Value::Null,
                data_sources: vec![],
                market_regime: MarketRegime::MeanReverting,
            }),
        }
    }

    /// Respond with a fully specified signal.
    pub fn with_signal(agent_id: &str, signal: AgentSignal) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            behavior: Behavior::Respond(signal),
        }
    }

    /// Stall for `delay` before responding; used to trigger the collection
    /// budget.
    pub fn slow(agent_id: &str, delay: Duration) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            behavior: Behavior::Sleep(delay),
        }
    }

    pub fn failing(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            behavior: Behavior::Fail,
        }
    }

    /// Panic inside `signal`, aborting the collection task.
    pub fn panicking(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            behavior: Behavior::Panic,
        }
    }
}

#[async_trait]
impl SignalAgent for ScriptedAgent {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    async fn signal(&self, request: &SignalRequest) -> Result<AgentSignal, AgentError> {
        match &self.behavior {
            Behavior::Respond(signal) => {
                let mut signal = signal.clone();
                signal.market_regime = request.market_regime;
                Ok(signal)
            }
            Behavior::Sleep(delay) => {
                tokio::time::sleep(*delay).await;
                Err(AgentError::Timeout(delay.as_millis() as u64))
            }
            Behavior::Fail => Err(AgentError::Spawn("scripted failure".to_string())),
            Behavior::Panic => panic!("scripted panic"),
        }
    }
}
