use async_trait::async_trait;
use tcoord_models::{AgentSignal, SignalRequest};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::parser::parse_agent_signal;

/// Trait for signal-generating agents. Mockable for testing.
///
/// Implementations must not enforce their own deadline; the collector owns
/// the per-cycle time budget.
#[async_trait]
pub trait SignalAgent: Send + Sync {
    fn agent_id(&self) -> &str;

    async fn signal(&self, request: &SignalRequest) -> Result<AgentSignal, AgentError>;
}

/// An agent backed by an external subprocess (LLM wrapper, rule engine).
///
/// The request is passed as a single JSON argument; the process prints an
/// `AgentSignal` JSON object on stdout, optionally wrapped in markdown or
/// surrounding text.
pub struct CommandAgent {
    pub agent_id: String,
    pub command: String,
    pub args: Vec<String>,
}

impl CommandAgent {
    pub fn new(agent_id: String, command: String, args: Vec<String>) -> Self {
        Self {
            agent_id,
            command,
            args,
        }
    }
}

#[async_trait]
impl SignalAgent for CommandAgent {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    async fn signal(&self, request: &SignalRequest) -> Result<AgentSignal, AgentError> {
        let request_json = serde_json::to_string(request)?;
        debug!(agent = %self.agent_id, command = %self.command, "Invoking agent process");

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&request_json)
            .output()
            .await
            .map_err(|e| AgentError::Spawn(format!("failed to spawn {}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(agent = %self.agent_id, status = %output.status, stderr = %stderr, "Agent process failed");
            return Err(AgentError::Spawn(format!(
                "{} exited {}: {}",
                self.command, output.status, stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(AgentError::Parse("agent returned empty output".to_string()));
        }

        parse_agent_signal(&stdout)
    }
}
