use thiserror::Error;

/// Failures local to one agent's signal request. These never abort the
/// cycle; a failed or slow agent is simply recorded as absent.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent process error: {0}")]
    Spawn(String),

    #[error("Agent response parse error: {0}")]
    Parse(String),

    #[error("Agent timed out after {0} ms")]
    Timeout(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of one decision cycle. All variants terminate only the cycle
/// they occur in; other assets' cycles and the adaptation loop are
/// unaffected.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Quorum not met: {responded} of {required} required agents responded")]
    QuorumNotMet { responded: usize, required: usize },

    #[error("No consensus: weighted confidence mass is zero")]
    NoConsensus,

    #[error("Ledger error: {0}")]
    Ledger(#[from] tcoord_ledger::LedgerError),
}
