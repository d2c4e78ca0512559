use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::weight::WeightConfig;

/// Top-level configuration for the trading-side coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TcoordConfig {
    pub ledger: LedgerConfig,
    pub collector: CollectorConfig,
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub paper: PaperConfig,
    pub agents: Vec<AgentConfig>,
}

/// Paper-trading parameters used when no live venue is wired in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperConfig {
    /// Simulated portfolio value the risk gate sizes positions against.
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: Decimal,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            portfolio_value: default_portfolio_value(),
        }
    }
}

/// Configuration for the decision ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerConfig {
    /// Path to the ledger SQLite file (WAL mode, shared with the
    /// adaptation daemon and the training-side reader).
    pub sqlite_path: String,
    /// Capacity of the moka hot cache for current-weight lookups.
    #[serde(default = "default_weight_cache_capacity")]
    pub weight_cache_capacity: u64,
    /// TTL in seconds for cached current-weight reads. Weight updates
    /// landing inside this window become visible on expiry; weights change
    /// slowly so eventual visibility is acceptable.
    #[serde(default = "default_weight_cache_ttl")]
    pub weight_cache_ttl_seconds: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/tcoord_ledger.db".to_string(),
            weight_cache_capacity: default_weight_cache_capacity(),
            weight_cache_ttl_seconds: default_weight_cache_ttl(),
        }
    }
}

/// Configuration for the per-cycle signal collector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectorConfig {
    /// Collection budget per cycle in milliseconds. Agents that have not
    /// responded when it expires are recorded as absent.
    #[serde(default = "default_collect_timeout")]
    pub collect_timeout_ms: u64,
    /// Minimum number of responding agents required to produce a decision.
    #[serde(default = "default_quorum")]
    pub quorum: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            collect_timeout_ms: default_collect_timeout(),
            quorum: default_quorum(),
        }
    }
}

/// Configuration for the weighted consensus engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsensusConfig {
    /// Optional bonus added to aggregate confidence when responding agents
    /// consulted overlapping data sources. Extension point; disabled by
    /// default, in which case the plain weighted formula applies.
    #[serde(default)]
    pub source_overlap_bonus: Option<Decimal>,
}

#[allow(clippy::derivable_impls)]
impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            source_overlap_bonus: None,
        }
    }
}

/// Hard risk limits applied to every consensus decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    /// Minimum aggregate confidence for approval.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: Decimal,
    /// Maximum position value as a fraction of portfolio value, per asset.
    #[serde(default = "default_max_position_pct")]
    pub max_position_pct: Decimal,
    /// Maximum total exposure as a fraction of portfolio value.
    #[serde(default = "default_max_portfolio_exposure_pct")]
    pub max_portfolio_exposure_pct: Decimal,
    /// Assets on the kill switch. Always rejected.
    #[serde(default)]
    pub halted_assets: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_position_pct: default_max_position_pct(),
            max_portfolio_exposure_pct: default_max_portfolio_exposure_pct(),
            halted_assets: vec![],
        }
    }
}

/// Cycle-runner policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleConfig {
    /// Attempts for a ledger write before the cycle is abandoned. Losing a
    /// write breaks the audit guarantee, so writes are retried with backoff.
    #[serde(default = "default_write_attempts")]
    pub ledger_write_attempts: u32,
    /// Initial backoff between write attempts; doubles per attempt.
    #[serde(default = "default_write_backoff")]
    pub ledger_write_backoff_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            ledger_write_attempts: default_write_attempts(),
            ledger_write_backoff_ms: default_write_backoff(),
        }
    }
}

/// Configuration for a single registered agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub agent_id: String,
    /// Command to invoke for this agent's signal subprocess.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_weight_cache_capacity() -> u64 {
    1_000
}
fn default_weight_cache_ttl() -> u64 {
    2
}
fn default_collect_timeout() -> u64 {
    30_000
}
fn default_quorum() -> usize {
    2
}
fn default_min_confidence() -> Decimal {
    Decimal::new(50, 2) // 0.50
}
fn default_max_position_pct() -> Decimal {
    Decimal::new(2, 2) // 0.02
}
fn default_max_portfolio_exposure_pct() -> Decimal {
    Decimal::new(10, 2) // 0.10
}
fn default_portfolio_value() -> Decimal {
    Decimal::new(100_000, 0)
}
fn default_write_attempts() -> u32 {
    3
}
fn default_write_backoff() -> u64 {
    200
}
fn default_true() -> bool {
    true
}
