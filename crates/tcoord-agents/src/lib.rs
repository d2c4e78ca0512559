//! Agent coordination for the trading decision core: signal collection,
//! weighted consensus, the risk gate and the per-tick cycle runner.

pub mod agent;
pub mod collector;
pub mod consensus;
pub mod cycle;
pub mod error;
pub mod execution;
pub mod parser;
pub mod risk;
pub mod test_support;

pub use agent::{CommandAgent, SignalAgent};
pub use collector::{CollectedSignal, CollectedSignals, Collector};
pub use consensus::{ConsensusEngine, WeightedSignal};
pub use cycle::{CycleOutcome, CycleRunner};
pub use error::{AgentError, CycleError};
pub use execution::{ExecutionResult, ExecutionService, PaperExecution};
pub use risk::{ExposureProvider, ExposureState, FixedExposure, RiskGate, RiskVerdict};
