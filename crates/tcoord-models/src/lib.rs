pub mod config;
pub mod consensus;
pub mod decision_record;
pub mod events;
pub mod ledger_schema;
pub mod signal;
pub mod weight;

pub use config::{
    AgentConfig, CollectorConfig, ConsensusConfig, CycleConfig, LedgerConfig, PaperConfig,
    RiskConfig, TcoordConfig,
};
pub use consensus::{ConsensusDecision, Contribution, CycleDisposition, CycleNote};
pub use decision_record::{DecisionRecord, Outcome};
pub use events::{AdapterPromotion, MarketTick, OutcomeEvent};
pub use signal::{AgentSignal, MarketRegime, SignalDirection, SignalRequest};
pub use weight::{WeightConfig, WeightSample};
