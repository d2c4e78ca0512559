//! Trading decision coordinator: multi-agent signal collection, weighted
//! consensus, risk gating and an auditable decision ledger.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tcoord::models::{TcoordConfig, MarketTick};
//! use tcoord::agents::{CycleRunner, SignalAgent};
//! use tcoord::ledger::{TradingLedger, TrainingReader};
//! ```

pub use tcoord_agents as agents;
pub use tcoord_ledger as ledger;
pub use tcoord_models as models;

pub mod engine;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tcoord_agents::{
    Collector, CommandAgent, ConsensusEngine, CycleRunner, ExecutionService, ExposureProvider,
    ExposureState, FixedExposure, PaperExecution, RiskGate, SignalAgent,
};
use tcoord_ledger::{SqliteLedger, TradingLedger};
use tcoord_models::TcoordConfig;

/// Build a cycle runner from configuration with caller-supplied exposure
/// and execution backends.
pub fn build_runner(
    config: &TcoordConfig,
    exposure: Arc<dyn ExposureProvider>,
    execution: Arc<dyn ExecutionService>,
) -> Result<(CycleRunner, Arc<TradingLedger>), anyhow::Error> {
    let store = SqliteLedger::open(&config.ledger.sqlite_path, config.weights.clone())?;
    let ledger = Arc::new(TradingLedger::new(
        store,
        config.ledger.weight_cache_capacity,
        Duration::from_secs(config.ledger.weight_cache_ttl_seconds),
    ));

    let agents: Vec<Arc<dyn SignalAgent>> = config
        .agents
        .iter()
        .filter(|a| a.enabled)
        .map(|a| {
            Arc::new(CommandAgent::new(
                a.agent_id.clone(),
                a.command.clone(),
                a.args.clone(),
            )) as Arc<dyn SignalAgent>
        })
        .collect();

    let runner = CycleRunner::new(
        Collector::new(agents, &config.collector),
        ConsensusEngine::new(config.consensus.clone()),
        RiskGate::new(config.risk.clone()),
        exposure,
        execution,
        Arc::clone(&ledger),
        config.cycle.clone(),
    );

    Ok((runner, ledger))
}

/// Build a paper-trading runner: fixed exposure at the configured portfolio
/// value, instant fills.
pub fn build_paper_runner(
    config: &TcoordConfig,
) -> Result<(CycleRunner, Arc<TradingLedger>), anyhow::Error> {
    let exposure = Arc::new(FixedExposure(ExposureState {
        portfolio_value: config.paper.portfolio_value,
        asset_exposure: Decimal::ZERO,
        total_exposure: Decimal::ZERO,
    }));
    build_runner(config, exposure, Arc::new(PaperExecution))
}
