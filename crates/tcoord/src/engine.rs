use std::collections::HashMap;
use std::sync::Arc;

use tcoord_agents::CycleRunner;
use tcoord_models::MarketTick;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Tick-driven engine over a [`CycleRunner`].
///
/// Ticks for different assets run concurrently; ticks for the same asset
/// are serialized behind a per-asset lock so two cycles never interleave
/// their ledger writes for one symbol.
pub struct Engine {
    runner: Arc<CycleRunner>,
    // One entry per distinct symbol ever ticked, never evicted; bounded by
    // the traded asset universe, not by tick volume.
    asset_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(runner: CycleRunner) -> Self {
        Self {
            runner: Arc::new(runner),
            asset_locks: Mutex::new(HashMap::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn asset_lock(&self, asset: &str) -> Arc<Mutex<()>> {
        let mut locks = self.asset_locks.lock().await;
        Arc::clone(
            locks
                .entry(asset.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Consume ticks until the channel closes or cancellation is requested,
    /// then wait for in-flight cycles to finish.
    ///
    /// A failed cycle is logged and does not stop the engine; the failure
    /// is already visible in the ledger where the cycle got far enough to
    /// write.
    pub async fn run(&self, mut ticks: mpsc::Receiver<MarketTick>) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("Engine cancelled; draining in-flight cycles");
                    break;
                }
                tick = ticks.recv() => match tick {
                    Some(tick) => {
                        let lock = self.asset_lock(&tick.asset).await;
                        let runner = Arc::clone(&self.runner);
                        in_flight.spawn(async move {
                            let _guard = lock.lock().await;
                            match runner.run_cycle(&tick).await {
                                Ok(outcome) => {
                                    info!(
                                        cycle_id = %outcome.cycle_id,
                                        asset = %outcome.asset,
                                        disposition = %outcome.disposition.as_str(),
                                        "Tick processed"
                                    );
                                }
                                Err(e) => {
                                    error!(asset = %tick.asset, error = %e, "Cycle failed");
                                }
                            }
                        });
                    }
                    None => {
                        info!("Tick feed closed; draining in-flight cycles");
                        break;
                    }
                }
            }
        }

        while in_flight.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tcoord_agents::test_support::ScriptedAgent;
    use tcoord_agents::{
        Collector, ConsensusEngine, ExposureState, FixedExposure, PaperExecution, RiskGate,
        SignalAgent,
    };
    use tcoord_ledger::{SqliteLedger, TradingLedger};
    use tcoord_models::{
        CollectorConfig, ConsensusConfig, CycleConfig, MarketRegime, RiskConfig, SignalDirection,
        WeightConfig,
    };

    fn paper_runner() -> (CycleRunner, Arc<TradingLedger>) {
        let store = SqliteLedger::open_in_memory(WeightConfig::default()).unwrap();
        let ledger = Arc::new(TradingLedger::new(store, 100, Duration::from_millis(10)));

        let agents: Vec<Arc<dyn SignalAgent>> = vec![
            Arc::new(ScriptedAgent::responding(
                "technical_agent",
                SignalDirection::Buy,
                dec!(0.9),
            )),
            Arc::new(ScriptedAgent::responding(
                "research_agent",
                SignalDirection::Buy,
                dec!(0.8),
            )),
        ];

        let runner = CycleRunner::new(
            Collector::new(
                agents,
                &CollectorConfig {
                    collect_timeout_ms: 500,
                    quorum: 2,
                },
            ),
            ConsensusEngine::new(ConsensusConfig::default()),
            RiskGate::new(RiskConfig::default()),
            Arc::new(FixedExposure(ExposureState {
                portfolio_value: dec!(100000),
                asset_exposure: dec!(0),
                total_exposure: dec!(0),
            })),
            Arc::new(PaperExecution),
            Arc::clone(&ledger),
            CycleConfig::default(),
        );
        (runner, ledger)
    }

    fn tick(asset: &str) -> MarketTick {
        MarketTick {
            timestamp: Utc::now(),
            asset: asset.to_string(),
            market_regime: MarketRegime::TrendingBull,
        }
    }

    #[tokio::test]
    async fn drains_feed_and_records_every_cycle() {
        let (runner, ledger) = paper_runner();
        let engine = Engine::new(runner);

        let (tx, rx) = mpsc::channel(8);
        for asset in ["AAPL", "TSLA", "AAPL"] {
            tx.send(tick(asset)).await.unwrap();
        }
        drop(tx);

        engine.run(rx).await;

        // Three cycles, two responder records each.
        assert_eq!(ledger.record_count().unwrap(), 6);
    }

    #[tokio::test]
    async fn cancellation_stops_consuming() {
        let (runner, ledger) = paper_runner();
        let engine = Engine::new(runner);
        engine.cancel_token().cancel();

        let (tx, rx) = mpsc::channel(8);
        tx.send(tick("AAPL")).await.unwrap();

        engine.run(rx).await;
        assert_eq!(ledger.record_count().unwrap(), 0);
    }
}
