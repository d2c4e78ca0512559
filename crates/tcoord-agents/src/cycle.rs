use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tcoord_ledger::{LedgerError, TradingLedger};
use tcoord_models::{
    ConsensusDecision, CycleConfig, CycleDisposition, CycleNote, DecisionRecord, MarketTick,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::collector::Collector;
use crate::consensus::{ConsensusEngine, WeightedSignal};
use crate::error::CycleError;
use crate::execution::{ExecutionResult, ExecutionService};
use crate::risk::{ExposureProvider, RiskGate, RiskVerdict};

/// Result of one completed decision cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub cycle_id: Uuid,
    pub asset: String,
    pub disposition: CycleDisposition,
    pub decision: Option<ConsensusDecision>,
}

/// Drives one asset tick through collect, consensus, risk and execution,
/// then writes the audit trail.
///
/// Every cycle terminates with exactly one cycle note; the per-agent
/// records for a cycle are appended in the same pass, with
/// `contributed_to_trade` already final.
pub struct CycleRunner {
    collector: Collector,
    engine: ConsensusEngine,
    gate: RiskGate,
    exposure: Arc<dyn ExposureProvider>,
    execution: Arc<dyn ExecutionService>,
    ledger: Arc<TradingLedger>,
    config: CycleConfig,
}

impl CycleRunner {
    pub fn new(
        collector: Collector,
        engine: ConsensusEngine,
        gate: RiskGate,
        exposure: Arc<dyn ExposureProvider>,
        execution: Arc<dyn ExecutionService>,
        ledger: Arc<TradingLedger>,
        config: CycleConfig,
    ) -> Self {
        Self {
            collector,
            engine,
            gate,
            exposure,
            execution,
            ledger,
            config,
        }
    }

    /// Run one decision cycle for a tick.
    ///
    /// Quorum and consensus aborts are normal terminations: they write
    /// their audit trail and return a `CycleOutcome` like any other
    /// disposition. Only ledger failures that survive the write retries
    /// surface as errors.
    pub async fn run_cycle(&self, tick: &MarketTick) -> Result<CycleOutcome, CycleError> {
        let cycle_id = Uuid::new_v4();
        info!(cycle_id = %cycle_id, asset = %tick.asset, regime = %tick.market_regime.as_str(), "Cycle started");

        let collected = match self
            .collector
            .collect(&tick.asset, cycle_id, tick.market_regime)
            .await
        {
            Ok(collected) => collected,
            Err(CycleError::QuorumNotMet {
                responded,
                required,
            }) => {
                let note = CycleNote::new(
                    cycle_id,
                    &tick.asset,
                    CycleDisposition::AbortedQuorum,
                    format!("{responded} of {required} required agents responded"),
                );
                self.write_note(&note).await?;
                return Ok(CycleOutcome {
                    cycle_id,
                    asset: tick.asset.clone(),
                    disposition: CycleDisposition::AbortedQuorum,
                    decision: None,
                });
            }
            Err(e) => return Err(e),
        };

        let agent_ids = self.collector.agent_ids();
        let weights = self.ledger.current_weights(&agent_ids).await?;
        let total_registered_weight: Decimal = weights.values().copied().sum();

        // Draft one record per responder now so consensus contributions can
        // carry the record ids. contributed_to_trade stays false until a
        // trade actually fills.
        let mut records: Vec<DecisionRecord> = Vec::new();
        let mut inputs: Vec<WeightedSignal> = Vec::new();
        for (agent_id, signal) in collected.responses() {
            let record =
                DecisionRecord::from_signal(cycle_id, &tick.asset, agent_id, signal, false);
            inputs.push(WeightedSignal {
                record_id: record.id,
                agent_id: agent_id.to_string(),
                weight: weights.get(agent_id).copied().unwrap_or_default(),
                signal: signal.clone(),
            });
            records.push(record);
        }

        let decision =
            match self
                .engine
                .compute(cycle_id, &tick.asset, &inputs, total_registered_weight)
            {
                Ok(decision) => decision,
                Err(CycleError::NoConsensus) => {
                    let note = CycleNote::new(
                        cycle_id,
                        &tick.asset,
                        CycleDisposition::AbortedNoConsensus,
                        "weighted confidence mass is zero".to_string(),
                    );
                    self.write_records_and_note(&records, &note).await?;
                    return Ok(CycleOutcome {
                        cycle_id,
                        asset: tick.asset.clone(),
                        disposition: CycleDisposition::AbortedNoConsensus,
                        decision: None,
                    });
                }
                Err(e) => return Err(e),
            };

        let exposure = self.exposure.snapshot(&tick.asset);
        let (disposition, detail) = match self.gate.evaluate(&decision, &exposure) {
            RiskVerdict::Rejected { reason } => (CycleDisposition::Rejected, reason),
            RiskVerdict::Approved { position_size } => {
                match self
                    .execution
                    .submit(&tick.asset, decision.direction, position_size)
                    .await
                {
                    ExecutionResult::Filled { order_id } => {
                        for record in &mut records {
                            record.contributed_to_trade = true;
                        }
                        (
                            CycleDisposition::ApprovedExecuted,
                            format!("order {order_id} filled at size {position_size}"),
                        )
                    }
                    ExecutionResult::Rejected { reason } => (
                        CycleDisposition::ApprovedExecutionFailed,
                        format!("venue rejected order: {reason}"),
                    ),
                    ExecutionResult::Failed { reason } => (
                        CycleDisposition::ApprovedExecutionFailed,
                        format!("execution failed: {reason}"),
                    ),
                }
            }
        };

        let note = CycleNote::new(cycle_id, &tick.asset, disposition, detail);
        self.write_records_and_note(&records, &note).await?;

        info!(
            cycle_id = %cycle_id,
            asset = %tick.asset,
            disposition = %disposition.as_str(),
            aggregate = %decision.aggregate,
            confidence = %decision.confidence,
            "Cycle completed"
        );

        Ok(CycleOutcome {
            cycle_id,
            asset: tick.asset.clone(),
            disposition,
            decision: Some(decision),
        })
    }

    async fn write_records_and_note(
        &self,
        records: &[DecisionRecord],
        note: &CycleNote,
    ) -> Result<(), CycleError> {
        for record in records {
            self.with_retry(|| self.ledger.append_record(record))
                .await?;
        }
        self.write_note(note).await
    }

    async fn write_note(&self, note: &CycleNote) -> Result<(), CycleError> {
        self.with_retry(|| self.ledger.append_cycle_note(note)).await
    }

    /// Retry a ledger write with doubling backoff. A duplicate-id error on
    /// a retry means an earlier attempt landed; that is success.
    async fn with_retry<F>(&self, mut op: F) -> Result<(), CycleError>
    where
        F: FnMut() -> Result<(), LedgerError>,
    {
        let mut backoff = Duration::from_millis(self.config.ledger_write_backoff_ms);
        let attempts = self.config.ledger_write_attempts.max(1);

        for attempt in 1..=attempts {
            match op() {
                Ok(()) => return Ok(()),
                Err(LedgerError::DuplicateId(_)) if attempt > 1 => return Ok(()),
                Err(e) if attempt == attempts => return Err(e.into()),
                Err(e) => {
                    warn!(attempt, error = %e, "Ledger write failed; retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
        unreachable!()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tcoord_ledger::SqliteLedger;
    use tcoord_models::{
        CollectorConfig, ConsensusConfig, MarketRegime, RiskConfig, SignalDirection, WeightConfig,
        WeightSample,
    };

    use crate::risk::{ExposureState, FixedExposure};
    use crate::test_support::ScriptedAgent;
    use crate::agent::SignalAgent;

    struct RefusingExecution;

    #[async_trait]
    impl ExecutionService for RefusingExecution {
        async fn submit(
            &self,
            _asset: &str,
            _direction: SignalDirection,
            _position_size: Decimal,
        ) -> ExecutionResult {
            ExecutionResult::Rejected {
                reason: "insufficient buying power".to_string(),
            }
        }
    }

    fn ledger() -> Arc<TradingLedger> {
        let store = SqliteLedger::open_in_memory(WeightConfig::default()).unwrap();
        Arc::new(TradingLedger::new(store, 100, Duration::from_millis(10)))
    }

    fn exposure() -> Arc<dyn ExposureProvider> {
        Arc::new(FixedExposure(ExposureState {
            portfolio_value: dec!(100000),
            asset_exposure: dec!(0),
            total_exposure: dec!(0),
        }))
    }

    fn runner(
        agents: Vec<Arc<dyn SignalAgent>>,
        quorum: usize,
        execution: Arc<dyn ExecutionService>,
        ledger: Arc<TradingLedger>,
    ) -> CycleRunner {
        CycleRunner::new(
            Collector::new(
                agents,
                &CollectorConfig {
                    collect_timeout_ms: 500,
                    quorum,
                },
            ),
            ConsensusEngine::new(ConsensusConfig::default()),
            RiskGate::new(RiskConfig::default()),
            exposure(),
            execution,
            ledger,
            CycleConfig {
                ledger_write_attempts: 3,
                ledger_write_backoff_ms: 10,
            },
        )
    }

    fn tick(asset: &str) -> MarketTick {
        MarketTick {
            timestamp: Utc::now(),
            asset: asset.to_string(),
            market_regime: MarketRegime::MeanReverting,
        }
    }

    #[tokio::test]
    async fn approved_cycle_marks_records_contributing() {
        let ledger = ledger();
        // Weights from the scenario: 0.5 buy@0.9, 0.3 sell@0.4, 0.2 absent.
        ledger
            .append_weight_sample(&WeightSample::now("technical_agent", dec!(0.5)))
            .await
            .unwrap();
        ledger
            .append_weight_sample(&WeightSample::now("research_agent", dec!(0.3)))
            .await
            .unwrap();
        ledger
            .append_weight_sample(&WeightSample::now("risk_agent", dec!(0.2)))
            .await
            .unwrap();

        let agents: Vec<Arc<dyn SignalAgent>> = vec![
            Arc::new(ScriptedAgent::responding(
                "technical_agent",
                SignalDirection::Buy,
                dec!(0.9),
            )),
            Arc::new(ScriptedAgent::responding(
                "research_agent",
                SignalDirection::Sell,
                dec!(0.4),
            )),
            Arc::new(ScriptedAgent::slow("risk_agent", Duration::from_secs(5))),
        ];

        let runner = runner(agents, 2, Arc::new(crate::execution::PaperExecution), ledger.clone());
        let outcome = runner.run_cycle(&tick("AAPL")).await.unwrap();

        assert_eq!(outcome.disposition, CycleDisposition::ApprovedExecuted);
        let decision = outcome.decision.unwrap();
        assert_eq!(decision.direction, SignalDirection::Buy);
        assert_eq!(decision.confidence, dec!(0.57));
        assert_eq!(decision.aggregate, dec!(0.33) / dec!(0.57));

        // Both responders' records are durable and marked contributing.
        assert_eq!(ledger.record_count().unwrap(), 2);
        for contribution in &decision.contributions {
            let record = ledger.get_record(contribution.record_id).unwrap().unwrap();
            assert!(record.contributed_to_trade);
            assert_eq!(record.cycle_id, outcome.cycle_id);
        }

        let notes = ledger.cycle_notes(outcome.cycle_id).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].disposition, CycleDisposition::ApprovedExecuted);
    }

    #[tokio::test]
    async fn quorum_abort_writes_only_the_note() {
        let ledger = ledger();
        let agents: Vec<Arc<dyn SignalAgent>> = vec![
            Arc::new(ScriptedAgent::responding(
                "technical_agent",
                SignalDirection::Buy,
                dec!(0.9),
            )),
            Arc::new(ScriptedAgent::failing("research_agent")),
        ];

        let runner = runner(agents, 2, Arc::new(crate::execution::PaperExecution), ledger.clone());
        let outcome = runner.run_cycle(&tick("AAPL")).await.unwrap();

        assert_eq!(outcome.disposition, CycleDisposition::AbortedQuorum);
        assert!(outcome.decision.is_none());
        assert_eq!(ledger.record_count().unwrap(), 0);

        let notes = ledger.cycle_notes(outcome.cycle_id).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].detail.contains("1 of 2"));
    }

    #[tokio::test]
    async fn rejected_cycle_keeps_records_non_contributing() {
        let ledger = ledger();
        // Low weights leave aggregate confidence under the 0.50 floor.
        let agents: Vec<Arc<dyn SignalAgent>> = vec![
            Arc::new(ScriptedAgent::responding(
                "technical_agent",
                SignalDirection::Buy,
                dec!(0.4),
            )),
            Arc::new(ScriptedAgent::responding(
                "research_agent",
                SignalDirection::Buy,
                dec!(0.3),
            )),
        ];

        let runner = runner(agents, 2, Arc::new(crate::execution::PaperExecution), ledger.clone());
        let outcome = runner.run_cycle(&tick("AAPL")).await.unwrap();

        assert_eq!(outcome.disposition, CycleDisposition::Rejected);
        assert_eq!(ledger.record_count().unwrap(), 2);
        for contribution in &outcome.decision.unwrap().contributions {
            let record = ledger.get_record(contribution.record_id).unwrap().unwrap();
            assert!(!record.contributed_to_trade);
        }
    }

    #[tokio::test]
    async fn venue_rejection_is_execution_failed_disposition() {
        let ledger = ledger();
        let agents: Vec<Arc<dyn SignalAgent>> = vec![
            Arc::new(ScriptedAgent::responding(
                "technical_agent",
                SignalDirection::Buy,
                dec!(0.9),
            )),
            Arc::new(ScriptedAgent::responding(
                "research_agent",
                SignalDirection::Buy,
                dec!(0.9),
            )),
        ];

        let runner = runner(agents, 2, Arc::new(RefusingExecution), ledger.clone());
        let outcome = runner.run_cycle(&tick("AAPL")).await.unwrap();

        assert_eq!(
            outcome.disposition,
            CycleDisposition::ApprovedExecutionFailed
        );
        // No fill, so nothing contributed to a trade.
        for contribution in &outcome.decision.unwrap().contributions {
            let record = ledger.get_record(contribution.record_id).unwrap().unwrap();
            assert!(!record.contributed_to_trade);
        }
        let notes = ledger.cycle_notes(outcome.cycle_id).unwrap();
        assert!(notes[0].detail.contains("insufficient buying power"));
    }
}
