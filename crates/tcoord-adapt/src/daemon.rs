use tcoord_ledger::{LedgerError, SqliteLedger};
use tcoord_models::{AdapterPromotion, Outcome, OutcomeEvent, WeightConfig, WeightSample};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::update::next_weight;

/// Weight adaptation daemon.
///
/// Consumes outcome attributions and converts each into a trust-weight
/// sample, advancing a durable cursor over the attribution log so a restart
/// replays exactly the entries that were attributed but not yet applied.
///
/// Runs on its own ledger connection; the live decision path and this
/// daemon only coordinate through SQLite itself.
pub struct AdaptDaemon {
    store: SqliteLedger,
    weights: WeightConfig,
}

impl AdaptDaemon {
    pub fn new(store: SqliteLedger, weights: WeightConfig) -> Self {
        Self { store, weights }
    }

    /// Attribute one outcome event, then apply any unapplied attributions.
    ///
    /// Unknown record ids and redelivered events are logged and skipped;
    /// the event stream is at-least-once and the cursor makes application
    /// exactly-once.
    pub fn handle_outcome(&mut self, event: &OutcomeEvent) -> Result<usize, LedgerError> {
        let outcome = Outcome {
            pnl: event.pnl,
            latency_days: event.latency_days,
            trade_was_profitable: event.trade_was_profitable,
        };

        match self.store.attribute_outcome(event.record_id, &outcome) {
            Ok(()) => {}
            Err(LedgerError::NotFound(id)) => {
                warn!(record_id = %id, "Outcome event for unknown record; skipping");
                return Ok(0);
            }
            Err(LedgerError::AlreadyAttributed(id)) => {
                info!(record_id = %id, "Outcome already attributed; skipping redelivery");
            }
            Err(LedgerError::InvalidOutcome(reason)) => {
                warn!(record_id = %event.record_id, reason = %reason, "Malformed outcome event; skipping");
                return Ok(0);
            }
            Err(e) => return Err(e),
        }

        self.apply_pending()
    }

    /// Apply every attribution past the cursor as a weight update.
    ///
    /// Each application commits the new sample and the advanced cursor in
    /// one transaction. Entries whose record cannot be read advance the
    /// cursor without a sample so they are not replayed forever.
    pub fn apply_pending(&mut self) -> Result<usize, LedgerError> {
        let cursor = self.store.adapt_cursor()?;
        let pending = self.store.outcomes_after(cursor)?;
        let mut applied = 0;

        for (seq, record_id) in pending {
            let record = match self.store.get_record(record_id) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    warn!(seq, record_id = %record_id, "Attributed record missing; advancing cursor");
                    self.store.advance_adapt_cursor(seq)?;
                    continue;
                }
                Err(LedgerError::Corrupt(reason)) => {
                    warn!(seq, record_id = %record_id, reason = %reason, "Attributed record unreadable; advancing cursor");
                    self.store.advance_adapt_cursor(seq)?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(outcome) = &record.outcome else {
                warn!(seq, record_id = %record_id, "Attribution entry without outcome fields; advancing cursor");
                self.store.advance_adapt_cursor(seq)?;
                continue;
            };

            let current = self.store.current_weight(&record.agent_id)?;
            let next = next_weight(
                &self.weights,
                current,
                record.confidence,
                outcome.pnl,
                outcome.latency_days,
            );
            let sample = WeightSample::now(&record.agent_id, next);
            self.store.append_weight_sample_with_cursor(&sample, seq)?;
            applied += 1;

            info!(
                agent = %record.agent_id,
                record_id = %record_id,
                pnl = %outcome.pnl,
                weight_before = %current,
                weight_after = %next,
                "Weight updated"
            );
        }

        Ok(applied)
    }

    /// Log a training-side adapter promotion. The trading core never loads
    /// adapters; this is receipt-only.
    pub fn handle_promotion(&self, promotion: &AdapterPromotion) -> Result<(), LedgerError> {
        info!(
            agent = %promotion.agent_id,
            adapter_version = %promotion.adapter_version,
            approved_at = %promotion.approved_at,
            "Adapter promotion received"
        );
        self.store.append_promotion(promotion)
    }

    /// Replay unapplied attributions, then consume events until the feed
    /// closes or cancellation is requested.
    pub async fn run(
        mut self,
        mut outcomes: mpsc::Receiver<OutcomeEvent>,
        mut promotions: mpsc::Receiver<AdapterPromotion>,
        cancel: CancellationToken,
    ) -> Result<(), LedgerError> {
        let replayed = self.apply_pending()?;
        if replayed > 0 {
            info!(replayed, "Replayed unapplied outcome attributions");
        }

        let mut promotions_open = true;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Adaptation daemon stopping");
                    return Ok(());
                }
                event = outcomes.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle_outcome(&event) {
                            error!(record_id = %event.record_id, error = %e, "Outcome handling failed");
                            return Err(e);
                        }
                    }
                    None => {
                        info!("Outcome feed closed; adaptation daemon stopping");
                        return Ok(());
                    }
                },
                promotion = promotions.recv(), if promotions_open => match promotion {
                    Some(promotion) => {
                        if let Err(e) = self.handle_promotion(&promotion) {
                            error!(agent = %promotion.agent_id, error = %e, "Promotion logging failed");
                            return Err(e);
                        }
                    }
                    None => promotions_open = false,
                }
            }
        }
    }
}
