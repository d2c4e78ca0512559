use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use tcoord_models::{AdapterPromotion, CycleNote, DecisionRecord, Outcome, WeightSample};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::store::SqliteLedger;

/// Trading-side ledger capability: append, attribute, weight reads.
///
/// This is the only handle the live decision path holds. The training
/// pipeline gets a [`crate::TrainingReader`] instead, so the isolation
/// boundary is enforced by which calls are reachable, not by convention.
///
/// Current-weight reads go through a short-TTL moka cache: a weight update
/// committed mid-cycle may not be visible until expiry, which is acceptable
/// because weights change slowly and consensus never blocks on the
/// adaptation loop.
///
/// SQLite access is synchronized via `Mutex` since `rusqlite::Connection`
/// is not `Sync`.
pub struct TradingLedger {
    store: Mutex<SqliteLedger>,
    weight_cache: Cache<String, Decimal>,
}

impl TradingLedger {
    pub fn new(store: SqliteLedger, cache_capacity: u64, cache_ttl: Duration) -> Self {
        Self {
            store: Mutex::new(store),
            weight_cache: Cache::builder()
                .max_capacity(cache_capacity)
                .time_to_live(cache_ttl)
                .build(),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SqliteLedger>, LedgerError> {
        self.store
            .lock()
            .map_err(|e| LedgerError::Unavailable(format!("ledger mutex poisoned: {e}")))
    }

    /// Append a new decision record. Durable before return.
    pub fn append_record(&self, record: &DecisionRecord) -> Result<(), LedgerError> {
        self.lock()?.append_record(record)
    }

    /// Set outcome fields on an existing record (write-once per field).
    pub fn attribute_outcome(&self, id: Uuid, outcome: &Outcome) -> Result<(), LedgerError> {
        self.lock()?.attribute_outcome(id, outcome)
    }

    pub fn get_record(&self, id: Uuid) -> Result<Option<DecisionRecord>, LedgerError> {
        self.lock()?.get_record(id)
    }

    /// Append a weight sample and drop the cached value for that agent so
    /// the next read observes it.
    pub async fn append_weight_sample(&self, sample: &WeightSample) -> Result<(), LedgerError> {
        self.lock()?.append_weight_sample(sample)?;
        self.weight_cache.invalidate(&sample.agent_id).await;
        Ok(())
    }

    /// Latest committed weight for an agent, via the hot cache.
    pub async fn current_weight(&self, agent_id: &str) -> Result<Decimal, LedgerError> {
        if let Some(weight) = self.weight_cache.get(agent_id).await {
            return Ok(weight);
        }

        let weight = self.lock()?.current_weight(agent_id)?;
        self.weight_cache.insert(agent_id.to_string(), weight).await;
        Ok(weight)
    }

    /// Current weights for a set of agents, keyed by agent id.
    pub async fn current_weights(
        &self,
        agent_ids: &[String],
    ) -> Result<HashMap<String, Decimal>, LedgerError> {
        let mut weights = HashMap::with_capacity(agent_ids.len());
        for agent_id in agent_ids {
            weights.insert(agent_id.clone(), self.current_weight(agent_id).await?);
        }
        Ok(weights)
    }

    pub fn weight_history(&self, agent_id: &str) -> Result<Vec<WeightSample>, LedgerError> {
        self.lock()?.weight_history(agent_id)
    }

    /// Record a terminal cycle disposition. Durable before return.
    pub fn append_cycle_note(&self, note: &CycleNote) -> Result<(), LedgerError> {
        self.lock()?.append_cycle_note(note)
    }

    pub fn cycle_notes(&self, cycle_id: Uuid) -> Result<Vec<CycleNote>, LedgerError> {
        self.lock()?.cycle_notes(cycle_id)
    }

    /// Log receipt of an adapter promotion announcement.
    pub fn append_promotion(&self, promotion: &AdapterPromotion) -> Result<(), LedgerError> {
        self.lock()?.append_promotion(promotion)
    }

    pub fn record_count(&self) -> Result<usize, LedgerError> {
        self.lock()?.record_count()
    }
}
