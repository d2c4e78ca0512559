use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use tcoord_models::ledger_schema::LEDGER_DDL;
use tcoord_models::signal::{MarketRegime, SignalDirection};
use tcoord_models::{CycleDisposition, CycleNote, DecisionRecord, Outcome, WeightConfig, WeightSample};
use uuid::Uuid;

use crate::error::LedgerError;

pub(crate) const RECORD_COLUMNS: &str = "id, timestamp, agent_id, cycle_id, asset, signal_type, \
     direction, confidence, reasoning, signal_value, data_sources, market_regime, \
     contributed_to_trade, outcome_pnl, outcome_latency_days, trade_was_profitable";

/// Raw `decision_log` row as read from SQLite, before type conversion.
pub(crate) struct RawRecordRow {
    pub id: String,
    pub timestamp: String,
    pub agent_id: String,
    pub cycle_id: String,
    pub asset: String,
    pub signal_type: String,
    pub direction: String,
    pub confidence: String,
    pub reasoning: String,
    pub signal_value: String,
    pub data_sources: String,
    pub market_regime: String,
    pub contributed_to_trade: bool,
    pub outcome_pnl: Option<String>,
    pub outcome_latency_days: Option<i64>,
    pub trade_was_profitable: Option<bool>,
}

impl RawRecordRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            agent_id: row.get(2)?,
            cycle_id: row.get(3)?,
            asset: row.get(4)?,
            signal_type: row.get(5)?,
            direction: row.get(6)?,
            confidence: row.get(7)?,
            reasoning: row.get(8)?,
            signal_value: row.get(9)?,
            data_sources: row.get(10)?,
            market_regime: row.get(11)?,
            contributed_to_trade: row.get(12)?,
            outcome_pnl: row.get(13)?,
            outcome_latency_days: row.get(14)?,
            trade_was_profitable: row.get(15)?,
        })
    }

    pub(crate) fn into_record(self) -> Result<DecisionRecord, LedgerError> {
        let outcome = match self.outcome_pnl {
            Some(pnl) => Some(Outcome {
                pnl: parse_decimal(&pnl)?,
                latency_days: self
                    .outcome_latency_days
                    .and_then(|d| u32::try_from(d).ok())
                    .ok_or_else(|| {
                        LedgerError::Corrupt(format!("bad outcome_latency_days for {}", self.id))
                    })?,
                trade_was_profitable: self.trade_was_profitable,
            }),
            None => None,
        };

        Ok(DecisionRecord {
            id: parse_uuid(&self.id)?,
            timestamp: parse_timestamp(&self.timestamp)?,
            agent_id: self.agent_id,
            cycle_id: parse_uuid(&self.cycle_id)?,
            asset: self.asset,
            signal_type: self.signal_type,
            direction: SignalDirection::parse(&self.direction)
                .ok_or_else(|| LedgerError::Corrupt(format!("bad direction: {}", self.direction)))?,
            confidence: parse_decimal(&self.confidence)?,
            reasoning: self.reasoning,
            signal_value: serde_json::from_str(&self.signal_value)?,
            data_sources: serde_json::from_str(&self.data_sources)?,
            market_regime: MarketRegime::parse(&self.market_regime).ok_or_else(|| {
                LedgerError::Corrupt(format!("bad market_regime: {}", self.market_regime))
            })?,
            contributed_to_trade: self.contributed_to_trade,
            outcome,
        })
    }
}

pub(crate) fn parse_decimal(s: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str(s).map_err(|e| LedgerError::Corrupt(format!("bad decimal {s}: {e}")))
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, LedgerError> {
    Uuid::parse_str(s).map_err(|e| LedgerError::Corrupt(format!("bad uuid {s}: {e}")))
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, LedgerError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| LedgerError::Corrupt(format!("bad timestamp {s}: {e}")))
}

/// Writable decision ledger over SQLite.
///
/// Opens the shared ledger database in read-write mode with WAL journal so
/// the trading path, the adaptation daemon, and the training-side reader can
/// operate on the same file concurrently. Every append commits before the
/// call returns; there is no buffering layer in front of the audit log.
pub struct SqliteLedger {
    conn: Connection,
    weights: WeightConfig,
}

impl SqliteLedger {
    /// Open a read-write connection. Creates the schema if needed, enables
    /// WAL mode and full synchronous writes.
    pub fn open(path: &str, weights: WeightConfig) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(LEDGER_DDL)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.busy_timeout(Duration::from_millis(5_000))?;
        Ok(Self { conn, weights })
    }

    /// Open an in-memory ledger for testing.
    pub fn open_in_memory(weights: WeightConfig) -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(LEDGER_DDL)?;
        Ok(Self { conn, weights })
    }

    /// Insert a new decision record. Fails with `DuplicateId` if the id
    /// already exists; under concurrent appends of the same id exactly one
    /// caller wins.
    pub fn append_record(&self, record: &DecisionRecord) -> Result<(), LedgerError> {
        if record.confidence < Decimal::ZERO || record.confidence > Decimal::ONE {
            return Err(LedgerError::InvalidRecord(format!(
                "confidence {} outside [0, 1]",
                record.confidence
            )));
        }
        if let Some(outcome) = &record.outcome {
            outcome
                .validate_for(record.contributed_to_trade)
                .map_err(LedgerError::InvalidOutcome)?;
        }

        let result = self.conn.execute(
            "INSERT INTO decision_log (id, timestamp, agent_id, cycle_id, asset, signal_type, \
             direction, confidence, reasoning, signal_value, data_sources, market_regime, \
             contributed_to_trade, outcome_pnl, outcome_latency_days, trade_was_profitable) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                record.id.to_string(),
                record.timestamp.to_rfc3339(),
                record.agent_id,
                record.cycle_id.to_string(),
                record.asset,
                record.signal_type,
                record.direction.as_str(),
                record.confidence.to_string(),
                record.reasoning,
                record.signal_value.to_string(),
                serde_json::to_string(&record.data_sources)?,
                record.market_regime.as_str(),
                record.contributed_to_trade,
                record.outcome.as_ref().map(|o| o.pnl.to_string()),
                record.outcome.as_ref().map(|o| o.latency_days as i64),
                record.outcome.as_ref().and_then(|o| o.trade_was_profitable),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(LedgerError::DuplicateId(record.id))
            }
            Err(e) => Err(LedgerError::Sqlite(e)),
        }
    }

    /// Set the outcome fields on an existing record.
    ///
    /// The update is a compare-and-set on `outcome_pnl IS NULL`, so each
    /// outcome field makes the unset -> set transition exactly once. The
    /// attribution is logged to `outcome_log` in the same transaction so the
    /// adaptation daemon can replay in attribution order.
    pub fn attribute_outcome(&mut self, id: Uuid, outcome: &Outcome) -> Result<(), LedgerError> {
        let tx = self.conn.transaction()?;

        let existing: Option<(bool, bool)> = tx
            .query_row(
                "SELECT contributed_to_trade, outcome_pnl IS NOT NULL \
                 FROM decision_log WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (contributed, attributed) = existing.ok_or(LedgerError::NotFound(id))?;
        if attributed {
            return Err(LedgerError::AlreadyAttributed(id));
        }
        outcome
            .validate_for(contributed)
            .map_err(LedgerError::InvalidOutcome)?;

        let updated = tx.execute(
            "UPDATE decision_log SET outcome_pnl = ?2, outcome_latency_days = ?3, \
             trade_was_profitable = ?4 WHERE id = ?1 AND outcome_pnl IS NULL",
            params![
                id.to_string(),
                outcome.pnl.to_string(),
                outcome.latency_days as i64,
                outcome.trade_was_profitable,
            ],
        )?;
        if updated == 0 {
            // Lost a race with a concurrent attribution.
            return Err(LedgerError::AlreadyAttributed(id));
        }

        tx.execute(
            "INSERT INTO outcome_log (record_id, attributed_at) VALUES (?1, ?2)",
            params![id.to_string(), Utc::now().to_rfc3339()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Fetch a single record by id.
    pub fn get_record(&self, id: Uuid) -> Result<Option<DecisionRecord>, LedgerError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {RECORD_COLUMNS} FROM decision_log WHERE id = ?1"
        ))?;
        let raw = stmt
            .query_row(params![id.to_string()], RawRecordRow::from_row)
            .optional()?;
        raw.map(RawRecordRow::into_record).transpose()
    }

    /// Append a trust-weight sample. The history is append-only; samples are
    /// never updated or deleted.
    pub fn append_weight_sample(&self, sample: &WeightSample) -> Result<(), LedgerError> {
        self.validate_weight(sample)?;
        self.conn.execute(
            "INSERT INTO coordinator_weight_history (timestamp, agent_id, weight) \
             VALUES (?1, ?2, ?3)",
            params![
                sample.timestamp.to_rfc3339(),
                sample.agent_id,
                sample.weight.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Append a weight sample and advance the adaptation cursor atomically.
    /// Replay after a crash is idempotent: an outcome seq at or below the
    /// committed cursor is never applied twice.
    pub fn append_weight_sample_with_cursor(
        &mut self,
        sample: &WeightSample,
        last_seq: i64,
    ) -> Result<(), LedgerError> {
        self.validate_weight(sample)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO coordinator_weight_history (timestamp, agent_id, weight) \
             VALUES (?1, ?2, ?3)",
            params![
                sample.timestamp.to_rfc3339(),
                sample.agent_id,
                sample.weight.to_string(),
            ],
        )?;
        tx.execute(
            "INSERT INTO adapt_cursor (id, last_seq) VALUES (1, ?1) \
             ON CONFLICT(id) DO UPDATE SET last_seq = ?1",
            params![last_seq],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn validate_weight(&self, sample: &WeightSample) -> Result<(), LedgerError> {
        if !self.weights.in_bounds(sample.weight) {
            return Err(LedgerError::InvalidWeight {
                agent_id: sample.agent_id.clone(),
                weight: sample.weight,
                min: self.weights.min_weight,
                max: self.weights.max_weight,
            });
        }
        Ok(())
    }

    /// Latest committed weight for an agent, or the configured default when
    /// the agent has no history.
    pub fn current_weight(&self, agent_id: &str) -> Result<Decimal, LedgerError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT weight FROM coordinator_weight_history \
             WHERE agent_id = ?1 ORDER BY seq DESC LIMIT 1",
        )?;
        let weight: Option<String> = stmt
            .query_row(params![agent_id], |row| row.get(0))
            .optional()?;
        match weight {
            Some(w) => parse_decimal(&w),
            None => Ok(self.weights.default_weight),
        }
    }

    /// Full weight trajectory for an agent, oldest first.
    pub fn weight_history(&self, agent_id: &str) -> Result<Vec<WeightSample>, LedgerError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT timestamp, agent_id, weight FROM coordinator_weight_history \
             WHERE agent_id = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map(params![agent_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(ts, agent_id, weight)| {
                Ok(WeightSample {
                    timestamp: parse_timestamp(&ts)?,
                    agent_id,
                    weight: parse_decimal(&weight)?,
                })
            })
            .collect()
    }

    /// Record a terminal cycle disposition.
    pub fn append_cycle_note(&self, note: &CycleNote) -> Result<(), LedgerError> {
        self.conn.execute(
            "INSERT INTO cycle_log (cycle_id, asset, timestamp, disposition, detail) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.cycle_id.to_string(),
                note.asset,
                note.timestamp.to_rfc3339(),
                note.disposition.as_str(),
                note.detail,
            ],
        )?;
        Ok(())
    }

    /// All notes for a cycle, in write order.
    pub fn cycle_notes(&self, cycle_id: Uuid) -> Result<Vec<CycleNote>, LedgerError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT cycle_id, asset, timestamp, disposition, detail FROM cycle_log \
             WHERE cycle_id = ?1 ORDER BY rowid ASC",
        )?;
        let rows = stmt
            .query_map(params![cycle_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(cycle_id, asset, ts, disposition, detail)| {
                Ok(CycleNote {
                    cycle_id: parse_uuid(&cycle_id)?,
                    asset,
                    timestamp: parse_timestamp(&ts)?,
                    disposition: parse_disposition(&disposition)?,
                    detail,
                })
            })
            .collect()
    }

    /// Attribution entries after the given seq, oldest first. Used by the
    /// adaptation daemon for cursor-based replay.
    pub fn outcomes_after(&self, seq: i64) -> Result<Vec<(i64, Uuid)>, LedgerError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT seq, record_id FROM outcome_log WHERE seq > ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map(params![seq], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(seq, id)| Ok((seq, parse_uuid(&id)?)))
            .collect()
    }

    /// Last outcome seq applied by the adaptation daemon. Zero when the
    /// daemon has never run.
    pub fn adapt_cursor(&self) -> Result<i64, LedgerError> {
        let cursor: Option<i64> = self
            .conn
            .query_row("SELECT last_seq FROM adapt_cursor WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(cursor.unwrap_or(0))
    }

    /// Advance the adaptation cursor without writing a weight sample. Used
    /// when an attribution entry cannot produce an update (record missing
    /// or unreadable) but must not be replayed forever.
    pub fn advance_adapt_cursor(&self, last_seq: i64) -> Result<(), LedgerError> {
        self.conn.execute(
            "INSERT INTO adapt_cursor (id, last_seq) VALUES (1, ?1) \
             ON CONFLICT(id) DO UPDATE SET last_seq = ?1",
            params![last_seq],
        )?;
        Ok(())
    }

    /// Log receipt of a training-side adapter promotion.
    pub fn append_promotion(
        &self,
        promotion: &tcoord_models::AdapterPromotion,
    ) -> Result<(), LedgerError> {
        self.conn.execute(
            "INSERT INTO promotion_log (agent_id, adapter_version, approved_at, received_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                promotion.agent_id,
                promotion.adapter_version,
                promotion.approved_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Count all decision records.
    pub fn record_count(&self) -> Result<usize, LedgerError> {
        let count: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM decision_log", [], |row| row.get(0))?;
        Ok(count)
    }
}

pub(crate) fn parse_disposition(s: &str) -> Result<CycleDisposition, LedgerError> {
    match s {
        "approved_executed" => Ok(CycleDisposition::ApprovedExecuted),
        "approved_execution_failed" => Ok(CycleDisposition::ApprovedExecutionFailed),
        "rejected" => Ok(CycleDisposition::Rejected),
        "aborted_quorum" => Ok(CycleDisposition::AbortedQuorum),
        "aborted_no_consensus" => Ok(CycleDisposition::AbortedNoConsensus),
        _ => Err(LedgerError::Corrupt(format!("bad disposition: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tcoord_models::signal::{AgentSignal, MarketRegime, SignalDirection};

    fn sample_signal(direction: SignalDirection, confidence: Decimal) -> AgentSignal {
        AgentSignal {
            signal_type: "technical".to_string(),
            direction,
            confidence,
            reasoning: "test signal".to_string(),
            signal_value: serde_json::json!({"rsi_14": 28.0}),
            data_sources: vec!["rsi_14".to_string()],
            market_regime: MarketRegime::MeanReverting,
        }
    }

    fn make_record(contributed: bool) -> DecisionRecord {
        DecisionRecord::from_signal(
            Uuid::new_v4(),
            "AAPL",
            "technical_agent",
            &sample_signal(SignalDirection::Buy, dec!(0.8)),
            contributed,
        )
    }

    fn open_ledger() -> SqliteLedger {
        SqliteLedger::open_in_memory(WeightConfig::default()).unwrap()
    }

    #[test]
    fn append_and_get_record() {
        let ledger = open_ledger();
        let record = make_record(true);
        ledger.append_record(&record).unwrap();

        let fetched = ledger.get_record(record.id).unwrap().unwrap();
        assert_eq!(fetched, record);
    }

    #[test]
    fn duplicate_id_rejected() {
        let ledger = open_ledger();
        let record = make_record(false);
        ledger.append_record(&record).unwrap();

        let err = ledger.append_record(&record).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateId(id) if id == record.id));
    }

    #[test]
    fn confidence_out_of_bounds_rejected() {
        let ledger = open_ledger();
        let mut record = make_record(false);
        record.confidence = dec!(1.5);
        let err = ledger.append_record(&record).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRecord(_)));
    }

    #[test]
    fn attribute_outcome_once() {
        let mut ledger = open_ledger();
        let record = make_record(true);
        ledger.append_record(&record).unwrap();

        let outcome = Outcome {
            pnl: dec!(42.50),
            latency_days: 2,
            trade_was_profitable: Some(true),
        };
        ledger.attribute_outcome(record.id, &outcome).unwrap();

        let fetched = ledger.get_record(record.id).unwrap().unwrap();
        assert_eq!(fetched.outcome, Some(outcome.clone()));

        // Second attribution must fail: outcome fields are write-once.
        let err = ledger.attribute_outcome(record.id, &outcome).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyAttributed(id) if id == record.id));
    }

    #[test]
    fn attribute_outcome_missing_record() {
        let mut ledger = open_ledger();
        let outcome = Outcome {
            pnl: dec!(1),
            latency_days: 0,
            trade_was_profitable: None,
        };
        let id = Uuid::new_v4();
        let err = ledger.attribute_outcome(id, &outcome).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(missing) if missing == id));
    }

    #[test]
    fn attribute_outcome_invariant_enforced() {
        let mut ledger = open_ledger();
        let record = make_record(false);
        ledger.append_record(&record).unwrap();

        // Non-contributing record must not carry a profitability label.
        let err = ledger
            .attribute_outcome(
                record.id,
                &Outcome {
                    pnl: dec!(3),
                    latency_days: 1,
                    trade_was_profitable: Some(true),
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOutcome(_)));

        // And the failed attempt must not have consumed the write-once slot.
        ledger
            .attribute_outcome(
                record.id,
                &Outcome {
                    pnl: dec!(3),
                    latency_days: 1,
                    trade_was_profitable: None,
                },
            )
            .unwrap();
    }

    #[test]
    fn attribution_appends_outcome_log() {
        let mut ledger = open_ledger();
        let first = make_record(false);
        let second = make_record(false);
        ledger.append_record(&first).unwrap();
        ledger.append_record(&second).unwrap();

        let outcome = Outcome {
            pnl: dec!(-1.25),
            latency_days: 1,
            trade_was_profitable: None,
        };
        ledger.attribute_outcome(first.id, &outcome).unwrap();
        ledger.attribute_outcome(second.id, &outcome).unwrap();

        let entries = ledger.outcomes_after(0).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1, first.id);
        assert_eq!(entries[1].1, second.id);
        assert!(entries[0].0 < entries[1].0);

        let after_first = ledger.outcomes_after(entries[0].0).unwrap();
        assert_eq!(after_first.len(), 1);
        assert_eq!(after_first[0].1, second.id);
    }

    #[test]
    fn weight_default_then_latest() {
        let ledger = open_ledger();
        assert_eq!(
            ledger.current_weight("technical_agent").unwrap(),
            WeightConfig::default().default_weight
        );

        ledger
            .append_weight_sample(&WeightSample::now("technical_agent", dec!(0.40)))
            .unwrap();
        ledger
            .append_weight_sample(&WeightSample::now("technical_agent", dec!(0.45)))
            .unwrap();

        assert_eq!(ledger.current_weight("technical_agent").unwrap(), dec!(0.45));
        let history = ledger.weight_history("technical_agent").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].weight, dec!(0.40));
    }

    #[test]
    fn weight_out_of_bounds_rejected() {
        let ledger = open_ledger();
        let err = ledger
            .append_weight_sample(&WeightSample::now("technical_agent", dec!(0)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidWeight { .. }));

        let err = ledger
            .append_weight_sample(&WeightSample::now("technical_agent", dec!(1.2)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidWeight { .. }));
    }

    #[test]
    fn cursor_advances_with_sample() {
        let mut ledger = open_ledger();
        assert_eq!(ledger.adapt_cursor().unwrap(), 0);

        ledger
            .append_weight_sample_with_cursor(&WeightSample::now("technical_agent", dec!(0.35)), 7)
            .unwrap();
        assert_eq!(ledger.adapt_cursor().unwrap(), 7);

        ledger
            .append_weight_sample_with_cursor(&WeightSample::now("technical_agent", dec!(0.36)), 9)
            .unwrap();
        assert_eq!(ledger.adapt_cursor().unwrap(), 9);
    }

    #[test]
    fn cycle_notes_roundtrip() {
        let ledger = open_ledger();
        let cycle_id = Uuid::new_v4();
        let note = CycleNote::new(
            cycle_id,
            "AAPL",
            CycleDisposition::AbortedQuorum,
            "1 of 2 required agents responded".to_string(),
        );
        ledger.append_cycle_note(&note).unwrap();

        let notes = ledger.cycle_notes(cycle_id).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].disposition, CycleDisposition::AbortedQuorum);
        assert_eq!(notes[0].asset, "AAPL");
    }
}
