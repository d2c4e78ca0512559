use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::Connection;
use tcoord_models::DecisionRecord;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::store::{RawRecordRow, RECORD_COLUMNS};

const DEFAULT_BATCH_SIZE: usize = 256;

/// Filter for training-side record queries.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub agent_id: Option<String>,
    pub asset: Option<String>,
    /// Only records whose outcome has been attributed.
    pub attributed_only: bool,
}

/// Read-only ledger capability for the training pipeline.
///
/// Opens its own read-only connection; with WAL journaling its queries see
/// a consistent snapshot and never block the trading-side writers. No
/// append or attribute call is reachable from this type — that is the
/// isolation boundary.
pub struct TrainingReader {
    conn: Mutex<Connection>,
}

impl TrainingReader {
    /// Open a read-only connection to the shared ledger database.
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_millis(5_000))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lazily iterate matching records in timestamp-ascending order.
    ///
    /// The query is keyset-paginated on `(timestamp, id)`, so it is
    /// restartable: resume with [`RecordQuery::resume_after`] using the last
    /// record seen.
    pub fn query_records(&self, filter: RecordFilter) -> RecordQuery<'_> {
        RecordQuery {
            reader: self,
            filter,
            cursor: None,
            buffer: VecDeque::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            exhausted: false,
        }
    }

    /// Count records whose outcome is fully attributed. Training-trigger
    /// threshold input.
    pub fn count_attributed(&self) -> Result<usize, LedgerError> {
        let conn = self.lock()?;
        let count: usize = conn.query_row(
            "SELECT COUNT(*) FROM decision_log \
             WHERE outcome_pnl IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, LedgerError> {
        self.conn
            .lock()
            .map_err(|e| LedgerError::Unavailable(format!("reader mutex poisoned: {e}")))
    }

    fn fetch_batch(
        &self,
        filter: &RecordFilter,
        cursor: &Option<(String, String)>,
        limit: usize,
    ) -> Result<Vec<DecisionRecord>, LedgerError> {
        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM decision_log WHERE 1=1");
        let mut params: Vec<&dyn ToSql> = Vec::new();

        let from = filter.from.map(|t| t.to_rfc3339());
        let to = filter.to.map(|t| t.to_rfc3339());

        if let Some((ts, id)) = cursor {
            sql.push_str(" AND (timestamp, id) > (?, ?)");
            params.push(ts);
            params.push(id);
        }
        if let Some(from) = &from {
            sql.push_str(" AND timestamp >= ?");
            params.push(from);
        }
        if let Some(to) = &to {
            sql.push_str(" AND timestamp <= ?");
            params.push(to);
        }
        if let Some(agent_id) = &filter.agent_id {
            sql.push_str(" AND agent_id = ?");
            params.push(agent_id);
        }
        if let Some(asset) = &filter.asset {
            sql.push_str(" AND asset = ?");
            params.push(asset);
        }
        if filter.attributed_only {
            sql.push_str(" AND outcome_pnl IS NOT NULL");
        }
        sql.push_str(" ORDER BY timestamp ASC, id ASC LIMIT ?");
        let limit = limit as i64;
        params.push(&limit);

        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let raw_rows = stmt
            .query_map(params.as_slice(), RawRecordRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raw_rows
            .into_iter()
            .map(RawRecordRow::into_record)
            .collect()
    }
}

/// Lazy, restartable record sequence, ordered by timestamp ascending.
pub struct RecordQuery<'a> {
    reader: &'a TrainingReader,
    filter: RecordFilter,
    cursor: Option<(String, String)>,
    buffer: VecDeque<DecisionRecord>,
    batch_size: usize,
    exhausted: bool,
}

impl RecordQuery<'_> {
    /// Resume iteration strictly after the given record position.
    pub fn resume_after(mut self, timestamp: DateTime<Utc>, id: Uuid) -> Self {
        self.cursor = Some((timestamp.to_rfc3339(), id.to_string()));
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl Iterator for RecordQuery<'_> {
    type Item = Result<DecisionRecord, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.buffer.pop_front() {
            return Some(Ok(record));
        }
        if self.exhausted {
            return None;
        }

        match self
            .reader
            .fetch_batch(&self.filter, &self.cursor, self.batch_size)
        {
            Ok(batch) => {
                if batch.len() < self.batch_size {
                    self.exhausted = true;
                }
                if let Some(last) = batch.last() {
                    self.cursor = Some((last.timestamp.to_rfc3339(), last.id.to_string()));
                }
                self.buffer.extend(batch);
                self.buffer.pop_front().map(Ok)
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}
