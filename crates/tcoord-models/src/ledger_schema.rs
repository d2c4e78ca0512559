//! SQLite schema for the decision ledger.
//!
//! Decimal columns (confidence, weight, pnl) are stored as TEXT so values
//! round-trip exactly; timestamps are RFC3339 TEXT.

/// DDL for every ledger table. Applied on open; idempotent.
///
/// - `decision_log`: append-mostly, keyed by record id. The only legal late
///   write is the unset -> set transition of the outcome columns.
/// - `coordinator_weight_history`: append-only trust-weight time series;
///   the current weight per agent is its highest-seq row.
/// - `cycle_log`: one terminal disposition note per decision cycle.
/// - `outcome_log`: attribution ordering; appended in the same transaction
///   as each outcome write, replayed by the weight adaptation daemon.
/// - `adapt_cursor`: single-row offset of the last applied outcome_log seq.
/// - `promotion_log`: receipt audit for training-side adapter promotions.
pub const LEDGER_DDL: &str = "\
CREATE TABLE IF NOT EXISTS decision_log (
    id                    TEXT PRIMARY KEY,
    timestamp             TEXT NOT NULL,
    agent_id              TEXT NOT NULL,
    cycle_id              TEXT NOT NULL,
    asset                 TEXT NOT NULL,
    signal_type           TEXT NOT NULL,
    direction             TEXT NOT NULL,
    confidence            TEXT NOT NULL,
    reasoning             TEXT NOT NULL,
    signal_value          TEXT NOT NULL,
    data_sources          TEXT NOT NULL,
    market_regime         TEXT NOT NULL,
    contributed_to_trade  INTEGER NOT NULL DEFAULT 0,
    outcome_pnl           TEXT,
    outcome_latency_days  INTEGER,
    trade_was_profitable  INTEGER
);
CREATE INDEX IF NOT EXISTS idx_decision_timestamp ON decision_log(timestamp, id);
CREATE INDEX IF NOT EXISTS idx_decision_agent ON decision_log(agent_id);
CREATE INDEX IF NOT EXISTS idx_decision_asset ON decision_log(asset);

CREATE TABLE IF NOT EXISTS coordinator_weight_history (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    agent_id  TEXT NOT NULL,
    weight    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_weight_agent_seq ON coordinator_weight_history(agent_id, seq);

CREATE TABLE IF NOT EXISTS cycle_log (
    cycle_id    TEXT NOT NULL,
    asset       TEXT NOT NULL,
    timestamp   TEXT NOT NULL,
    disposition TEXT NOT NULL,
    detail      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cycle_log_cycle ON cycle_log(cycle_id);

CREATE TABLE IF NOT EXISTS outcome_log (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id     TEXT NOT NULL,
    attributed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS adapt_cursor (
    id       INTEGER PRIMARY KEY CHECK (id = 1),
    last_seq INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS promotion_log (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
    agent_id        TEXT NOT NULL,
    adapter_version TEXT NOT NULL,
    approved_at     TEXT NOT NULL,
    received_at     TEXT NOT NULL
);
";
