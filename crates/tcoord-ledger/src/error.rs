use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Duplicate record id: {0}")]
    DuplicateId(Uuid),

    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Outcome already attributed for record: {0}")]
    AlreadyAttributed(Uuid),

    #[error("Weight {weight} out of bounds [{min}, {max}] for agent {agent_id}")]
    InvalidWeight {
        agent_id: String,
        weight: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid outcome: {0}")]
    InvalidOutcome(String),

    #[error("Corrupt ledger value: {0}")]
    Corrupt(String),

    #[error("Ledger not available: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
