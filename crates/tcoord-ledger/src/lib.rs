pub mod error;
pub mod store;
pub mod trading;
pub mod training;

pub use error::LedgerError;
pub use store::SqliteLedger;
pub use trading::TradingLedger;
pub use training::{RecordFilter, RecordQuery, TrainingReader};
