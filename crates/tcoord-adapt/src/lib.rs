//! Weight adaptation daemon: consumes realized outcome events, attributes
//! them to decision records, and nudges agent trust weights.

pub mod config;
pub mod daemon;
pub mod update;

pub use config::AdaptConfig;
pub use daemon::AdaptDaemon;
pub use update::next_weight;
