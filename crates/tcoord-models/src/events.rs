use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signal::MarketRegime;

/// Tick event from the external market data source. One tick triggers one
/// decision cycle for the named asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketTick {
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    #[serde(default = "default_regime")]
    pub market_regime: MarketRegime,
}

fn default_regime() -> MarketRegime {
    MarketRegime::MeanReverting
}

/// Outcome-attribution event consumed by the weight adaptation daemon.
/// Produced by the external settlement/execution side once a realized
/// result is known for a decision record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeEvent {
    pub record_id: Uuid,
    pub pnl: Decimal,
    pub latency_days: u32,
    pub trade_was_profitable: Option<bool>,
}

/// Promotion announcement from the training pipeline's evaluation workflow.
/// Delivered on a one-way channel; the trading core only logs receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterPromotion {
    pub agent_id: String,
    pub adapter_version: String,
    pub approved_at: DateTime<Utc>,
}
