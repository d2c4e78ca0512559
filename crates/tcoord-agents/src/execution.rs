use async_trait::async_trait;
use rust_decimal::Decimal;
use tcoord_models::SignalDirection;
use tracing::info;
use uuid::Uuid;

/// Terminal state of one order attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Filled { order_id: String },
    /// The venue refused the order (insufficient funds, unknown symbol).
    Rejected { reason: String },
    /// Transport or venue failure; the order may or may not have reached it.
    Failed { reason: String },
}

/// Order submission seam. Implementations must be side-effect free on
/// `Rejected` so the caller can trust the disposition it records.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    async fn submit(
        &self,
        asset: &str,
        direction: SignalDirection,
        position_size: Decimal,
    ) -> ExecutionResult;
}

/// Fill-everything execution for paper trading. Every submitted order
/// fills immediately under a synthetic order id.
pub struct PaperExecution;

#[async_trait]
impl ExecutionService for PaperExecution {
    async fn submit(
        &self,
        asset: &str,
        direction: SignalDirection,
        position_size: Decimal,
    ) -> ExecutionResult {
        let order_id = format!("paper-{}", Uuid::new_v4());
        info!(
            asset = %asset,
            direction = %direction.as_str(),
            position_size = %position_size,
            order_id = %order_id,
            "Paper order filled"
        );
        ExecutionResult::Filled { order_id }
    }
}
