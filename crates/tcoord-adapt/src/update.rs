use rust_decimal::Decimal;
use tcoord_models::WeightConfig;

/// Compute the next trust weight for an agent after one attributed outcome.
///
/// The step is `learning_rate * sign(pnl) * confidence / (1 + latency_days)`,
/// clamped to the configured bounds. A confident, quickly resolved call moves
/// the weight more than a hesitant or stale one; breakeven outcomes leave the
/// weight unchanged.
pub fn next_weight(
    config: &WeightConfig,
    current: Decimal,
    confidence: Decimal,
    pnl: Decimal,
    latency_days: u32,
) -> Decimal {
    let sign = match pnl.cmp(&Decimal::ZERO) {
        std::cmp::Ordering::Greater => Decimal::ONE,
        std::cmp::Ordering::Less => -Decimal::ONE,
        std::cmp::Ordering::Equal => Decimal::ZERO,
    };
    let damping = Decimal::ONE + Decimal::from(latency_days);
    let step = config.learning_rate * sign * (confidence / damping);
    (current + step).clamp(config.min_weight, config.max_weight)
}
