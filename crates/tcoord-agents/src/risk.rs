use rust_decimal::Decimal;
use tcoord_models::{ConsensusDecision, RiskConfig, SignalDirection};
use tracing::info;

/// Point-in-time exposure snapshot the gate evaluates against.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureState {
    pub portfolio_value: Decimal,
    /// Current open exposure in the asset under decision.
    pub asset_exposure: Decimal,
    /// Open exposure across all assets.
    pub total_exposure: Decimal,
}

/// Source of exposure snapshots. The gate itself holds no position state.
pub trait ExposureProvider: Send + Sync {
    fn snapshot(&self, asset: &str) -> ExposureState;
}

/// Static exposure for paper trading and tests.
pub struct FixedExposure(pub ExposureState);

impl ExposureProvider for FixedExposure {
    fn snapshot(&self, _asset: &str) -> ExposureState {
        self.0.clone()
    }
}

/// Gate verdict. A rejection always carries the reason verbatim for the
/// cycle note.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskVerdict {
    Approved { position_size: Decimal },
    Rejected { reason: String },
}

/// Final pre-trade check. Pure evaluation over the decision and an
/// exposure snapshot; every rejection reason is preserved for audit.
pub struct RiskGate {
    config: RiskConfig,
}

impl RiskGate {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Evaluate a consensus decision against the hard limits.
    ///
    /// Checks run in a fixed order and the first failure wins: tradeable
    /// direction, halted asset, confidence floor, then position and
    /// exposure caps. Sells are capped at the open exposure in the asset
    /// (no short positions).
    pub fn evaluate(&self, decision: &ConsensusDecision, exposure: &ExposureState) -> RiskVerdict {
        if !decision.direction.is_actionable() {
            return self.reject(
                decision,
                format!("direction {} is not tradeable", decision.direction.as_str()),
            );
        }

        if self.config.halted_assets.iter().any(|a| a == &decision.asset) {
            return self.reject(decision, format!("asset {} is halted", decision.asset));
        }

        if decision.confidence < self.config.min_confidence {
            return self.reject(
                decision,
                format!(
                    "confidence {} below minimum {}",
                    decision.confidence, self.config.min_confidence
                ),
            );
        }

        if exposure.portfolio_value <= Decimal::ZERO {
            return self.reject(decision, "portfolio value is not positive".to_string());
        }

        let proposed =
            exposure.portfolio_value * self.config.max_position_pct * decision.confidence;

        match decision.direction {
            SignalDirection::Buy => {
                let cap = exposure.portfolio_value * self.config.max_portfolio_exposure_pct;
                if exposure.total_exposure + proposed > cap {
                    return self.reject(
                        decision,
                        format!(
                            "exposure {} + position {} exceeds cap {}",
                            exposure.total_exposure, proposed, cap
                        ),
                    );
                }
                RiskVerdict::Approved {
                    position_size: proposed,
                }
            }
            SignalDirection::Sell => {
                if exposure.asset_exposure <= Decimal::ZERO {
                    return self.reject(
                        decision,
                        format!("no open exposure in {} to sell", decision.asset),
                    );
                }
                RiskVerdict::Approved {
                    position_size: proposed.min(exposure.asset_exposure),
                }
            }
            SignalDirection::Hold | SignalDirection::Abstain => unreachable!(),
        }
    }

    fn reject(&self, decision: &ConsensusDecision, reason: String) -> RiskVerdict {
        info!(
            cycle_id = %decision.cycle_id,
            asset = %decision.asset,
            reason = %reason,
            "Risk gate rejected decision"
        );
        RiskVerdict::Rejected { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn decision(direction: SignalDirection, confidence: Decimal) -> ConsensusDecision {
        ConsensusDecision {
            cycle_id: Uuid::new_v4(),
            asset: "AAPL".to_string(),
            aggregate: direction.sign() * confidence,
            direction,
            confidence,
            contributions: vec![],
        }
    }

    fn config() -> RiskConfig {
        RiskConfig {
            min_confidence: dec!(0.50),
            max_position_pct: dec!(0.02),
            max_portfolio_exposure_pct: dec!(0.10),
            halted_assets: vec![],
        }
    }

    fn exposure(portfolio: Decimal, asset: Decimal, total: Decimal) -> ExposureState {
        ExposureState {
            portfolio_value: portfolio,
            asset_exposure: asset,
            total_exposure: total,
        }
    }

    #[test]
    fn approves_confident_buy_and_sizes_position() {
        let gate = RiskGate::new(config());
        let verdict = gate.evaluate(
            &decision(SignalDirection::Buy, dec!(0.57)),
            &exposure(dec!(100000), dec!(0), dec!(0)),
        );

        // 100_000 * 0.02 * 0.57
        assert_eq!(
            verdict,
            RiskVerdict::Approved {
                position_size: dec!(1140.0000)
            }
        );
    }

    #[test]
    fn rejects_below_confidence_floor() {
        let gate = RiskGate::new(config());
        let verdict = gate.evaluate(
            &decision(SignalDirection::Buy, dec!(0.49)),
            &exposure(dec!(100000), dec!(0), dec!(0)),
        );
        assert!(matches!(verdict, RiskVerdict::Rejected { reason } if reason.contains("below minimum")));
    }

    #[test]
    fn rejects_hold_direction() {
        let gate = RiskGate::new(config());
        let verdict = gate.evaluate(
            &decision(SignalDirection::Hold, dec!(0.9)),
            &exposure(dec!(100000), dec!(0), dec!(0)),
        );
        assert!(matches!(verdict, RiskVerdict::Rejected { reason } if reason.contains("not tradeable")));
    }

    #[test]
    fn rejects_halted_asset() {
        let mut cfg = config();
        cfg.halted_assets.push("AAPL".to_string());
        let gate = RiskGate::new(cfg);
        let verdict = gate.evaluate(
            &decision(SignalDirection::Buy, dec!(0.9)),
            &exposure(dec!(100000), dec!(0), dec!(0)),
        );
        assert!(matches!(verdict, RiskVerdict::Rejected { reason } if reason.contains("halted")));
    }

    #[test]
    fn rejects_when_exposure_cap_exceeded() {
        let gate = RiskGate::new(config());
        // cap = 10_000; existing exposure 9_500 leaves no room for ~1_800.
        let verdict = gate.evaluate(
            &decision(SignalDirection::Buy, dec!(0.9)),
            &exposure(dec!(100000), dec!(0), dec!(9500)),
        );
        assert!(matches!(verdict, RiskVerdict::Rejected { reason } if reason.contains("exceeds cap")));
    }

    #[test]
    fn sell_capped_at_open_exposure() {
        let gate = RiskGate::new(config());
        let verdict = gate.evaluate(
            &decision(SignalDirection::Sell, dec!(0.9)),
            &exposure(dec!(100000), dec!(500), dec!(500)),
        );
        assert_eq!(
            verdict,
            RiskVerdict::Approved {
                position_size: dec!(500)
            }
        );
    }

    #[test]
    fn sell_without_open_exposure_rejected() {
        let gate = RiskGate::new(config());
        let verdict = gate.evaluate(
            &decision(SignalDirection::Sell, dec!(0.9)),
            &exposure(dec!(100000), dec!(0), dec!(0)),
        );
        assert!(matches!(verdict, RiskVerdict::Rejected { reason } if reason.contains("no open exposure")));
    }
}
