use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trading direction carried by an agent signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Buy,
    Sell,
    Hold,
    Abstain,
}

impl SignalDirection {
    /// Signed contribution to the weighted consensus sum.
    /// Hold and abstain carry direction zero but still count as responses.
    pub fn sign(&self) -> Decimal {
        match self {
            SignalDirection::Buy => Decimal::ONE,
            SignalDirection::Sell => -Decimal::ONE,
            SignalDirection::Hold | SignalDirection::Abstain => Decimal::ZERO,
        }
    }

    /// Only buy/sell can become an executed trade.
    pub fn is_actionable(&self) -> bool {
        matches!(self, SignalDirection::Buy | SignalDirection::Sell)
    }

    /// Storage form used in ledger columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Buy => "buy",
            SignalDirection::Sell => "sell",
            SignalDirection::Hold => "hold",
            SignalDirection::Abstain => "abstain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(SignalDirection::Buy),
            "sell" => Some(SignalDirection::Sell),
            "hold" => Some(SignalDirection::Hold),
            "abstain" => Some(SignalDirection::Abstain),
            _ => None,
        }
    }
}

/// Market regime tag attached to every signal for audit and retraining.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    TrendingBull,
    TrendingBear,
    MeanReverting,
    HighVolatility,
}

impl MarketRegime {
    /// Storage form used in ledger columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::TrendingBull => "trending_bull",
            MarketRegime::TrendingBear => "trending_bear",
            MarketRegime::MeanReverting => "mean_reverting",
            MarketRegime::HighVolatility => "high_volatility",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trending_bull" => Some(MarketRegime::TrendingBull),
            "trending_bear" => Some(MarketRegime::TrendingBear),
            "mean_reverting" => Some(MarketRegime::MeanReverting),
            "high_volatility" => Some(MarketRegime::HighVolatility),
            _ => None,
        }
    }
}

/// Request sent to an agent for one decision cycle (serialized as JSON
/// to subprocess agents).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalRequest {
    pub request_id: Uuid,
    pub cycle_id: Uuid,
    pub asset: String,
    pub market_regime: MarketRegime,
}

/// A single agent's trading opinion for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSignal {
    /// Signal family tag, e.g. "technical", "sentiment".
    pub signal_type: String,
    pub direction: SignalDirection,
    /// 0.0 to 1.0 confidence in this opinion.
    pub confidence: Decimal,
    pub reasoning: String,
    /// Structured domain-specific payload (indicator values, scores).
    pub signal_value: serde_json::Value,
    /// Ordered identifiers of the data sources consulted.
    pub data_sources: Vec<String>,
    pub market_regime: MarketRegime,
}

impl AgentSignal {
    /// Check the [0, 1] confidence bound. The ledger refuses records
    /// that fail this.
    pub fn confidence_in_bounds(&self) -> bool {
        self.confidence >= Decimal::ZERO && self.confidence <= Decimal::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn direction_signs() {
        assert_eq!(SignalDirection::Buy.sign(), dec!(1));
        assert_eq!(SignalDirection::Sell.sign(), dec!(-1));
        assert_eq!(SignalDirection::Hold.sign(), dec!(0));
        assert_eq!(SignalDirection::Abstain.sign(), dec!(0));
    }

    #[test]
    fn direction_serialization() {
        assert_eq!(
            serde_json::to_string(&SignalDirection::Buy).unwrap(),
            "\"buy\""
        );
        assert_eq!(
            serde_json::to_string(&SignalDirection::Abstain).unwrap(),
            "\"abstain\""
        );
    }

    #[test]
    fn regime_serialization() {
        assert_eq!(
            serde_json::to_string(&MarketRegime::TrendingBull).unwrap(),
            "\"trending_bull\""
        );
        assert_eq!(
            serde_json::to_string(&MarketRegime::HighVolatility).unwrap(),
            "\"high_volatility\""
        );
    }

    #[test]
    fn roundtrip_agent_signal() {
        let signal = AgentSignal {
            signal_type: "technical".to_string(),
            direction: SignalDirection::Buy,
            confidence: dec!(0.85),
            reasoning: "RSI-14 at 28, oversold near SMA-20 support".to_string(),
            signal_value: serde_json::json!({"rsi_14": 28.0, "sma_20": 152.3}),
            data_sources: vec!["rsi_14".to_string(), "sma_20".to_string()],
            market_regime: MarketRegime::MeanReverting,
        };

        let json = serde_json::to_string(&signal).unwrap();
        let parsed: AgentSignal = serde_json::from_str(&json).unwrap();
        assert_eq!(signal, parsed);
    }

    #[test]
    fn confidence_bounds() {
        let mut signal = AgentSignal {
            signal_type: "sentiment".to_string(),
            direction: SignalDirection::Hold,
            confidence: dec!(0.5),
            reasoning: "mixed coverage".to_string(),
            signal_value: serde_json::Value::Null,
            data_sources: vec![],
            market_regime: MarketRegime::TrendingBear,
        };
        assert!(signal.confidence_in_bounds());

        signal.confidence = dec!(1.2);
        assert!(!signal.confidence_in_bounds());

        signal.confidence = dec!(-0.1);
        assert!(!signal.confidence_in_bounds());
    }
}
