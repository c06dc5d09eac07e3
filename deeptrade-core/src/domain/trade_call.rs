//! TradeCall — the planner's output for one prediction request.

use super::level::LevelKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
    NoTrade,
    NoSignal,
}

impl Direction {
    /// True for directions that carry entry/stop/target prices.
    pub fn is_actionable(self) -> bool {
        matches!(self, Direction::Buy | Direction::Sell)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Buy => "Buy",
            Direction::Sell => "Sell",
            Direction::Hold => "Hold",
            Direction::NoTrade => "No Trade",
            Direction::NoSignal => "No Signal",
        };
        f.write_str(s)
    }
}

/// Why a call is not actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallReason {
    /// Empty series or no usable close price.
    NoData,
    /// Too few bars to train the model.
    InsufficientData,
    /// ATR exceeded the configured multiple of its baseline.
    VolatilityFilter,
    /// Model confidence below the configured minimum.
    LowConfidence,
}

/// A support or resistance value that sat on the wrong side of the current
/// price and was moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelCorrection {
    pub kind: LevelKind,
    pub original: f64,
    pub corrected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeCall {
    pub direction: Direction,
    pub entry: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub confidence: Option<f64>,
    pub reason: Option<CallReason>,
    pub corrections: Vec<LevelCorrection>,
}

impl TradeCall {
    /// Inconclusive call with no prices.
    pub fn inconclusive(direction: Direction, reason: CallReason) -> Self {
        Self {
            direction,
            entry: None,
            stop_loss: None,
            take_profit: None,
            confidence: None,
            reason: Some(reason),
            corrections: Vec::new(),
        }
    }

    pub fn no_data() -> Self {
        Self::inconclusive(Direction::NoSignal, CallReason::NoData)
    }

    /// Reward-to-risk ratio, when all three prices are present and risk is
    /// non-zero.
    pub fn reward_risk(&self) -> Option<f64> {
        let (entry, sl, tp) = (self.entry?, self.stop_loss?, self.take_profit?);
        let risk = (entry - sl).abs();
        if risk == 0.0 {
            return None;
        }
        Some((tp - entry).abs() / risk)
    }
}
