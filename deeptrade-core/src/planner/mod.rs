//! Trade planner: turns a model call plus support/resistance into entry,
//! stop-loss and take-profit prices.

use crate::domain::{
    CallReason, Direction, LevelCorrection, LevelKind, LevelSet, RollingLevels, Series, TradeCall,
};
use crate::indicators::columns;
use crate::levels::{nearest_level, DEFAULT_LEVEL_EPSILON};
use crate::model::{ModelError, Prediction, Predictor, Signal};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Offset applied to a support/resistance on the wrong side of price.
    pub degenerate_ratio: f64,
    /// NoTrade when atr exceeds this multiple of atr_baseline.
    pub max_atr_ratio: f64,
    /// SL/TP distance from entry when a level is missing.
    pub fallback_pct: f64,
    /// Calls below this confidence become Hold. 0 disables the check.
    pub min_confidence: f64,
    /// Synthetic resistance ratio for entry lookup.
    pub level_epsilon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            degenerate_ratio: 0.005,
            max_atr_ratio: 1.5,
            fallback_pct: 0.02,
            min_confidence: 0.0,
            level_epsilon: DEFAULT_LEVEL_EPSILON,
        }
    }
}

/// Levels handed to the planner: the short-window pair used for SL/TP and
/// the long-window candidates used for entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanLevels {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub candidates: LevelSet,
}

impl PlanLevels {
    pub fn new(rolling: RollingLevels, candidates: LevelSet) -> Self {
        Self {
            support: rolling.support,
            resistance: rolling.resistance,
            candidates,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TradePlanner {
    config: PlannerConfig,
}

impl TradePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Ask `model` for a call on the latest bar and plan it.
    pub fn plan<P: Predictor + ?Sized>(
        &self,
        series: &Series,
        model: &P,
        levels: &PlanLevels,
    ) -> TradeCall {
        if series.latest_close().is_none() {
            return TradeCall::no_data();
        }
        self.plan_prediction(series, &model.predict(series), levels)
    }

    /// Plan from a prediction already made for the latest bar of `series`.
    pub fn plan_prediction(
        &self,
        series: &Series,
        prediction: &Result<Prediction, ModelError>,
        levels: &PlanLevels,
    ) -> TradeCall {
        let Some(price) = series.latest_close() else {
            return TradeCall::no_data();
        };

        let mut corrections = Vec::new();
        let support = levels
            .support
            .map(|s| self.correct(price, s, LevelKind::Support, &mut corrections));
        let resistance = levels
            .resistance
            .map(|r| self.correct(price, r, LevelKind::Resistance, &mut corrections));

        if self.volatility_trips(series) {
            let mut call =
                TradeCall::inconclusive(Direction::NoTrade, CallReason::VolatilityFilter);
            call.corrections = corrections;
            return call;
        }

        let prediction = match prediction {
            Ok(p) => p,
            Err(e) => {
                let reason = match e {
                    ModelError::NoData => CallReason::NoData,
                    ModelError::InsufficientData(_) => CallReason::InsufficientData,
                };
                let mut call = TradeCall::inconclusive(Direction::NoSignal, reason);
                call.corrections = corrections;
                return call;
            }
        };

        if prediction.confidence < self.config.min_confidence {
            let mut call = TradeCall::inconclusive(Direction::Hold, CallReason::LowConfidence);
            call.confidence = Some(prediction.confidence);
            call.corrections = corrections;
            return call;
        }

        let eps = self.config.level_epsilon;
        let candidates = &levels.candidates;
        let entry = match prediction.signal {
            Signal::Buy => {
                let kind = LevelKind::Support;
                nearest_level(price, Some(candidates.levels(kind)), kind, eps).min(price)
            }
            Signal::Sell => {
                let kind = LevelKind::Resistance;
                nearest_level(price, Some(candidates.levels(kind)), kind, eps).max(price)
            }
        };

        let f = self.config.fallback_pct;
        let (stop_loss, take_profit) = match (prediction.signal, support, resistance) {
            (Signal::Buy, Some(s), Some(r)) => (s, r),
            (Signal::Sell, Some(s), Some(r)) => (r, s),
            (Signal::Buy, _, _) => (entry * (1.0 - f), entry * (1.0 + f)),
            (Signal::Sell, _, _) => (entry * (1.0 + f), entry * (1.0 - f)),
        };

        debug!(
            signal = %prediction.signal,
            price,
            entry,
            stop_loss,
            take_profit,
            "trade planned"
        );

        TradeCall {
            direction: prediction.signal.into(),
            entry: Some(entry),
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            confidence: Some(prediction.confidence),
            reason: None,
            corrections,
        }
    }

    fn correct(
        &self,
        price: f64,
        level: f64,
        kind: LevelKind,
        out: &mut Vec<LevelCorrection>,
    ) -> f64 {
        let r = self.config.degenerate_ratio;
        let corrected = match kind {
            LevelKind::Resistance if level <= price => price * (1.0 + r),
            LevelKind::Support if level >= price => price * (1.0 - r),
            _ => return level,
        };
        warn!(?kind, original = level, corrected, "DegenerateLevel: corrected");
        out.push(LevelCorrection {
            kind,
            original: level,
            corrected,
        });
        corrected
    }

    fn volatility_trips(&self, series: &Series) -> bool {
        match (
            series.latest_value(columns::ATR),
            series.latest_value(columns::ATR_BASELINE),
        ) {
            (Some(atr), Some(baseline)) => atr > self.config.max_atr_ratio * baseline,
            _ => false,
        }
    }
}
