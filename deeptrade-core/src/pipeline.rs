//! End-to-end analysis: annotate, detect levels, train, plan, explain.

use crate::config::PipelineConfig;
use crate::domain::{
    CallReason, Direction, LevelSet, RollingLevels, Series, SeriesError, TradeCall,
};
use crate::explain::{explain, Explanation};
use crate::fingerprint::ModelFingerprint;
use crate::indicators::IndicatorEngine;
use crate::levels::{local_extrema_levels, nearest_fibonacci, rolling_levels};
use crate::model::{ModelError, Prediction, TrainedModel};
use crate::planner::{PlanLevels, TradePlanner};
use serde::Serialize;
use tracing::{debug, info};

/// What the model was and what it said about the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub fingerprint: ModelFingerprint,
    pub holdout_accuracy: Option<f64>,
    pub prediction: Option<Prediction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub series: Series,
    pub rolling: RollingLevels,
    pub extrema: LevelSet,
    /// Fibonacci price between the rolling levels nearest the latest close.
    pub fib_entry: Option<f64>,
    pub model_summary: Option<ModelSummary>,
    pub call: TradeCall,
    pub explanation: Vec<Explanation>,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    engine: IndicatorEngine,
    planner: TradePlanner,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            engine: IndicatorEngine::new(config.indicators.clone()),
            planner: TradePlanner::new(config.planner.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Indicator columns only.
    pub fn annotate(&self, series: Series) -> Result<Series, SeriesError> {
        self.engine.annotate(series)
    }

    /// Rolling pair and local-extrema candidates for an annotated series.
    pub fn levels(&self, series: &Series) -> (RollingLevels, LevelSet) {
        let lc = &self.config.levels;
        (
            rolling_levels(series.bars(), lc.rolling_window),
            local_extrema_levels(series.bars(), lc.extrema_window),
        )
    }

    /// Run the whole flow. Only structural series defects are errors; an
    /// empty or untrainable series yields an inconclusive call.
    pub fn analyze(&self, series: Series) -> Result<Analysis, SeriesError> {
        let series = self.annotate(series)?;
        let (rolling, extrema) = self.levels(&series);
        debug!(
            bars = series.len(),
            support = ?rolling.support,
            resistance = ?rolling.resistance,
            extrema = extrema.support.len() + extrema.resistance.len(),
            "levels detected"
        );

        let Some(price) = series.latest_close() else {
            return Ok(Analysis {
                series,
                rolling,
                extrema,
                fib_entry: None,
                model_summary: None,
                call: TradeCall::no_data(),
                explanation: Vec::new(),
            });
        };
        let fib_entry = nearest_fibonacci(price, &rolling);

        let model = match TrainedModel::train(&series, &self.config.model) {
            Ok(m) => m,
            Err(e) => {
                info!(error = %e, "no model");
                let reason = match e {
                    ModelError::NoData => CallReason::NoData,
                    ModelError::InsufficientData(_) => CallReason::InsufficientData,
                };
                return Ok(Analysis {
                    series,
                    rolling,
                    extrema,
                    fib_entry,
                    model_summary: None,
                    call: TradeCall::inconclusive(Direction::NoSignal, reason),
                    explanation: Vec::new(),
                });
            }
        };

        let plan_levels = PlanLevels::new(rolling, extrema.clone());
        let prediction = model.predict(&series);
        let call = self.planner.plan_prediction(&series, &prediction, &plan_levels);
        let prediction = prediction.ok();
        let explanation = prediction
            .as_ref()
            .map(|p| explain(&series, p, &rolling))
            .unwrap_or_default();

        info!(
            direction = %call.direction,
            confidence = ?call.confidence,
            fib_entry = ?fib_entry,
            "analysis complete"
        );

        Ok(Analysis {
            model_summary: Some(ModelSummary {
                fingerprint: model.fingerprint().clone(),
                holdout_accuracy: model.holdout_accuracy(),
                prediction,
            }),
            series,
            rolling,
            extrema,
            fib_entry,
            call,
            explanation,
        })
    }
}
