//! Signal model: standardised features into a seeded random forest that
//! classifies whether the next close will be higher.

pub mod dataset;
pub mod features;
pub mod forest;
pub mod scaler;
pub mod tree;

pub use dataset::{balance, labelled_samples, train_test_split, Sample, Split};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use forest::{ForestConfig, RandomForest};
pub use scaler::StandardScaler;
pub use tree::DecisionTree;

use crate::domain::{Direction, Series};
use crate::fingerprint::{DatasetHash, ModelFingerprint};
use crate::rng::{SeedHierarchy, Stage};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    #[error("no data to predict from")]
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub seed: u64,
    pub min_bars: usize,
    pub test_ratio: f64,
    pub forest: ForestConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            min_bars: 50,
            test_ratio: 0.2,
            forest: ForestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Buy,
    Sell,
}

impl From<Signal> for Direction {
    fn from(s: Signal) -> Self {
        match s {
            Signal::Buy => Direction::Buy,
            Signal::Sell => Direction::Sell,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Direction::from(*self))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub signal: Signal,
    /// Probability of the predicted class.
    pub confidence: f64,
    pub prob_up: f64,
    /// Features that were absent or undefined on the latest bar and fed as 0.
    pub substituted: Vec<String>,
}

/// Anything that can call the next move for the latest bar of a series.
pub trait Predictor {
    fn predict(&self, series: &Series) -> Result<Prediction, ModelError>;
}

impl Predictor for TrainedModel {
    fn predict(&self, series: &Series) -> Result<Prediction, ModelError> {
        TrainedModel::predict(self, series)
    }
}

/// A fitted scaler and forest, with the held-out rows they were not fit on.
/// The pair only comes out of [`TrainedModel::train`].
///
/// ```compile_fail
/// use deeptrade_core::model::TrainedModel;
/// let model: TrainedModel = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainedModel {
    scaler: StandardScaler,
    forest: RandomForest,
    holdout: Vec<Sample>,
    fingerprint: ModelFingerprint,
}

impl TrainedModel {
    /// Train on an indicator-annotated series.
    pub fn train(series: &Series, config: &TrainConfig) -> Result<Self, ModelError> {
        if series.len() < config.min_bars {
            return Err(ModelError::InsufficientData(format!(
                "{} bars, need at least {}",
                series.len(),
                config.min_bars
            )));
        }

        let samples = labelled_samples(series);
        let (ups, total) = (samples.iter().filter(|s| s.up).count(), samples.len());
        if ups == 0 || ups == total {
            return Err(ModelError::InsufficientData(format!(
                "{total} labelled rows with {ups} up moves; both classes are required"
            )));
        }

        let seeds = SeedHierarchy::new(config.seed);
        let balanced = balance(samples, &mut seeds.rng_for(Stage::Balance, 0));

        let matrix: Vec<Vec<f64>> = balanced.iter().map(|s| s.features.clone()).collect();
        let scaler = StandardScaler::fit(&matrix);
        let scaled: Vec<Sample> = balanced
            .into_iter()
            .map(|s| Sample {
                features: scaler.transform(&s.features),
                up: s.up,
            })
            .collect();

        let mut split_rng = seeds.rng_for(Stage::Split, 0);
        let split = train_test_split(scaled, config.test_ratio, &mut split_rng);
        let x: Vec<Vec<f64>> = split.train.iter().map(|s| s.features.clone()).collect();
        let y: Vec<bool> = split.train.iter().map(|s| s.up).collect();
        let forest = RandomForest::fit(&x, &y, &config.forest, &seeds);

        let fingerprint = ModelFingerprint {
            dataset_hash: DatasetHash::of_bars(series.bars()),
            seed: config.seed,
            n_trees: forest.n_trees(),
            bar_count: series.len(),
            train_rows: split.train.len(),
            test_rows: split.test.len(),
        };
        let model = Self {
            scaler,
            forest,
            holdout: split.test,
            fingerprint,
        };

        info!(
            dataset = %model.fingerprint.dataset_hash,
            seed = config.seed,
            train_rows = model.fingerprint.train_rows,
            test_rows = model.fingerprint.test_rows,
            holdout_accuracy = ?model.holdout_accuracy(),
            "model trained"
        );
        Ok(model)
    }

    /// Classify the latest bar of `series`.
    pub fn predict(&self, series: &Series) -> Result<Prediction, ModelError> {
        if series.latest_close().is_none() {
            return Err(ModelError::NoData);
        }
        let last = series.len() - 1;
        let (fv, substituted) = FeatureVector::at_or_zero(series, last);
        for name in &substituted {
            warn!(feature = *name, "MissingFeature: substituting 0");
        }

        let prob_up = self.prob_up(fv.values());
        let signal = if prob_up > 0.5 { Signal::Buy } else { Signal::Sell };
        let confidence = prob_up.max(1.0 - prob_up);
        debug!(%signal, confidence, "prediction");

        Ok(Prediction {
            signal,
            confidence,
            prob_up,
            substituted: substituted.into_iter().map(String::from).collect(),
        })
    }

    fn prob_up(&self, raw: &[f64]) -> f64 {
        self.forest.prob_up(&self.scaler.transform(raw))
    }

    /// Held-out rows, already scaled.
    pub fn holdout(&self) -> &[Sample] {
        &self.holdout
    }

    /// Fraction of held-out rows classified correctly; `None` with no holdout.
    pub fn holdout_accuracy(&self) -> Option<f64> {
        if self.holdout.is_empty() {
            return None;
        }
        let correct = self
            .holdout
            .iter()
            .filter(|s| (self.forest.prob_up(&s.features) > 0.5) == s.up)
            .count();
        Some(correct as f64 / self.holdout.len() as f64)
    }

    pub fn fingerprint(&self) -> &ModelFingerprint {
        &self.fingerprint
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

/// Train on `series` with `config`.
pub fn train(series: &Series, config: &TrainConfig) -> Result<TrainedModel, ModelError> {
    TrainedModel::train(series, config)
}

/// Predict the next move for the latest bar of `series`.
pub fn predict(series: &Series, model: &TrainedModel) -> Result<Prediction, ModelError> {
    model.predict(series)
}
