//! Feature extraction from an annotated series.

use crate::domain::Series;
use crate::indicators::columns;
use serde::{Deserialize, Serialize};

/// Model inputs, in column order of the feature matrix.
pub const FEATURE_NAMES: [&str; 8] = [
    columns::SMA,
    columns::MACD,
    columns::ATR,
    columns::VWAP,
    columns::BOLLINGER_UPPER,
    columns::BOLLINGER_LOWER,
    columns::EMA_FAST,
    columns::EMA_SLOW,
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Feature values for one bar, ordered as [`FEATURE_NAMES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Features at `index` when every one of them is defined.
    pub fn at(series: &Series, index: usize) -> Option<Self> {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            *slot = series.value(name, index)?;
        }
        Some(Self { values })
    }

    /// Features at `index` with absent or undefined entries replaced by 0.
    /// Returns the names that were substituted.
    pub fn at_or_zero(series: &Series, index: usize) -> (Self, Vec<&'static str>) {
        let mut values = [0.0; FEATURE_COUNT];
        let mut substituted = Vec::new();
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            match series.value(name, index) {
                Some(v) => *slot = v,
                None => substituted.push(name),
            }
        }
        (Self { values }, substituted)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }
}
