//! Series — ordered bars plus aligned indicator columns.
//!
//! Columns store undefined values as `f64::NAN` (warm-up rows, zero-volume
//! VWAP). The accessors surface them as `None`; `value_or` is the one place a
//! caller-chosen fallback is substituted.

use super::bar::PriceBar;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Structural defects in a series. These are bugs upstream of the pipeline,
/// not business outcomes, so they propagate as errors.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("bar {index} at {time} is not strictly after the previous bar")]
    NonIncreasingTime { index: usize, time: String },

    #[error("column '{name}' has {actual} values for {expected} bars")]
    MisalignedColumn {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Bars plus aligned columns. Only [`Series::new`] builds one from bars, so
/// time order is always checked; there is no deserialisation path.
///
/// ```compile_fail
/// let series: deeptrade_core::Series = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Series {
    bars: Vec<PriceBar>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl Series {
    /// Build a series, rejecting duplicate or out-of-order timestamps.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(SeriesError::NonIncreasingTime {
                    index: i + 1,
                    time: pair[1].time.to_rfc3339(),
                });
            }
        }
        Ok(Self {
            bars,
            columns: BTreeMap::new(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Latest close, or `None` when the series is empty or the close is NaN.
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close).filter(|c| !c.is_nan())
    }

    /// Insert a named column. Its length must equal the bar count.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        if values.len() != self.bars.len() {
            return Err(SeriesError::MisalignedColumn {
                name,
                expected: self.bars.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Full column, including NaN warm-up entries.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Column value at a bar index. `None` if the column is absent, the index
    /// is out of range, or the value is undefined.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.columns
            .get(name)
            .and_then(|v| v.get(index).copied())
            .filter(|v| !v.is_nan())
    }

    /// Value at the latest bar.
    pub fn latest_value(&self, name: &str) -> Option<f64> {
        self.len().checked_sub(1).and_then(|i| self.value(name, i))
    }

    /// Column value with an explicit fallback for absent or undefined entries.
    pub fn value_or(&self, name: &str, index: usize, fallback: f64) -> f64 {
        self.value(name, index).unwrap_or(fallback)
    }
}
