//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices. With `min_periods < period` the window
//! expands from the first bar instead of waiting for a full window.

use super::rolling::rolling_mean;
use super::{closes, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    min_periods: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            min_periods: period,
            name: format!("sma_{period}"),
        }
    }

    /// Emit a value once `min_periods` bars are available.
    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = min_periods.clamp(1, self.period);
        self
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.min_periods.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&closes(bars), self.period, self.min_periods)
    }
}
