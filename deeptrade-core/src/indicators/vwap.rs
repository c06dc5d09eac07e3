//! Volume-Weighted Average Price, cumulative from the first bar.
//!
//! VWAP[t] = sum(close[0..=t] * volume[0..=t]) / sum(volume[0..=t])
//!
//! Undefined (NaN) while cumulative volume is zero. A NaN close or volume
//! taints every later value.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        let mut price_volume = 0.0;
        let mut volume = 0.0;

        for (i, bar) in bars.iter().enumerate() {
            if bar.close.is_nan() || bar.volume.is_nan() {
                return result;
            }
            price_volume += bar.close * bar.volume;
            volume += bar.volume;
            if volume > 0.0 {
                result[i] = price_volume / volume;
            }
        }

        result
    }
}
