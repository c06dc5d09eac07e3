//! Average True Range proxy and its volatility baseline.
//!
//! The proxy is the rolling mean of (high - low); it ignores gaps against the
//! previous close. The baseline is a longer rolling mean of the proxy itself,
//! used by the planner's volatility filter.
//! Lookback: period - 1 (proxy), period + baseline - 2 (baseline).

use super::rolling::rolling_mean;
use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct RangeAtr {
    period: usize,
    name: String,
}

impl RangeAtr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

fn ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(PriceBar::range).collect()
}

impl Indicator for RangeAtr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&ranges(bars), self.period, self.period)
    }
}

#[derive(Debug, Clone)]
pub struct AtrBaseline {
    atr: RangeAtr,
    window: usize,
    name: String,
}

impl AtrBaseline {
    pub fn new(atr_period: usize, window: usize) -> Self {
        assert!(window >= 1, "ATR baseline window must be >= 1");
        Self {
            atr: RangeAtr::new(atr_period),
            window,
            name: format!("atr_baseline_{atr_period}_{window}"),
        }
    }
}

impl Indicator for AtrBaseline {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.atr.lookback() + self.window - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&self.atr.compute(bars), self.window, self.window)
    }
}
