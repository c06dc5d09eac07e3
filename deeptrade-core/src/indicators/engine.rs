//! Indicator engine: computes every configured indicator once and writes the
//! results into the series as named columns.

use super::columns;
use super::{
    retracement_column, AtrBaseline, Bollinger, Ema, Fibonacci, Indicator, Macd, RangeAtr, Sma,
    Vwap, FIB_RATIOS,
};
use crate::domain::{Series, SeriesError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Window and span parameters for the indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_period: usize,
    pub sma_min_periods: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub atr_period: usize,
    pub atr_baseline_window: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub fib_lookback: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_period: 10,
            sma_min_periods: 1,
            macd_fast: 12,
            macd_slow: 26,
            atr_period: 14,
            atr_baseline_window: 50,
            bollinger_period: 10,
            bollinger_multiplier: 2.0,
            ema_fast: 9,
            ema_slow: 21,
            fib_lookback: 50,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// The configured indicators paired with the column each one fills.
    pub fn indicators(&self) -> Vec<(String, Box<dyn Indicator>)> {
        let c = &self.config;
        let sma = Sma::new(c.sma_period).with_min_periods(c.sma_min_periods);
        let mut set: Vec<(String, Box<dyn Indicator>)> = vec![
            (columns::SMA.into(), Box::new(sma.clone())),
            (
                columns::MACD.into(),
                Box::new(Macd::new(c.macd_fast, c.macd_slow)),
            ),
            (columns::ATR.into(), Box::new(RangeAtr::new(c.atr_period))),
            (
                columns::ATR_BASELINE.into(),
                Box::new(AtrBaseline::new(c.atr_period, c.atr_baseline_window)),
            ),
            (columns::VWAP.into(), Box::new(Vwap::new())),
            (
                columns::BOLLINGER_UPPER.into(),
                Box::new(
                    Bollinger::upper(c.bollinger_period, c.bollinger_multiplier)
                        .centred_on(sma.clone()),
                ),
            ),
            (
                columns::BOLLINGER_LOWER.into(),
                Box::new(
                    Bollinger::lower(c.bollinger_period, c.bollinger_multiplier)
                        .centred_on(sma),
                ),
            ),
            (columns::EMA_FAST.into(), Box::new(Ema::new(c.ema_fast))),
            (columns::EMA_SLOW.into(), Box::new(Ema::new(c.ema_slow))),
            (
                columns::FIB_HIGH.into(),
                Box::new(Fibonacci::high(c.fib_lookback)),
            ),
            (
                columns::FIB_LOW.into(),
                Box::new(Fibonacci::low(c.fib_lookback)),
            ),
        ];
        for ratio in FIB_RATIOS {
            set.push((
                retracement_column(ratio),
                Box::new(Fibonacci::retracement(c.fib_lookback, ratio)),
            ));
        }
        set
    }

    /// Maximum lookback across the indicator set.
    pub fn warmup(&self) -> usize {
        self.indicators()
            .iter()
            .map(|(_, ind)| ind.lookback())
            .max()
            .unwrap_or(0)
    }

    /// Annotate a series with every indicator column.
    ///
    /// An empty series is returned unchanged.
    pub fn annotate(&self, mut series: Series) -> Result<Series, SeriesError> {
        if series.is_empty() {
            return Ok(series);
        }
        for (column, indicator) in self.indicators() {
            let values = indicator.compute(series.bars());
            debug!(
                column = column.as_str(),
                indicator = indicator.name(),
                bars = series.len(),
                "computed indicator"
            );
            series.insert_column(column, values)?;
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn annotate_empty_is_unchanged() {
        let out = IndicatorEngine::default().annotate(Series::empty()).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.column_names().count(), 0);
    }

    #[test]
    fn annotate_writes_every_column_aligned() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = Series::new(make_bars(&closes)).unwrap();
        let out = IndicatorEngine::default().annotate(series).unwrap();

        let expected = [
            "sma",
            "macd",
            "atr",
            "atr_baseline",
            "vwap",
            "bollinger_upper",
            "bollinger_lower",
            "ema_fast",
            "ema_slow",
            "fib_high",
            "fib_low",
            "fib_0.236",
            "fib_0.382",
            "fib_0.5",
            "fib_0.618",
            "fib_0.786",
        ];
        for name in expected {
            let col = out.column(name).unwrap_or_else(|| panic!("missing {name}"));
            assert_eq!(col.len(), 30, "column {name}");
        }
    }

    #[test]
    fn short_series_leaves_long_windows_undefined() {
        let series = Series::new(make_bars(&[100.0, 101.0, 102.0])).unwrap();
        let out = IndicatorEngine::default().annotate(series).unwrap();
        assert_eq!(out.latest_value(columns::ATR), None);
        assert_eq!(out.latest_value(columns::FIB_HIGH), None);
        assert_eq!(out.latest_value(columns::BOLLINGER_UPPER), None);
        assert!(out.latest_value(columns::SMA).is_some());
        assert!(out.latest_value(columns::EMA_SLOW).is_some());
    }

    #[test]
    fn flat_series_bands_collapse_to_sma() {
        let series = Series::new(make_bars(&[50.0; 60])).unwrap();
        let out = IndicatorEngine::default().annotate(series).unwrap();
        for i in 9..60 {
            let sma = out.value(columns::SMA, i).unwrap();
            assert_approx(out.value(columns::BOLLINGER_UPPER, i).unwrap(), sma, DEFAULT_EPSILON);
            assert_approx(out.value(columns::BOLLINGER_LOWER, i).unwrap(), sma, DEFAULT_EPSILON);
            assert_approx(out.value(columns::VWAP, i).unwrap(), 50.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn bands_centre_on_sma_when_windows_differ() {
        let config = IndicatorConfig {
            sma_period: 20,
            bollinger_period: 10,
            ..IndicatorConfig::default()
        };
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.4).sin() * 10.0).collect();
        let out = IndicatorEngine::new(config)
            .annotate(Series::new(make_bars(&closes)).unwrap())
            .unwrap();
        for i in 9..40 {
            let upper = out.value(columns::BOLLINGER_UPPER, i).unwrap();
            let lower = out.value(columns::BOLLINGER_LOWER, i).unwrap();
            let sma = out.value(columns::SMA, i).unwrap();
            assert_approx((upper + lower) / 2.0, sma, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn warmup_is_max_lookback() {
        // atr baseline: 13 + 50 - 1
        assert_eq!(IndicatorEngine::default().warmup(), 62);
    }
}
