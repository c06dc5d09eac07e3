//! Bollinger Bands: SMA centre +/- standard deviation multiplier.
//!
//! Two bands (separate Indicator instances):
//! - Upper: sma(close) + mult * stddev(close, period)
//! - Lower: sma(close) - mult * stddev(close, period)
//!
//! The centre is an [`Sma`] with its own window, so the bands follow the
//! `sma` column even when its window differs from the deviation window.
//! Uses sample stddev (divide by N - 1). A constant window has zero width,
//! so both bands collapse onto the centre.
//! Lookback: max(period - 1, centre lookback).

use super::rolling::rolling_std;
use super::{closes, Indicator, Sma};
use crate::domain::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    centre: Sma,
    name: String,
}

impl Bollinger {
    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Upper)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Lower)
    }

    fn build(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        let side = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            centre: Sma::new(period),
            name: format!("bollinger_{side}_{period}_{multiplier}"),
        }
    }

    /// Centre the bands on `centre` instead of a full-window SMA of `period`.
    pub fn centred_on(mut self, centre: Sma) -> Self {
        self.centre = centre;
        self
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (self.period - 1).max(self.centre.lookback())
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let centre = self.centre.compute(bars);
        let std = rolling_std(&closes(bars), self.period, self.period);
        let sign = match self.band {
            BollingerBand::Upper => 1.0,
            BollingerBand::Lower => -1.0,
        };
        centre
            .iter()
            .zip(&std)
            .map(|(m, s)| m + sign * self.multiplier * s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bands_symmetric_around_mean() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);

        assert!(upper[1].is_nan());
        // window (10,11,12): mean 11, sample std 1
        assert_approx(upper[2], 13.0, DEFAULT_EPSILON);
        assert_approx(lower[2], 9.0, DEFAULT_EPSILON);
        for i in 2..5 {
            let mid = (upper[i] + lower[i]) / 2.0;
            assert_approx(mid, bars[i].close - 1.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn constant_price_zero_width() {
        let bars = make_bars(&[100.0; 4]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);
        assert_approx(upper[3], 100.0, DEFAULT_EPSILON);
        assert_approx(lower[3], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_propagation() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        bars[2].close = f64::NAN;
        let result = Bollinger::upper(3, 2.0).compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn centre_follows_sma_with_its_own_window() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + i as f64 * 0.25 + (i as f64).sin())
            .collect();
        let bars = make_bars(&closes);
        let sma = Sma::new(20).with_min_periods(1);
        let centre = sma.compute(&bars);
        let upper = Bollinger::upper(10, 2.0).centred_on(sma.clone()).compute(&bars);
        let lower = Bollinger::lower(10, 2.0).centred_on(sma).compute(&bars);

        assert!(upper[8].is_nan());
        for i in 9..40 {
            assert_approx((upper[i] + lower[i]) / 2.0, centre[i], DEFAULT_EPSILON);
        }
        // a 10-bar mean would sit higher on a rising series
        let own_mean: f64 = closes[30..40].iter().sum::<f64>() / 10.0;
        assert!((centre[39] - own_mean).abs() > 1.0);
    }

    #[test]
    fn lookback() {
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
        assert_eq!(Bollinger::upper(10, 2.0).centred_on(Sma::new(20)).lookback(), 19);
    }
}
