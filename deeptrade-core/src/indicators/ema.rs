//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA at the first defined value equals that value, so the series is
//! defined from bar 0. Lookback: 0.

use super::{closes, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        ema_of_series(&closes(bars), self.span)
    }
}

/// EMA of an arbitrary series.
///
/// Leading NaNs stay NaN and the seed moves to the first defined value. A NaN
/// after the seed taints every later value.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            if prev.is_some() {
                return result;
            }
            continue;
        }
        let ema = match prev {
            Some(p) => alpha * v + (1.0 - alpha) * p,
            None => v,
        };
        result[i] = ema;
        prev = Some(ema);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let result = Ema::new(3).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_nan_moves_seed() {
        let result = ema_of_series(&[f64::NAN, 4.0, 8.0], 3);
        assert!(result[0].is_nan());
        assert_approx(result[1], 4.0, DEFAULT_EPSILON);
        assert_approx(result[2], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_after_seed_propagates() {
        let result = ema_of_series(&[10.0, 11.0, f64::NAN, 13.0], 3);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn ema_of_series_matches_indicator() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let a = Ema::new(4).compute(&bars);
        let b = ema_of_series(&closes, 4);
        for i in 0..6 {
            assert_approx(a[i], b[i], DEFAULT_EPSILON);
        }
    }
}
