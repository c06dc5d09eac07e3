//! Fibonacci retracement reference prices.
//!
//! Over a trailing lookback window:
//! - High: max(high), Low: min(low)
//! - Retracement(r): high - (high - low) * r
//!
//! Each band is a separate Indicator instance. Lookback: lookback - 1.

use super::rolling::{rolling_max, rolling_min};
use super::Indicator;
use crate::domain::PriceBar;

/// Standard retracement ratios.
pub const FIB_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FibonacciBand {
    High,
    Low,
    Retracement(f64),
}

#[derive(Debug, Clone)]
pub struct Fibonacci {
    lookback: usize,
    band: FibonacciBand,
    name: String,
}

impl Fibonacci {
    pub fn high(lookback: usize) -> Self {
        Self::build(lookback, FibonacciBand::High)
    }

    pub fn low(lookback: usize) -> Self {
        Self::build(lookback, FibonacciBand::Low)
    }

    pub fn retracement(lookback: usize, ratio: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&ratio),
            "retracement ratio must be in [0, 1]"
        );
        Self::build(lookback, FibonacciBand::Retracement(ratio))
    }

    fn build(lookback: usize, band: FibonacciBand) -> Self {
        assert!(lookback >= 1, "Fibonacci lookback must be >= 1");
        let name = match band {
            FibonacciBand::High => format!("fib_high_{lookback}"),
            FibonacciBand::Low => format!("fib_low_{lookback}"),
            FibonacciBand::Retracement(r) => format!("fib_{r}_{lookback}"),
        };
        Self {
            lookback,
            band,
            name,
        }
    }
}

/// Column name for a retracement ratio, e.g. `fib_0.618`.
pub fn retracement_column(ratio: f64) -> String {
    format!("fib_{ratio}")
}

impl Indicator for Fibonacci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lookback - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let window_high = rolling_max(&highs, self.lookback, self.lookback);

        match self.band {
            FibonacciBand::High => window_high,
            FibonacciBand::Low => rolling_min(&lows, self.lookback, self.lookback),
            FibonacciBand::Retracement(r) => {
                let window_low = rolling_min(&lows, self.lookback, self.lookback);
                window_high
                    .iter()
                    .zip(&window_low)
                    .map(|(h, l)| h - (h - l) * r)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn retracement_between_window_extremes() {
        // make_bars: highs = max(open,close)+1, lows = min(open,close)-1
        let bars = make_bars(&[100.0, 110.0, 105.0]);
        let high = Fibonacci::high(3).compute(&bars);
        let low = Fibonacci::low(3).compute(&bars);
        let half = Fibonacci::retracement(3, 0.5).compute(&bars);

        assert!(high[1].is_nan());
        assert_approx(high[2], 111.0, DEFAULT_EPSILON);
        assert_approx(low[2], 99.0, DEFAULT_EPSILON);
        assert_approx(half[2], 105.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ratio_ordering() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let bars = make_bars(&closes);
        let values: Vec<f64> = FIB_RATIOS
            .iter()
            .map(|&r| Fibonacci::retracement(5, r).compute(&bars)[9])
            .collect();
        for pair in values.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn column_names() {
        assert_eq!(retracement_column(0.618), "fib_0.618");
        assert_eq!(retracement_column(0.5), "fib_0.5");
    }

    #[test]
    #[should_panic(expected = "retracement ratio")]
    fn rejects_ratio_above_one() {
        Fibonacci::retracement(10, 1.5);
    }
}
