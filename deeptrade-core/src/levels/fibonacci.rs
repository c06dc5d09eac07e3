//! Fibonacci entry prices between the rolling support and resistance.

use crate::domain::RollingLevels;
use crate::indicators::FIB_RATIOS;

/// Retracement prices `support + (resistance - support) * r`, one per ratio
/// in [`FIB_RATIOS`].
pub fn fibonacci_prices(support: f64, resistance: f64) -> [f64; FIB_RATIOS.len()] {
    let range = resistance - support;
    FIB_RATIOS.map(|r| support + range * r)
}

/// Fibonacci price closest to `price`. `None` when either rolling level is
/// missing or `price` is not finite.
pub fn nearest_fibonacci(price: f64, levels: &RollingLevels) -> Option<f64> {
    let (support, resistance) = (levels.support?, levels.resistance?);
    if !price.is_finite() {
        return None;
    }
    fibonacci_prices(support, resistance)
        .into_iter()
        .min_by(|a, b| (a - price).abs().total_cmp(&(b - price).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{assert_approx, DEFAULT_EPSILON};

    fn range(support: f64, resistance: f64) -> RollingLevels {
        RollingLevels {
            support: Some(support),
            resistance: Some(resistance),
        }
    }

    #[test]
    fn prices_span_support_to_resistance() {
        let prices = fibonacci_prices(100.0, 200.0);
        let expected = [123.6, 138.2, 150.0, 161.8, 178.6];
        for (p, e) in prices.iter().zip(expected) {
            assert_approx(*p, e, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn picks_closest_price() {
        let levels = range(100.0, 200.0);
        assert_approx(nearest_fibonacci(140.0, &levels).unwrap(), 138.2, DEFAULT_EPSILON);
        assert_approx(nearest_fibonacci(170.0, &levels).unwrap(), 161.8, DEFAULT_EPSILON);
        // outside the range the nearest end wins
        assert_approx(nearest_fibonacci(250.0, &levels).unwrap(), 178.6, DEFAULT_EPSILON);
        assert_approx(nearest_fibonacci(50.0, &levels).unwrap(), 123.6, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_range_collapses_to_the_level() {
        assert_eq!(nearest_fibonacci(99.0, &range(100.0, 100.0)), Some(100.0));
    }

    #[test]
    fn missing_level_or_price_has_no_entry() {
        let half = RollingLevels {
            support: Some(100.0),
            resistance: None,
        };
        assert_eq!(nearest_fibonacci(120.0, &half), None);
        assert_eq!(nearest_fibonacci(120.0, &RollingLevels::default()), None);
        assert_eq!(nearest_fibonacci(f64::NAN, &range(100.0, 200.0)), None);
    }
}
