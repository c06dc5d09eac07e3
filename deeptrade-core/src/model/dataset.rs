//! Labelled samples: construction, class balancing, train/test split.

use super::features::FeatureVector;
use crate::domain::Series;
use crate::indicators::columns;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One labelled bar. `up` is true when the next close is strictly higher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub features: Vec<f64>,
    pub up: bool,
}

/// Whether every indicator column is defined at `index`. `atr_baseline` only
/// feeds the volatility filter and does not gate training rows.
pub fn indicators_defined(series: &Series, index: usize) -> bool {
    series
        .column_names()
        .filter(|name| *name != columns::ATR_BASELINE)
        .all(|name| series.value(name, index).is_some())
}

/// Build a sample for every bar with all indicators defined and a defined
/// next close. The final bar has no successor and is never labelled.
pub fn labelled_samples(series: &Series) -> Vec<Sample> {
    let bars = series.bars();
    let mut samples = Vec::new();
    for i in 0..bars.len().saturating_sub(1) {
        let (close, next) = (bars[i].close, bars[i + 1].close);
        if close.is_nan() || next.is_nan() || !indicators_defined(series, i) {
            continue;
        }
        if let Some(fv) = FeatureVector::at(series, i) {
            samples.push(Sample {
                features: fv.values().to_vec(),
                up: next > close,
            });
        }
    }
    samples
}

/// Down-sample the majority class to the minority count, then shuffle.
/// Returns an empty set when either class is absent.
pub fn balance<R: Rng>(samples: Vec<Sample>, rng: &mut R) -> Vec<Sample> {
    let (mut up, mut down): (Vec<Sample>, Vec<Sample>) = samples.into_iter().partition(|s| s.up);
    let keep = up.len().min(down.len());

    up.shuffle(rng);
    down.shuffle(rng);
    up.truncate(keep);
    down.truncate(keep);

    let mut balanced = up;
    balanced.append(&mut down);
    balanced.shuffle(rng);
    balanced
}

#[derive(Debug, Clone, Default)]
pub struct Split {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

/// Shuffled split with `ceil(n * test_ratio)` test rows, leaving at least one
/// training row.
pub fn train_test_split<R: Rng>(mut samples: Vec<Sample>, test_ratio: f64, rng: &mut R) -> Split {
    if samples.is_empty() {
        return Split::default();
    }
    samples.shuffle(rng);
    let n = samples.len();
    let test_n = ((n as f64 * test_ratio.clamp(0.0, 1.0)).ceil() as usize).min(n - 1);
    let test = samples.split_off(n - test_n);
    Split {
        train: samples,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;
    use crate::indicators::IndicatorEngine;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample(up: bool, x: f64) -> Sample {
        Sample {
            features: vec![x],
            up,
        }
    }

    fn alternating(n: usize) -> Series {
        let closes: Vec<f64> = (0..n)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        IndicatorEngine::default()
            .annotate(Series::new(make_bars(&closes)).unwrap())
            .unwrap()
    }

    #[test]
    fn labels_compare_next_close() {
        let samples = labelled_samples(&alternating(80));
        // fib columns need 50 bars: rows 49..=78 qualify
        assert_eq!(samples.len(), 30);
        // row 49 closes at 101, row 50 at 100
        assert!(!samples[0].up);
        assert!(samples[1].up);
    }

    #[test]
    fn rows_with_undefined_fibonacci_are_dropped() {
        let series = alternating(80);
        // every model feature is defined from row 13, fib_high only from 49
        assert!(FeatureVector::at(&series, 20).is_some());
        assert_eq!(series.value(columns::FIB_HIGH, 20), None);
        assert!(!indicators_defined(&series, 20));
        assert!(indicators_defined(&series, 49));
        // atr_baseline is still warming up at 49 and does not gate the row
        assert_eq!(series.value(columns::ATR_BASELINE, 49), None);
    }

    #[test]
    fn series_shorter_than_fib_lookback_has_no_samples() {
        assert!(labelled_samples(&alternating(40)).is_empty());
    }

    #[test]
    fn balance_equalises_classes() {
        let mut samples: Vec<Sample> = (0..10).map(|i| sample(true, i as f64)).collect();
        samples.extend((0..3).map(|i| sample(false, i as f64)));
        let mut rng = StdRng::seed_from_u64(1);
        let balanced = balance(samples, &mut rng);
        assert_eq!(balanced.len(), 6);
        assert_eq!(balanced.iter().filter(|s| s.up).count(), 3);
    }

    #[test]
    fn balance_single_class_is_empty() {
        let samples: Vec<Sample> = (0..5).map(|i| sample(true, i as f64)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(balance(samples, &mut rng).is_empty());
    }

    #[test]
    fn balance_is_seed_deterministic() {
        let make = || -> Vec<Sample> {
            (0..20).map(|i| sample(i % 3 == 0, i as f64)).collect()
        };
        let a = balance(make(), &mut StdRng::seed_from_u64(9));
        let b = balance(make(), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn split_sizes() {
        let samples: Vec<Sample> = (0..10).map(|i| sample(i % 2 == 0, i as f64)).collect();
        let split = train_test_split(samples, 0.2, &mut StdRng::seed_from_u64(3));
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.len(), 2);
    }

    #[test]
    fn split_keeps_a_training_row() {
        let samples = vec![sample(true, 1.0), sample(false, 2.0)];
        let split = train_test_split(samples, 0.9, &mut StdRng::seed_from_u64(3));
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.test.len(), 1);
    }
}
