//! Trailing-window statistics over `f64` slices.
//!
//! Window at index i covers `values[i+1-window ..= i]`, truncated at the
//! series start. A row is defined once the window holds at least
//! `min_periods` values; any NaN inside the window makes the row NaN.

fn rolling_apply(
    values: &[f64],
    window: usize,
    min_periods: usize,
    f: impl Fn(&[f64]) -> f64,
) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 {
        return result;
    }
    let min_periods = min_periods.clamp(1, window);

    for i in 0..n {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        if slice.len() < min_periods || slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(slice);
    }
    result
}

pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_apply(values, window, min_periods, |w| {
        w.iter().sum::<f64>() / w.len() as f64
    })
}

/// Sample standard deviation (n - 1 denominator). A single-value window is
/// undefined.
pub fn rolling_std(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_apply(values, window, min_periods.max(2), |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let ss: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n - 1.0)).sqrt()
    })
}

pub fn rolling_max(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_apply(values, window, min_periods, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_apply(values, window, min_periods, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}
