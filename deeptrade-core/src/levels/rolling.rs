//! Short-window support/resistance: the extremes of the most recent bars.

use crate::domain::{PriceBar, RollingLevels};

/// Support = lowest low and resistance = highest high over the last `window`
/// bars. Both are `None` when fewer than `window` bars exist.
pub fn rolling_levels(bars: &[PriceBar], window: usize) -> RollingLevels {
    if window == 0 || bars.len() < window {
        return RollingLevels::default();
    }
    let recent = &bars[bars.len() - window..];
    let support = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let resistance = recent
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);

    RollingLevels {
        support: support.is_finite().then_some(support),
        resistance: resistance.is_finite().then_some(resistance),
    }
}
