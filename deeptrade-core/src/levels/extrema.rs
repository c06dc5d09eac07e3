//! Long-window support/resistance from strict local extrema.
//!
//! Bar i is a support candidate when its low is strictly below every low at
//! distance 1..window-1 on both sides, and a resistance candidate when its
//! high is strictly above every high at the same distances. Only bars with at
//! least `window` neighbours on each side are scanned.
//!
//! Complexity is O(n * window); inputs are a few hundred bars.

use crate::domain::{LevelKind, LevelSet, PriceBar};
use serde::{Deserialize, Serialize};

/// A detected extremum with the bar it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub index: usize,
    pub price: f64,
    pub kind: LevelKind,
}

/// Every strict local extremum, in bar order. A bar may appear once as
/// support and once as resistance.
pub fn find_extrema(bars: &[PriceBar], window: usize) -> Vec<Extremum> {
    let n = bars.len();
    let mut found = Vec::new();
    if window == 0 || n <= 2 * window {
        return found;
    }

    for i in window..n - window {
        let low = bars[i].low;
        let high = bars[i].high;

        let is_support = (1..window).all(|j| low < bars[i - j].low && low < bars[i + j].low);
        let is_resistance =
            (1..window).all(|j| high > bars[i - j].high && high > bars[i + j].high);

        if is_support {
            found.push(Extremum {
                index: i,
                price: low,
                kind: LevelKind::Support,
            });
        }
        if is_resistance {
            found.push(Extremum {
                index: i,
                price: high,
                kind: LevelKind::Resistance,
            });
        }
    }
    found
}

/// Candidate levels from local extrema, sorted ascending and deduplicated.
pub fn local_extrema_levels(bars: &[PriceBar], window: usize) -> LevelSet {
    let mut set = LevelSet::default();
    for ext in find_extrema(bars, window) {
        match ext.kind {
            LevelKind::Support => set.support.push(ext.price),
            LevelKind::Resistance => set.resistance.push(ext.price),
        }
    }
    sort_dedup(&mut set.support);
    sort_dedup(&mut set.resistance);
    set
}

fn sort_dedup(levels: &mut Vec<f64>) {
    levels.retain(|p| p.is_finite());
    levels.sort_by(f64::total_cmp);
    levels.dedup();
}
