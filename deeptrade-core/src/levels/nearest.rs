//! Nearest-level lookup relative to a price.

use crate::domain::LevelKind;

/// Default ratio for the synthetic resistance placed above price when no
/// level exists.
pub const DEFAULT_LEVEL_EPSILON: f64 = 0.005;

/// Nearest level on the requested side of `price`.
///
/// - Support: the largest level strictly below `price`; falls back to `price`.
/// - Resistance: the smallest level strictly above `price`; falls back to
///   `price * (1 + epsilon)`, so downstream stop/target ranges are never zero.
///
/// `None`, an empty slice, and slices holding only non-finite values are all
/// "no level found". Input order does not matter.
pub fn nearest_level(price: f64, levels: Option<&[f64]>, kind: LevelKind, epsilon: f64) -> f64 {
    let candidates = levels.unwrap_or(&[]).iter().copied().filter(|l| l.is_finite());

    match kind {
        LevelKind::Support => candidates
            .filter(|&l| l < price)
            .fold(None, |best: Option<f64>, l| Some(best.map_or(l, |b| b.max(l))))
            .unwrap_or(price),
        LevelKind::Resistance => candidates
            .filter(|&l| l > price)
            .fold(None, |best: Option<f64>, l| Some(best.map_or(l, |b| b.min(l))))
            .unwrap_or(price * (1.0 + epsilon)),
    }
}
