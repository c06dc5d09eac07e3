//! Level detection: rolling-window extremes, strict local extrema,
//! nearest-level lookup and Fibonacci entry prices.

pub mod extrema;
pub mod fibonacci;
pub mod nearest;
pub mod rolling;

pub use extrema::{find_extrema, local_extrema_levels, Extremum};
pub use fibonacci::{fibonacci_prices, nearest_fibonacci};
pub use nearest::{nearest_level, DEFAULT_LEVEL_EPSILON};
pub use rolling::rolling_levels;

use serde::{Deserialize, Serialize};

/// Windows for the two level detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub rolling_window: usize,
    pub extrema_window: usize,
    /// Ratio for the synthetic resistance used when none is found.
    pub epsilon: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            rolling_window: 20,
            extrema_window: 20,
            epsilon: DEFAULT_LEVEL_EPSILON,
        }
    }
}
