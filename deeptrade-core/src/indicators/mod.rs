//! Indicator engine and concrete indicators.
//!
//! Indicators are pure functions: bar history in, one numeric series of the
//! same length out. Warm-up rows are `f64::NAN`. Multi-output indicators
//! (Bollinger, Fibonacci) are exposed as separate instances per band, keeping
//! the single-series `Indicator` trait unchanged.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod fibonacci;
pub mod macd;
pub mod rolling;
pub mod sma;
pub mod vwap;

pub use atr::{AtrBaseline, RangeAtr};
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::{ema_of_series, Ema};
pub use engine::{IndicatorConfig, IndicatorEngine};
pub use fibonacci::{retracement_column, Fibonacci, FibonacciBand, FIB_RATIOS};
pub use macd::Macd;
pub use sma::Sma;
pub use vwap::Vwap;

use crate::domain::PriceBar;

/// Column names written by [`IndicatorEngine::annotate`].
pub mod columns {
    pub const SMA: &str = "sma";
    pub const MACD: &str = "macd";
    pub const ATR: &str = "atr";
    pub const ATR_BASELINE: &str = "atr_baseline";
    pub const VWAP: &str = "vwap";
    pub const BOLLINGER_UPPER: &str = "bollinger_upper";
    pub const BOLLINGER_LOWER: &str = "bollinger_lower";
    pub const EMA_FAST: &str = "ema_fast";
    pub const EMA_SLOW: &str = "ema_slow";
    pub const FIB_HIGH: &str = "fib_high";
    pub const FIB_LOW: &str = "fib_low";
}

/// Trait for indicators.
///
/// # Look-ahead guard
/// No value at bar t may depend on bar t+1 or later. Every indicator must
/// produce identical values on a truncated prefix of the series.
pub trait Indicator: Send + Sync {
    /// Human-readable name including parameters (e.g., "sma_10", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading bars that are undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

pub(crate) fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
