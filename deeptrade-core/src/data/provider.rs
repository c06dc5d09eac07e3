//! Data source trait, bar interval, and structured fetch errors.
//!
//! `DataSource` abstracts over Yahoo, CSV files and synthetic bars so the
//! pipeline takes its data dependency as a parameter and tests run offline.

use crate::domain::PriceBar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("unsupported interval '{0}' (expected one of 1m, 5m, 15m, 1h, 4h, 1d)")]
    UnsupportedInterval(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Bar spacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
        }
    }

    pub fn duration(self) -> chrono::Duration {
        match self {
            Interval::OneMinute => chrono::Duration::minutes(1),
            Interval::FiveMinutes => chrono::Duration::minutes(5),
            Interval::FifteenMinutes => chrono::Duration::minutes(15),
            Interval::OneHour => chrono::Duration::hours(1),
            Interval::FourHours => chrono::Duration::hours(4),
            Interval::OneDay => chrono::Duration::days(1),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| DataError::UnsupportedInterval(s.to_string()))
    }
}

/// What to fetch when nothing else is specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub asset: String,
    pub interval: Interval,
    pub limit: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            asset: "BTC-USD".into(),
            interval: Interval::default(),
            limit: 100,
        }
    }
}

/// A source of OHLCV bars.
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Up to `limit` most recent bars for `asset`, oldest first, with
    /// strictly increasing timestamps.
    fn fetch(
        &self,
        asset: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<PriceBar>, DataError>;
}

/// Fetch, turning any failure into an empty sequence.
pub fn fetch_or_empty(
    source: &dyn DataSource,
    asset: &str,
    interval: Interval,
    limit: usize,
) -> Vec<PriceBar> {
    match source.fetch(asset, interval, limit) {
        Ok(bars) => bars,
        Err(e) => {
            warn!(
                source = source.name(),
                asset,
                %interval,
                error = %e,
                "fetch failed, using empty series"
            );
            Vec::new()
        }
    }
}

/// Sort by time, drop repeated timestamps (last one wins), keep the most
/// recent `limit` bars.
pub fn normalize(mut bars: Vec<PriceBar>, limit: usize) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.time);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.time == bar.time => *prev = bar,
            _ => out.push(bar),
        }
    }
    let skip = out.len().saturating_sub(limit);
    out.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;

    struct Failing;

    impl DataSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _: &str, _: Interval, _: usize) -> Result<Vec<PriceBar>, DataError> {
            Err(DataError::NetworkUnreachable("offline".into()))
        }
    }

    #[test]
    fn failure_becomes_empty() {
        assert!(fetch_or_empty(&Failing, "BTC-USD", Interval::OneHour, 10).is_empty());
    }

    #[test]
    fn interval_round_trips_through_str() {
        for i in Interval::ALL {
            assert_eq!(i.as_str().parse::<Interval>().unwrap(), i);
        }
        assert!(matches!("2h".parse::<Interval>(), Err(DataError::UnsupportedInterval(_))));
    }

    #[test]
    fn normalize_sorts_dedups_and_limits() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let mut dup = bars[2].clone();
        dup.close = 30.0;
        bars.push(dup);
        bars.swap(0, 3);
        let out = normalize(bars, 3);
        let closes: Vec<f64> = out.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![2.0, 30.0, 4.0]);
    }

    #[test]
    fn default_config() {
        let c = DataConfig::default();
        assert_eq!(c.asset, "BTC-USD");
        assert_eq!(c.interval, Interval::OneHour);
        assert_eq!(c.limit, 100);
    }
}
