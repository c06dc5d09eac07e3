//! Yahoo Finance chart source.
//!
//! Fetches intraday or daily OHLCV bars from the v8 chart API with retries,
//! exponential backoff and a shared circuit breaker. Yahoo has no 4h
//! interval, so 4h bars are aggregated from 1h bars.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{normalize, DataError, DataSource, Interval};
use crate::domain::PriceBar;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// Yahoo's own interval code and how many of its bars form one of ours.
fn yahoo_interval(interval: Interval) -> (&'static str, usize) {
    match interval {
        Interval::OneMinute => ("1m", 1),
        Interval::FiveMinutes => ("5m", 1),
        Interval::FifteenMinutes => ("15m", 1),
        Interval::OneHour => ("60m", 1),
        Interval::FourHours => ("60m", 4),
        Interval::OneDay => ("1d", 1),
    }
}

/// How far back to ask for `limit` bars. Padded 3x for closed sessions and
/// clamped to Yahoo's per-interval history limits.
fn lookback(interval: Interval, limit: usize) -> chrono::Duration {
    let max_days = match interval {
        Interval::OneMinute => 7,
        Interval::FiveMinutes | Interval::FifteenMinutes => 59,
        Interval::OneHour | Interval::FourHours => 729,
        Interval::OneDay => 365 * 30,
    };
    let bars = i32::try_from(limit.max(1)).unwrap_or(i32::MAX).saturating_mul(3);
    let wanted = interval.duration() * bars;
    wanted.min(chrono::Duration::days(max_days))
}

/// Merge consecutive groups of bars sharing a `bucket`-aligned start time.
fn aggregate(bars: Vec<PriceBar>, bucket: chrono::Duration) -> Vec<PriceBar> {
    let secs = bucket.num_seconds().max(1);
    let mut out: Vec<PriceBar> = Vec::new();
    for bar in bars {
        let start = bar.time.timestamp().div_euclid(secs) * secs;
        let Some(time) = DateTime::<Utc>::from_timestamp(start, 0) else {
            continue;
        };
        match out.last_mut() {
            Some(agg) if agg.time == time => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => out.push(PriceBar { time, ..bar }),
        }
    }
    out
}

pub struct YahooSource {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooSource {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    fn chart_url(symbol: &str, interval: Interval, limit: usize, end: DateTime<Utc>) -> String {
        let start_ts = (end - lookback(interval, limit)).timestamp();
        let end_ts = end.timestamp();
        let (code, _) = yahoo_interval(interval);
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval={code}"
        )
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;
        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::ResponseFormatChanged("no timestamps".into()))?;
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let time = DateTime::<Utc>::from_timestamp(ts, 0).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
            })?;

            let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
            let (open, high, low, close, volume) = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
                field(&quote.volume),
            );

            // Closed sessions come back as all-null rows.
            if [open, high, low, close, volume].iter().all(Option::is_none) {
                continue;
            }

            bars.push(PriceBar {
                time,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(0.0),
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn fetch_with_retry(&self, url: &str, symbol: &str) -> Result<Vec<PriceBar>, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, ?delay, "retrying");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                warn!(symbol, "provider returned 403, circuit breaker tripped");
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            })?;
            let bars = Self::parse_response(symbol, chart)?;
            self.circuit_breaker.record_success();
            return Ok(bars);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        asset: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<PriceBar>, DataError> {
        let url = Self::chart_url(asset, interval, limit, Utc::now());
        let mut bars = normalize(self.fetch_with_retry(&url, asset)?, usize::MAX);
        if yahoo_interval(interval).1 > 1 {
            bars = aggregate(bars, interval.duration());
        }
        debug!(asset, %interval, bars = bars.len(), "fetched from Yahoo");
        Ok(normalize(bars, limit))
    }
}
