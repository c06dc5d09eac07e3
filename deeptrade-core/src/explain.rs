//! Human-readable reasons attached to a prediction.

use crate::domain::{RollingLevels, Series};
use crate::indicators::columns;
use crate::model::Prediction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closes within this fraction of a level count as "near" it.
pub const NEAR_LEVEL_PCT: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Explanation {
    Confidence { value: f64 },
    BullishEmaCrossover,
    BearishEmaCrossover,
    Macd { value: f64 },
    BollingerBreakout,
    BollingerBreakdown,
    AboveVwap,
    BelowVwap,
    NearSupport { level: f64 },
    NearResistance { level: f64 },
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Explanation::Confidence { value } => {
                write!(f, "Model confidence: {:.2}%", value * 100.0)
            }
            Explanation::BullishEmaCrossover => {
                f.write_str("Bullish EMA crossover: fast EMA crossed above slow EMA")
            }
            Explanation::BearishEmaCrossover => {
                f.write_str("Bearish EMA crossover: fast EMA crossed below slow EMA")
            }
            Explanation::Macd { value } => {
                let tone = if *value > 0.0 { "Bullish" } else { "Bearish" };
                write!(f, "MACD value: {value:.4} ({tone})")
            }
            Explanation::BollingerBreakout => {
                f.write_str("Price broke above the upper Bollinger band: possible breakout")
            }
            Explanation::BollingerBreakdown => {
                f.write_str("Price fell below the lower Bollinger band: possible breakdown")
            }
            Explanation::AboveVwap => f.write_str("Price is above VWAP (bullish)"),
            Explanation::BelowVwap => f.write_str("Price is below VWAP (bearish)"),
            Explanation::NearSupport { level } => write!(f, "Price is near support ({level:.2})"),
            Explanation::NearResistance { level } => {
                write!(f, "Price is near resistance ({level:.2})")
            }
        }
    }
}

/// Reasons behind `prediction` on the latest bar. Rules whose inputs are
/// undefined are skipped.
pub fn explain(
    series: &Series,
    prediction: &Prediction,
    levels: &RollingLevels,
) -> Vec<Explanation> {
    let mut out = vec![Explanation::Confidence {
        value: prediction.confidence,
    }];
    let Some(close) = series.latest_close() else {
        return out;
    };
    let last = series.len() - 1;

    if last > 0 {
        let fast = |i| series.value(columns::EMA_FAST, i);
        let slow = |i| series.value(columns::EMA_SLOW, i);
        let pair = |i| fast(i).zip(slow(i));
        if let (Some((f1, s1)), Some((f0, s0))) = (pair(last), pair(last - 1)) {
            if f1 > s1 && f0 < s0 {
                out.push(Explanation::BullishEmaCrossover);
            } else if f1 < s1 && f0 > s0 {
                out.push(Explanation::BearishEmaCrossover);
            }
        }
    }

    if let Some(value) = series.value(columns::MACD, last) {
        out.push(Explanation::Macd { value });
    }

    let upper = series.value(columns::BOLLINGER_UPPER, last);
    let lower = series.value(columns::BOLLINGER_LOWER, last);
    if upper.is_some_and(|u| close > u) {
        out.push(Explanation::BollingerBreakout);
    } else if lower.is_some_and(|l| close < l) {
        out.push(Explanation::BollingerBreakdown);
    }

    if let Some(vwap) = series.value(columns::VWAP, last) {
        out.push(if close > vwap {
            Explanation::AboveVwap
        } else {
            Explanation::BelowVwap
        });
    }

    let near = |level: f64| close != 0.0 && ((close - level) / close).abs() < NEAR_LEVEL_PCT;
    if let Some(level) = levels.support.filter(|&s| near(s)) {
        out.push(Explanation::NearSupport { level });
    } else if let Some(level) = levels.resistance.filter(|&r| near(r)) {
        out.push(Explanation::NearResistance { level });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;
    use crate::model::Signal;

    fn prediction() -> Prediction {
        Prediction {
            signal: Signal::Buy,
            confidence: 0.75,
            prob_up: 0.75,
            substituted: Vec::new(),
        }
    }

    fn series(closes: &[f64]) -> Series {
        Series::new(make_bars(closes)).unwrap()
    }

    #[test]
    fn bare_series_only_reports_confidence() {
        let out = explain(&series(&[100.0]), &prediction(), &RollingLevels::default());
        assert_eq!(out, vec![Explanation::Confidence { value: 0.75 }]);
        assert_eq!(out[0].to_string(), "Model confidence: 75.00%");
    }

    #[test]
    fn detects_bullish_crossover() {
        let mut s = series(&[100.0, 101.0]);
        s.insert_column(columns::EMA_FAST, vec![99.0, 101.0]).unwrap();
        s.insert_column(columns::EMA_SLOW, vec![100.0, 100.0]).unwrap();
        let out = explain(&s, &prediction(), &RollingLevels::default());
        assert!(out.contains(&Explanation::BullishEmaCrossover));
    }

    #[test]
    fn band_and_vwap_position() {
        let mut s = series(&[100.0, 110.0]);
        s.insert_column(columns::BOLLINGER_UPPER, vec![f64::NAN, 105.0]).unwrap();
        s.insert_column(columns::BOLLINGER_LOWER, vec![f64::NAN, 95.0]).unwrap();
        s.insert_column(columns::VWAP, vec![100.0, 105.0]).unwrap();
        s.insert_column(columns::MACD, vec![0.0, -0.5]).unwrap();
        let out = explain(&s, &prediction(), &RollingLevels::default());
        assert!(out.contains(&Explanation::BollingerBreakout));
        assert!(out.contains(&Explanation::AboveVwap));
        assert!(out.contains(&Explanation::Macd { value: -0.5 }));
        assert_eq!(Explanation::Macd { value: -0.5 }.to_string(), "MACD value: -0.5000 (Bearish)");
    }

    #[test]
    fn support_checked_before_resistance() {
        let levels = RollingLevels {
            support: Some(99.5),
            resistance: Some(100.5),
        };
        let out = explain(&series(&[100.0]), &prediction(), &levels);
        assert!(out.contains(&Explanation::NearSupport { level: 99.5 }));
        assert!(!out.iter().any(|e| matches!(e, Explanation::NearResistance { .. })));
    }
}
