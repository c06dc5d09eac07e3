//! End-to-end scenarios for the analysis pipeline.

use chrono::{Duration, TimeZone, Utc};
use deeptrade_core::data::{Interval, SyntheticSource};
use deeptrade_core::domain::{CallReason, Direction, LevelKind, LevelSet, PriceBar, Series};
use deeptrade_core::export::analysis_to_json;
use deeptrade_core::indicators::{columns, IndicatorEngine};
use deeptrade_core::levels::nearest_fibonacci;
use deeptrade_core::model::{
    ForestConfig, ModelError, Prediction, Predictor, Signal, TrainConfig, TrainedModel,
};
use deeptrade_core::planner::{PlanLevels, TradePlanner};
use deeptrade_core::{Pipeline, PipelineConfig};

fn flat_bars(n: usize, price: f64) -> Vec<PriceBar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| PriceBar {
            time: base + Duration::hours(i as i64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000.0,
        })
        .collect()
}

fn synthetic(n: usize) -> Series {
    Series::new(SyntheticSource::new(42).generate("BTC-USD", Interval::OneHour, n)).unwrap()
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        model: TrainConfig {
            forest: ForestConfig {
                n_trees: 20,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn flat_series_collapses_bands_onto_sma() {
    let series = IndicatorEngine::default()
        .annotate(Series::new(flat_bars(60, 50.0)).unwrap())
        .unwrap();
    for i in 9..60 {
        let sma = series.value(columns::SMA, i).unwrap();
        assert_eq!(series.value(columns::BOLLINGER_UPPER, i), Some(sma));
        assert_eq!(series.value(columns::BOLLINGER_LOWER, i), Some(sma));
        assert_eq!(series.value(columns::VWAP, i), Some(50.0));
    }
}

#[test]
fn flat_series_has_no_signal() {
    // every label is "not up": one class only
    let analysis = Pipeline::new(fast_config())
        .analyze(Series::new(flat_bars(60, 50.0)).unwrap())
        .unwrap();
    assert_eq!(analysis.call.direction, Direction::NoSignal);
    assert_eq!(analysis.call.reason, Some(CallReason::InsufficientData));
    assert!(analysis.model_summary.is_none());
}

#[test]
fn empty_series_is_no_data() {
    let analysis = Pipeline::default().analyze(Series::empty()).unwrap();
    assert_eq!(analysis.call.direction, Direction::NoSignal);
    assert_eq!(analysis.call.reason, Some(CallReason::NoData));
    assert!(analysis.series.is_empty());
    assert_eq!(analysis.fib_entry, None);
}

#[test]
fn short_series_cannot_train() {
    let series = IndicatorEngine::default().annotate(synthetic(30)).unwrap();
    let err = TrainedModel::train(&series, &TrainConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::InsufficientData(_)));

    // repeated calls fail the same way
    let again = TrainedModel::train(&series, &TrainConfig::default()).unwrap_err();
    assert_eq!(err, again);

    let analysis = Pipeline::new(fast_config()).analyze(synthetic(30)).unwrap();
    assert_eq!(analysis.call.reason, Some(CallReason::InsufficientData));
}

#[test]
fn train_then_predict_is_repeatable() {
    let series = IndicatorEngine::default().annotate(synthetic(200)).unwrap();
    let config = fast_config().model;
    let a = TrainedModel::train(&series, &config).unwrap();
    let b = TrainedModel::train(&series, &config).unwrap();
    let pa = a.predict(&series).unwrap();
    let pb = b.predict(&series).unwrap();
    assert_eq!(pa.signal, pb.signal);
    assert_eq!(pa.confidence.to_bits(), pb.confidence.to_bits());
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn full_analysis_produces_priced_call() {
    let analysis = Pipeline::new(fast_config()).analyze(synthetic(200)).unwrap();
    let summary = analysis.model_summary.as_ref().unwrap();
    assert_eq!(summary.fingerprint.bar_count, 200);
    assert_eq!(summary.fingerprint.n_trees, 20);

    let call = &analysis.call;
    match call.direction {
        Direction::Buy | Direction::Sell => {
            assert!(call.entry.is_some() && call.stop_loss.is_some() && call.take_profit.is_some());
            assert!(!analysis.explanation.is_empty());
        }
        Direction::NoTrade => assert_eq!(call.reason, Some(CallReason::VolatilityFilter)),
        other => panic!("unexpected direction {other}"),
    }

    let json = analysis_to_json(&analysis).unwrap();
    assert!(json.contains("\"call\""));
}

#[test]
fn analysis_is_deterministic() {
    let pipeline = Pipeline::new(fast_config());
    let a = pipeline.analyze(synthetic(150)).unwrap();
    let b = pipeline.analyze(synthetic(150)).unwrap();
    assert_eq!(a.call, b.call);
    assert_eq!(a.model_summary, b.model_summary);
}

struct AlwaysSell;

impl Predictor for AlwaysSell {
    fn predict(&self, _: &Series) -> Result<Prediction, ModelError> {
        Ok(Prediction {
            signal: Signal::Sell,
            confidence: 0.8,
            prob_up: 0.2,
            substituted: Vec::new(),
        })
    }
}

#[test]
fn resistance_at_price_is_corrected_for_sell() {
    let series = Series::new(flat_bars(5, 200.0)).unwrap();
    let levels = PlanLevels {
        support: Some(190.0),
        resistance: Some(200.0),
        candidates: LevelSet::default(),
    };
    let call = TradePlanner::default().plan(&series, &AlwaysSell, &levels);
    assert_eq!(call.direction, Direction::Sell);
    assert!((call.stop_loss.unwrap() - 201.0).abs() < 1e-9);
    assert_eq!(call.take_profit, Some(190.0));
    assert_eq!(call.corrections.len(), 1);
    assert_eq!(call.corrections[0].kind, LevelKind::Resistance);
}

#[test]
fn analysis_reports_nearest_fibonacci_entry() {
    let analysis = Pipeline::new(fast_config()).analyze(synthetic(200)).unwrap();
    let (support, resistance) = (
        analysis.rolling.support.unwrap(),
        analysis.rolling.resistance.unwrap(),
    );
    let fib = analysis.fib_entry.unwrap();
    assert!(support <= fib && fib <= resistance);

    let price = analysis.series.latest_close().unwrap();
    assert_eq!(nearest_fibonacci(price, &analysis.rolling), Some(fib));
}

#[test]
fn summary_and_call_share_one_prediction() {
    let analysis = Pipeline::new(fast_config()).analyze(synthetic(200)).unwrap();
    let prediction = analysis
        .model_summary
        .as_ref()
        .and_then(|s| s.prediction.as_ref())
        .unwrap();
    if analysis.call.direction.is_actionable() {
        assert_eq!(analysis.call.confidence, Some(prediction.confidence));
        assert_eq!(analysis.call.direction, Direction::from(prediction.signal));
    }
}
