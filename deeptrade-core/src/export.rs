//! Export: annotated series as CSV, analysis as JSON.

use crate::domain::Series;
use crate::pipeline::Analysis;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Columns: time, open, high, low, close, volume, then every indicator
/// column in name order. Undefined values are written as empty fields.
pub fn series_to_csv(series: &Series) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let names: Vec<&str> = series.column_names().collect();

    let mut header = vec!["time", "open", "high", "low", "close", "volume"];
    header.extend(names.iter().copied());
    wtr.write_record(&header)?;

    let cell = |v: f64| if v.is_nan() { String::new() } else { format!("{v:.6}") };
    for (i, bar) in series.bars().iter().enumerate() {
        let mut record = vec![bar.time.to_rfc3339()];
        record.extend([bar.open, bar.high, bar.low, bar.close, bar.volume].map(&cell));
        record.extend(names.iter().map(|n| series.value(n, i).map(&cell).unwrap_or_default()));
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_series_csv(series: &Series, path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, series_to_csv(series)?)?;
    Ok(())
}

pub fn analysis_to_json(analysis: &Analysis) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(analysis)?)
}
