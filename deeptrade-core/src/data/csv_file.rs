//! CSV file source: `time,open,high,low,close,volume` with RFC 3339 times.
//! Extra columns (such as an exported indicator set) are ignored.

use super::provider::{normalize, DataError, DataSource, Interval};
use crate::domain::PriceBar;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_bars(&self) -> Result<Vec<PriceBar>, DataError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let bars = reader.deserialize().collect::<Result<Vec<PriceBar>, _>>()?;
        Ok(bars)
    }
}

impl DataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    /// The file is taken as-is; `asset` and `interval` only label the log line.
    fn fetch(
        &self,
        asset: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<PriceBar>, DataError> {
        let bars = normalize(self.read_bars()?, limit);
        debug!(asset, %interval, path = %self.path.display(), bars = bars.len(), "loaded CSV");
        Ok(bars)
    }
}
