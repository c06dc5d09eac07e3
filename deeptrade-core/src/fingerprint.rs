//! Training-run fingerprinting.
//!
//! - `DatasetHash`: BLAKE3 over the bars a model was trained on.
//! - `ModelFingerprint`: dataset hash + seed + training parameters. Two models
//!   with equal fingerprints were trained identically and predict identically.

use crate::domain::PriceBar;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub [u8; 32]);

impl DatasetHash {
    /// Hash timestamps and OHLCV bit patterns in bar order.
    pub fn of_bars(bars: &[PriceBar]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for bar in bars {
            hasher.update(&bar.time.timestamp_millis().to_le_bytes());
            for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
                hasher.update(&v.to_bits().to_le_bytes());
            }
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell runs apart in logs.
        f.write_str(&self.to_hex()[..12])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFingerprint {
    pub dataset_hash: DatasetHash,
    pub seed: u64,
    pub n_trees: usize,
    pub bar_count: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;

    #[test]
    fn hashing_is_deterministic() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        assert_eq!(DatasetHash::of_bars(&bars), DatasetHash::of_bars(&bars));
    }

    #[test]
    fn hash_changes_with_any_price() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let mut changed = bars.clone();
        changed[1].volume += 1.0;
        assert_ne!(DatasetHash::of_bars(&bars), DatasetHash::of_bars(&changed));
    }

    #[test]
    fn display_is_short_hex() {
        let h = DatasetHash::of_bars(&make_bars(&[1.0]));
        assert_eq!(h.to_string().len(), 12);
        assert_eq!(h.to_hex().len(), 64);
    }
}
