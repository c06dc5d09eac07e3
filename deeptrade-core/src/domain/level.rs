//! Support/resistance level types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A single classified price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub kind: LevelKind,
}

/// Short-window levels: lowest low and highest high of the recent window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingLevels {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// Long-window candidate levels from local extrema, each sorted ascending
/// and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

impl LevelSet {
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.resistance.is_empty()
    }

    pub fn levels(&self, kind: LevelKind) -> &[f64] {
        match kind {
            LevelKind::Support => &self.support,
            LevelKind::Resistance => &self.resistance,
        }
    }

    /// All levels tagged with their kind, supports first.
    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.support
            .iter()
            .map(|&price| Level {
                price,
                kind: LevelKind::Support,
            })
            .chain(self.resistance.iter().map(|&price| Level {
                price,
                kind: LevelKind::Resistance,
            }))
    }
}
