//! Pipeline configuration, loadable from TOML. Every section and field is
//! optional; omitted values take their defaults.
//!
//! ```toml
//! [indicators]
//! sma_period = 10
//!
//! [model]
//! seed = 7
//!
//! [model.forest]
//! n_trees = 50
//!
//! [planner]
//! max_atr_ratio = 2.0
//!
//! [data]
//! asset = "ETH-USD"
//! interval = "4h"
//! ```

use crate::data::DataConfig;
use crate::indicators::IndicatorConfig;
use crate::levels::LevelConfig;
use crate::model::TrainConfig;
use crate::planner::PlannerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub indicators: IndicatorConfig,
    pub levels: LevelConfig,
    pub model: TrainConfig,
    pub planner: PlannerConfig,
    pub data: DataConfig,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make an indicator constructor panic or
    /// the model untrainable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let i = &self.indicators;
        if i.macd_fast >= i.macd_slow {
            return Err(ConfigError::Invalid(format!(
                "macd_fast ({}) must be below macd_slow ({})",
                i.macd_fast, i.macd_slow
            )));
        }
        if i.bollinger_period < 2 {
            return Err(ConfigError::Invalid("bollinger_period must be >= 2".into()));
        }
        let windows = [
            ("sma_period", i.sma_period),
            ("atr_period", i.atr_period),
            ("atr_baseline_window", i.atr_baseline_window),
            ("ema_fast", i.ema_fast),
            ("ema_slow", i.ema_slow),
            ("fib_lookback", i.fib_lookback),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be positive")));
        }
        if !(0.0..1.0).contains(&self.model.test_ratio) {
            return Err(ConfigError::Invalid("model.test_ratio must be in [0, 1)".into()));
        }
        if self.model.forest.n_trees == 0 {
            return Err(ConfigError::Invalid("model.forest.n_trees must be positive".into()));
        }
        Ok(())
    }
}
