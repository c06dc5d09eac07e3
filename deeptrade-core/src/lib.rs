//! DeepTrade core: indicator engine, support/resistance detection, a seeded
//! random-forest signal model, and a trade planner that turns the model's
//! call into entry, stop-loss and take-profit prices.
//!
//! Data flow: bars → [`indicators::IndicatorEngine`] → [`levels`] →
//! [`model::TrainedModel`] → [`planner::TradePlanner`]. [`pipeline::Pipeline`]
//! runs the whole chain; [`data`] supplies bars.

pub mod config;
pub mod data;
pub mod domain;
pub mod explain;
pub mod export;
pub mod fingerprint;
pub mod indicators;
pub mod levels;
pub mod model;
pub mod pipeline;
pub mod planner;
pub mod rng;

pub use config::{ConfigError, PipelineConfig};
pub use domain::{Direction, PriceBar, Series, TradeCall};
pub use pipeline::{Analysis, Pipeline};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn core_types_are_send_sync() {
        assert_send_sync::<Series>();
        assert_send_sync::<model::TrainedModel>();
        assert_send_sync::<planner::TradePlanner>();
        assert_send_sync::<Pipeline>();
        assert_send_sync::<Analysis>();
        assert_send_sync::<indicators::IndicatorEngine>();
        assert_send_sync::<data::YahooSource>();
        assert_send_sync::<data::CircuitBreaker>();
    }
}
