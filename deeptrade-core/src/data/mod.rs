//! Market data acquisition. Everything here does I/O; nothing in the
//! indicator, level, model or planner modules depends on it.

pub mod circuit_breaker;
pub mod csv_file;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_file::CsvSource;
pub use provider::{fetch_or_empty, normalize, DataConfig, DataError, DataSource, Interval};
pub use synthetic::SyntheticSource;
pub use yahoo::YahooSource;
