//! Weight-schedule backtesting with a per-symbol stop-loss state
//! machine.

mod config;
mod engine;
mod stops;

pub use config::{AtrStopConfig, StopConfig};
pub use engine::{run_backtest, BacktestError, BacktestReport};
pub use stops::{StopEvent, StopReason};
