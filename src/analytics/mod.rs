//! Indicators, performance metrics and cross-sectional statistics.
//!
//! Numerical outputs are locked against reference implementations
//! (TA-Lib for indicators, quantstats-style conventions for metrics,
//! scipy/scikit-learn for the statistics), so accumulation order is
//! fixed and must not be re-associated.

mod indicators;
mod metrics;
mod stats;

pub use indicators::{atr, bbands, macd, rsi};
pub use metrics::{
    compute_metrics, max_drawdown, rolling_sharpe, rolling_volatility, PerfMetrics,
};
pub use stats::{quintile_spread, spearman, time_series_split, StatsError};

pub(crate) use metrics::{cvar, cvar_tail_len};
