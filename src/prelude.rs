//! Curated re-exports for the common case.
//!
//! ```
//! use nanobook::prelude::*;
//! ```

pub use crate::analytics::{
    atr, bbands, compute_metrics, macd, max_drawdown, quintile_spread, rolling_sharpe,
    rolling_volatility, rsi, spearman, time_series_split, PerfMetrics, StatsError,
};
pub use crate::backtest::{
    run_backtest, AtrStopConfig, BacktestError, BacktestReport, StopConfig, StopEvent, StopReason,
};
pub use crate::book::{
    CancelResult, DepthSnapshot, ModifyResult, OrderBook, OrderBookError, SubmitResult, Trade,
};
pub use crate::core::{
    OrderId, OrderStatus, Price, Quantity, Side, TimeInForce, TokenError, TrailAnchor,
};
pub use crate::exchange::Exchange;
pub use crate::itch::{parse_bytes, parse_file, DecodeError, FeedEvent, ItchDecoder};
pub use crate::portfolio::{
    cdar_weights, cvar_weights, garch_forecast, max_sharpe, min_variance, risk_parity, GarchMean,
    OptimizeError,
};
pub use crate::sweep::sweep_equal_weight;
