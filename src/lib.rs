//! # nanobook: a quantitative trading kernel
//!
//! nanobook combines a price-time-priority limit order book with a
//! deterministic backtesting and portfolio-analytics layer:
//!
//! - **[`Exchange`]**: a thread-safe matching engine supporting
//!   limit, market, stop-market and trailing-stop orders under
//!   GTC/IOC/FOK time-in-force, with price-time priority and FIFO
//!   queues at each level. Mutations serialize on a single write lock;
//!   queries share a read lock.
//! - **[`itch`]**: an ITCH 5.0 binary feed decoder that turns
//!   length-prefixed wire records into engine events, preserving feed
//!   order and surfacing malformed input as typed errors with byte
//!   offsets.
//! - **[`backtest`]**: a weight-schedule simulator tracking
//!   per-symbol holdings, trading costs and a stop-loss state machine
//!   (fixed, trailing and ATR stops with tightest-breach selection).
//! - **[`analytics`]**: indicators (RSI, MACD, Bollinger Bands, ATR)
//!   and performance metrics locked numerically against the standard
//!   reference implementations, plus rank statistics and walk-forward
//!   splits.
//! - **[`portfolio`]**: deterministic long-only optimizers
//!   (minimum-variance, maximum-Sharpe, risk parity, CVaR/CDaR
//!   budgeting) and a GARCH(p, q) volatility forecaster.
//! - **[`sweep`]**: a rayon-backed executor fanning independent
//!   backtests across worker threads with strict output ordering.
//!
//! Prices are integer cents throughout the engine; floats appear only
//! in the analytics layer. Every floating-point reduction runs in a
//! fixed order, so identical inputs produce bit-identical outputs
//! across runs and thread counts.
//!
//! ## Example
//!
//! ```
//! use nanobook::prelude::*;
//!
//! let exchange = Exchange::new();
//! exchange
//!     .submit_limit(Side::Sell, Price(10_000), 100, TimeInForce::Gtc)
//!     .unwrap();
//! let fill = exchange
//!     .submit_limit(Side::Buy, Price(10_000), 100, TimeInForce::Gtc)
//!     .unwrap();
//! assert_eq!(fill.status, OrderStatus::Filled);
//! assert_eq!(fill.trades[0].price, Price(10_000));
//! ```

pub mod analytics;
pub mod backtest;
pub mod book;
pub mod core;
mod exchange;
pub mod itch;
pub mod portfolio;
pub mod prelude;
pub mod sweep;

pub use crate::book::{
    CancelResult, DepthSnapshot, ModifyResult, OrderBook, OrderBookError, SubmitResult, Trade,
};
pub use crate::core::{
    OrderId, OrderStatus, Price, Quantity, Side, TimeInForce, TokenError, TrailAnchor,
};
pub use crate::exchange::Exchange;
