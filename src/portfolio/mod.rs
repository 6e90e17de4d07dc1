//! Deterministic portfolio construction and volatility forecasting.

mod error;
mod garch;
mod optimizers;

pub use error::OptimizeError;
pub use garch::{garch_forecast, GarchMean};
pub use optimizers::{
    cdar_weights, cvar_weights, max_sharpe, min_variance, risk_parity, Weights,
};
