//! Backtest configuration.

use serde::{Deserialize, Serialize};

/// ATR-based stop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrStopConfig {
    /// Trigger offset in ATR multiples below the peak.
    pub multiplier: f64,
    /// ATR lookback in periods.
    pub period: usize,
}

/// Stop-loss configuration for a backtest.
///
/// Deserializes from JSON with unknown keys ignored, so callers can
/// pass richer configuration objects through unchanged:
///
/// ```
/// use nanobook::backtest::StopConfig;
/// let cfg: StopConfig =
///     serde_json::from_str(r#"{"fixed_stop_pct": 0.1, "comment": "ignored"}"#).unwrap();
/// assert_eq!(cfg.fixed_stop_pct, Some(0.1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StopConfig {
    /// Exit when price falls below entry * (1 - pct). Must be in (0, 1).
    #[serde(default)]
    pub fixed_stop_pct: Option<f64>,
    /// Exit when price falls below peak * (1 - pct). Must be in (0, 1).
    #[serde(default)]
    pub trailing_stop_pct: Option<f64>,
    /// Exit when price falls below peak - ATR * multiplier.
    #[serde(default)]
    pub atr_stop: Option<AtrStopConfig>,
}

impl StopConfig {
    /// True when no stop rule is configured.
    pub fn is_empty(&self) -> bool {
        self.fixed_stop_pct.is_none()
            && self.trailing_stop_pct.is_none()
            && self.atr_stop.is_none()
    }

    /// Parse from a JSON object. Unknown keys are ignored; malformed
    /// JSON or wrongly-typed known keys are configuration errors.
    pub fn from_json(json: &str) -> Result<Self, super::BacktestError> {
        serde_json::from_str(json)
            .map_err(|e| super::BacktestError::InvalidStopConfig(e.to_string()))
    }
}
