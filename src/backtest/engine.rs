//! Weight-schedule backtesting engine.
//!
//! Simulates per-symbol holdings against a parallel price schedule:
//! revalue, evaluate stops, rebalance, charge costs, record. All
//! reductions run in a fixed order (symbols sorted, sums
//! left-to-right) so results are bit-identical across runs.

use super::config::StopConfig;
use super::stops::{PositionStops, StopEvent};
use crate::analytics::{compute_metrics, PerfMetrics};
use crate::core::Price;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Backtest input errors. Nothing is simulated when these fire.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BacktestError {
    /// Weight and price schedules must be the same length.
    #[error("schedule length mismatch: {weights} weight periods vs {prices} price periods")]
    ScheduleLengthMismatch {
        /// Weight periods.
        weights: usize,
        /// Price periods.
        prices: usize,
    },

    /// At least one period is required.
    #[error("empty schedule")]
    EmptySchedule,

    /// Initial cash must be positive.
    #[error("initial cash must be positive, got {0}")]
    NonPositiveCash(i64),

    /// Trading cost must be finite and non-negative.
    #[error("invalid cost_bps: {0}")]
    InvalidCostBps(f64),

    /// Prices must be positive cents.
    #[error("non-positive price {price} for {symbol} in period {period}")]
    NonPositivePrice {
        /// The symbol.
        symbol: String,
        /// The period index.
        period: usize,
        /// The offending price in cents.
        price: i64,
    },

    /// Weights must be finite and non-negative (long-only).
    #[error("invalid weight {weight} for {symbol} in period {period}")]
    InvalidWeight {
        /// The symbol.
        symbol: String,
        /// The period index.
        period: usize,
        /// The offending weight.
        weight: f64,
    },

    /// A weighted or held symbol has no price this period.
    #[error("missing price for {symbol} in period {period}")]
    MissingPrice {
        /// The symbol.
        symbol: String,
        /// The period index.
        period: usize,
    },

    /// A stop percentage outside (0, 1) or a degenerate ATR config.
    #[error("invalid stop config: {0}")]
    InvalidStopConfig(String),
}

/// Everything a backtest run produces.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    /// Post-cost equity per period, in cents.
    pub equity_curve: Vec<f64>,
    /// Period-over-period equity returns; period 0 is measured against
    /// the initial cash.
    pub returns: Vec<f64>,
    /// Per-period holdings as `(symbol, shares)`, symbols sorted.
    pub holdings: Vec<Vec<(String, f64)>>,
    /// Per-period per-symbol close-to-close returns, symbols sorted.
    pub symbol_returns: Vec<Vec<(String, f64)>>,
    /// Stop exits, at most one per position lifecycle.
    pub stop_events: Vec<StopEvent>,
    /// Summary statistics over `returns`.
    pub metrics: PerfMetrics,
}

fn validate_stop_cfg(cfg: &StopConfig) -> Result<(), BacktestError> {
    let check_pct = |name: &str, value: Option<f64>| -> Result<(), BacktestError> {
        if let Some(p) = value {
            if !p.is_finite() || !(0.0..1.0).contains(&p) || p == 0.0 {
                return Err(BacktestError::InvalidStopConfig(format!(
                    "{name} must be in (0, 1), got {p}"
                )));
            }
        }
        Ok(())
    };
    check_pct("fixed_stop_pct", cfg.fixed_stop_pct)?;
    check_pct("trailing_stop_pct", cfg.trailing_stop_pct)?;
    if let Some(atr) = cfg.atr_stop {
        if !atr.multiplier.is_finite() || atr.multiplier <= 0.0 || atr.period == 0 {
            return Err(BacktestError::InvalidStopConfig(format!(
                "atr_stop requires positive multiplier and period, got {atr:?}"
            )));
        }
    }
    Ok(())
}

/// Run a weight-schedule backtest.
///
/// `weight_schedule[t]` holds the long-only target weights applied in
/// period `t`; `price_schedule[t]` the matching closes in cents.
/// `cost_bps` is charged on traded notional (stop exits included);
/// `periods_per_year` and `risk_free` feed the metrics.
pub fn run_backtest(
    weight_schedule: &[Vec<(String, f64)>],
    price_schedule: &[Vec<(String, Price)>],
    initial_cash: i64,
    cost_bps: f64,
    periods_per_year: f64,
    risk_free: f64,
    stop_cfg: Option<&StopConfig>,
) -> Result<BacktestReport, BacktestError> {
    if weight_schedule.len() != price_schedule.len() {
        return Err(BacktestError::ScheduleLengthMismatch {
            weights: weight_schedule.len(),
            prices: price_schedule.len(),
        });
    }
    if weight_schedule.is_empty() {
        return Err(BacktestError::EmptySchedule);
    }
    if initial_cash <= 0 {
        return Err(BacktestError::NonPositiveCash(initial_cash));
    }
    if !cost_bps.is_finite() || cost_bps < 0.0 {
        return Err(BacktestError::InvalidCostBps(cost_bps));
    }
    if let Some(cfg) = stop_cfg {
        validate_stop_cfg(cfg)?;
    }

    let periods = weight_schedule.len();
    let mut cash = initial_cash as f64;
    // Sorted maps keep every reduction order deterministic.
    let mut shares: BTreeMap<String, f64> = BTreeMap::new();
    let mut stop_state: BTreeMap<String, PositionStops> = BTreeMap::new();
    let mut close_history: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut prev_close: BTreeMap<String, f64> = BTreeMap::new();

    let mut equity_curve = Vec::with_capacity(periods);
    let mut returns = Vec::with_capacity(periods);
    let mut holdings_out = Vec::with_capacity(periods);
    let mut symbol_returns_out = Vec::with_capacity(periods);
    let mut stop_events = Vec::new();

    for t in 0..periods {
        // Period closes, validated.
        let mut closes: BTreeMap<String, f64> = BTreeMap::new();
        for (symbol, price) in &price_schedule[t] {
            if price.cents() <= 0 {
                return Err(BacktestError::NonPositivePrice {
                    symbol: symbol.clone(),
                    period: t,
                    price: price.cents(),
                });
            }
            closes.insert(symbol.clone(), price.cents() as f64);
        }
        for (symbol, close) in &closes {
            close_history.entry(symbol.clone()).or_default().push(*close);
        }

        let close_of = |symbol: &str, closes: &BTreeMap<String, f64>| -> Result<f64, BacktestError> {
            closes
                .get(symbol)
                .copied()
                .ok_or_else(|| BacktestError::MissingPrice {
                    symbol: symbol.to_string(),
                    period: t,
                })
        };

        // 1. Stop evaluation against the fresh closes.
        let mut turnover = 0.0;
        let mut stopped_this_period: Vec<String> = Vec::new();
        if let Some(cfg) = stop_cfg.filter(|c| !c.is_empty()) {
            let held: Vec<String> = shares
                .iter()
                .filter(|(_, qty)| **qty > 0.0)
                .map(|(s, _)| s.clone())
                .collect();
            for symbol in held {
                let close = close_of(&symbol, &closes)?;
                let history = close_history.get(&symbol).map(Vec::as_slice).unwrap_or(&[]);
                let Some(state) = stop_state.get_mut(&symbol) else {
                    continue;
                };
                if let Some((reason, trigger_price)) = state.evaluate(close, history, cfg) {
                    let qty = shares.get(&symbol).copied().unwrap_or(0.0);
                    let notional = qty * close;
                    cash += notional;
                    turnover += notional;
                    shares.insert(symbol.clone(), 0.0);
                    stop_state.remove(&symbol);
                    debug!(
                        "stop exit {symbol} period {t}: reason {reason} trigger {trigger_price} exit {close}"
                    );
                    stop_events.push(StopEvent {
                        symbol: symbol.clone(),
                        period_index: t,
                        reason,
                        trigger_price,
                        exit_price: Price(close as i64),
                    });
                    stopped_this_period.push(symbol);
                }
            }
        }

        // 2. Revalue.
        let mut equity = cash;
        for (symbol, qty) in &shares {
            if *qty > 0.0 {
                equity += *qty * close_of(symbol, &closes)?;
            }
        }

        // 3. Rebalance toward this period's weights. Stopped symbols
        // sit out until the next period re-opens them.
        let mut invested = 0.0;
        let mut targeted: Vec<&str> = Vec::new();
        for (symbol, weight) in &weight_schedule[t] {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(BacktestError::InvalidWeight {
                    symbol: symbol.clone(),
                    period: t,
                    weight: *weight,
                });
            }
            targeted.push(symbol.as_str());
            if stopped_this_period.iter().any(|s| s == symbol) {
                continue;
            }
            let close = close_of(symbol, &closes)?;
            let target_value = *weight * equity;
            let current_value = shares.get(symbol).copied().unwrap_or(0.0) * close;
            turnover += (target_value - current_value).abs();
            let new_qty = target_value / close;

            let was_open = shares.get(symbol).copied().unwrap_or(0.0) > 0.0;
            if new_qty > 0.0 {
                if !was_open {
                    stop_state.insert(symbol.clone(), PositionStops::open(close));
                }
                shares.insert(symbol.clone(), new_qty);
            } else {
                shares.remove(symbol);
                stop_state.remove(symbol);
            }
            invested += target_value;
        }
        // Held symbols absent from this period's weights are closed.
        let to_close: Vec<String> = shares
            .iter()
            .filter(|(symbol, qty)| {
                **qty > 0.0 && !targeted.iter().any(|s| s == &symbol.as_str())
            })
            .map(|(s, _)| s.clone())
            .collect();
        for symbol in to_close {
            let close = close_of(&symbol, &closes)?;
            let qty = shares.remove(&symbol).unwrap_or(0.0);
            turnover += qty * close;
            stop_state.remove(&symbol);
        }

        let cost = turnover * cost_bps / 10_000.0;
        cash = equity - invested - cost;
        let equity_after = equity - cost;

        // 4. Record.
        let prev_equity = if t == 0 {
            initial_cash as f64
        } else {
            equity_curve[t - 1]
        };
        returns.push(equity_after / prev_equity - 1.0);
        equity_curve.push(equity_after);
        holdings_out.push(
            shares
                .iter()
                .filter(|(_, qty)| **qty > 0.0)
                .map(|(s, q)| (s.clone(), *q))
                .collect::<Vec<_>>(),
        );
        let mut per_symbol = Vec::with_capacity(closes.len());
        for (symbol, close) in &closes {
            let ret = match prev_close.get(symbol) {
                Some(prev) => close / prev - 1.0,
                None => 0.0,
            };
            per_symbol.push((symbol.clone(), ret));
        }
        symbol_returns_out.push(per_symbol);
        for (symbol, close) in &closes {
            prev_close.insert(symbol.clone(), *close);
        }
    }

    let metrics = compute_metrics(&returns, periods_per_year, risk_free);
    Ok(BacktestReport {
        equity_curve,
        returns,
        holdings: holdings_out,
        symbol_returns: symbol_returns_out,
        stop_events,
        metrics,
    })
}
