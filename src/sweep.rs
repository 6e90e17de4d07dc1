//! Parallel parameter sweeps over independent backtests.
//!
//! Each parameter slot is a pure function of `(param, price_series)`:
//! the whole backtest runs on one worker, so its internal reductions
//! stay sequential and the output is bit-identical regardless of the
//! worker count. Only whole backtests are distributed.

use crate::analytics::PerfMetrics;
use crate::backtest::run_backtest;
use crate::core::Price;
use rayon::prelude::*;
use tracing::warn;

/// Run `n_params` independent equal-weight backtests in parallel.
///
/// Parameter `i` charges `i` basis points of trading cost. Results
/// come back in parameter order; a failed slot is `None` and never
/// aborts the sweep.
pub fn sweep_equal_weight(
    n_params: usize,
    price_series: &[Vec<(String, Price)>],
    initial_cash: i64,
    periods_per_year: f64,
    risk_free: f64,
) -> Vec<Option<PerfMetrics>> {
    // Equal weight across whatever trades in each period.
    let weight_schedule: Vec<Vec<(String, f64)>> = price_series
        .iter()
        .map(|period| {
            let n = period.len().max(1) as f64;
            period
                .iter()
                .map(|(symbol, _)| (symbol.clone(), 1.0 / n))
                .collect()
        })
        .collect();

    (0..n_params)
        .into_par_iter()
        .map(|param| {
            let cost_bps = param as f64;
            match run_backtest(
                &weight_schedule,
                price_series,
                initial_cash,
                cost_bps,
                periods_per_year,
                risk_free,
                None,
            ) {
                Ok(report) => Some(report.metrics),
                Err(err) => {
                    warn!("sweep slot {param} failed: {err}");
                    None
                }
            }
        })
        .collect()
}
