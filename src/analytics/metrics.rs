//! Deterministic performance metrics over a return series.
//!
//! Sums run left-to-right; nothing here may be re-associated or
//! parallelized, since the outputs are oracle-locked bit-for-bit.

use serde::Serialize;

/// Summary statistics for a period-return series.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PerfMetrics {
    /// Compounded total return.
    pub total_return: f64,
    /// Annualized Sharpe ratio (sample stddev).
    pub sharpe: f64,
    /// Annualized Sortino ratio (full-count downside deviation).
    pub sortino: f64,
    /// Maximum peak-to-trough drawdown, >= 0.
    pub max_drawdown: f64,
    /// Winning fraction of nonzero periods, in [0, 1].
    pub win_rate: f64,
    /// Gross gains over gross losses; +inf when lossless.
    pub profit_factor: f64,
    /// Average win over average loss; +inf when lossless.
    pub payoff_ratio: f64,
    /// Kelly fraction: win_rate - (1 - win_rate) / payoff_ratio.
    pub kelly: f64,
    /// Mean of the worst max(1, ceil(5% * n)) returns.
    pub cvar_95: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}

fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>();
    (ss / values.len() as f64).sqrt()
}

/// Maximum drawdown of the equity curve compounded from `returns`.
/// Always >= 0; 0 for an empty or monotonically rising series.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = 1.0;
    let mut worst: f64 = 0.0;
    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        let dd = (peak - equity) / peak;
        if dd > worst {
            worst = dd;
        }
    }
    worst
}

/// Tail length for CVaR at the given confidence: max(1, ceil((1-α)·n)).
pub(crate) fn cvar_tail_len(n: usize, alpha: f64) -> usize {
    (((1.0 - alpha) * n as f64).ceil() as usize).max(1)
}

/// Mean of the worst `cvar_tail_len(n, alpha)` returns.
pub(crate) fn cvar(returns: &[f64], alpha: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let k = cvar_tail_len(returns.len(), alpha);
    mean(&sorted[..k])
}

/// Compute the full metric set over a return series.
///
/// `periods_per_year` annualizes Sharpe/Sortino; `risk_free` is an
/// annual rate converted to per-period by division.
pub fn compute_metrics(returns: &[f64], periods_per_year: f64, risk_free: f64) -> PerfMetrics {
    if returns.is_empty() {
        return PerfMetrics {
            total_return: 0.0,
            sharpe: f64::NAN,
            sortino: f64::NAN,
            max_drawdown: 0.0,
            win_rate: f64::NAN,
            profit_factor: f64::NAN,
            payoff_ratio: f64::NAN,
            kelly: f64::NAN,
            cvar_95: f64::NAN,
        };
    }

    let n = returns.len();
    let mut total_return = 1.0;
    for r in returns {
        total_return *= 1.0 + r;
    }
    total_return -= 1.0;

    let rf_period = if periods_per_year > 0.0 {
        risk_free / periods_per_year
    } else {
        0.0
    };
    let excess: Vec<f64> = returns.iter().map(|r| r - rf_period).collect();
    let ann = periods_per_year.sqrt();

    let sharpe = if n > 1 {
        let sd = sample_std(&excess);
        if sd > 0.0 {
            mean(&excess) / sd * ann
        } else {
            f64::NAN
        }
    } else {
        f64::NAN
    };

    let downside =
        (excess.iter().map(|r| r.min(0.0).powi(2)).sum::<f64>() / n as f64).sqrt();
    let sortino = if downside > 0.0 {
        mean(&excess) / downside * ann
    } else {
        f64::NAN
    };

    let wins: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
    let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let decided = wins.len() + losses.len();
    let win_rate = if decided > 0 {
        wins.len() as f64 / decided as f64
    } else {
        f64::NAN
    };

    let gross_gain: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if gross_loss > 0.0 {
        gross_gain / gross_loss
    } else {
        f64::INFINITY
    };

    let payoff_ratio = if losses.is_empty() {
        f64::INFINITY
    } else if wins.is_empty() {
        0.0
    } else {
        mean(&wins) / mean(&losses).abs()
    };

    let kelly = if payoff_ratio.is_infinite() {
        win_rate
    } else if payoff_ratio > 0.0 {
        win_rate - (1.0 - win_rate) / payoff_ratio
    } else {
        f64::NAN
    };

    PerfMetrics {
        total_return,
        sharpe,
        sortino,
        max_drawdown: max_drawdown(returns),
        win_rate,
        profit_factor,
        payoff_ratio,
        kelly,
        cvar_95: cvar(returns, 0.95),
    }
}

/// Rolling annualized Sharpe ratio (sample stddev, risk-free 0). The
/// first `window - 1` slots are NaN.
pub fn rolling_sharpe(returns: &[f64], window: usize, periods_per_year: f64) -> Vec<f64> {
    let n = returns.len();
    let mut out = vec![f64::NAN; n];
    if window < 2 || n < window {
        return out;
    }
    let ann = periods_per_year.sqrt();
    for i in window - 1..n {
        let slice = &returns[i + 1 - window..=i];
        let sd = sample_std(slice);
        if sd > 0.0 {
            out[i] = mean(slice) / sd * ann;
        }
    }
    out
}

/// Rolling annualized volatility. Uses the population stddev: the
/// reference oracles disagree with [`rolling_sharpe`] on ddof and the
/// contract follows them. The first `window - 1` slots are NaN.
pub fn rolling_volatility(returns: &[f64], window: usize, periods_per_year: f64) -> Vec<f64> {
    let n = returns.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }
    let ann = periods_per_year.sqrt();
    for i in window - 1..n {
        let slice = &returns[i + 1 - window..=i];
        out[i] = population_std(slice) * ann;
    }
    out
}
