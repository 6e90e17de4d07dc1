//! Deterministic long-only portfolio optimizers.
//!
//! The smooth optimizers run projected gradient descent on the simplex
//! from equal weights, with fixed steps and iteration budgets and the
//! Euclidean sort-based projection. Every reduction runs in a fixed
//! order over plain arrays, so identical inputs give bit-identical
//! outputs. The tail-risk weightings are closed-form.

use super::error::OptimizeError;
use crate::analytics::{cvar, cvar_tail_len};

/// Weights for `symbols`, in input order. Non-negative, summing to 1.
pub type Weights = Vec<(String, f64)>;

/// Shared iteration budget for the fixed-budget descent loops.
const DESCENT_ITERS: usize = 281;
/// Step size for the variance objective.
const MIN_VARIANCE_STEP: f64 = 0.117_720_595_588_062_86;
/// Step size for the negative-Sharpe objective.
const MAX_SHARPE_STEP: f64 = 0.004_614_952_532_274_275;
/// Step size for the risk-contribution-dispersion objective.
const RISK_PARITY_STEP: f64 = 0.002;
/// Risk parity runs to tolerance rather than a fixed budget.
const RISK_PARITY_MAX_ITERS: usize = 10_000;
const RISK_PARITY_TOL: f64 = 1e-16;

fn validate_matrix(returns: &[Vec<f64>], n_assets: usize) -> Result<(), OptimizeError> {
    if returns.is_empty() || n_assets == 0 {
        return Err(OptimizeError::EmptyInput);
    }
    for (row_idx, row) in returns.iter().enumerate() {
        if row.len() != n_assets {
            return Err(OptimizeError::ShapeMismatch {
                row: row_idx,
                got: row.len(),
                expected: n_assets,
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(OptimizeError::NonFinite);
        }
    }
    Ok(())
}

/// Column means and the sample covariance (ddof = 1), as plain nested
/// vectors with a fixed accumulation order.
fn mean_and_cov(returns: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<Vec<f64>>), OptimizeError> {
    let t = returns.len();
    let n = returns[0].len();
    if t < 2 {
        return Err(OptimizeError::TooFewPeriods { needed: 2, got: t });
    }
    let mut mean = vec![0.0; n];
    for row in returns {
        for j in 0..n {
            mean[j] += row[j];
        }
    }
    for m in mean.iter_mut() {
        *m /= t as f64;
    }
    let mut cov = vec![vec![0.0; n]; n];
    for row in returns {
        for i in 0..n {
            let di = row[i] - mean[i];
            for j in 0..n {
                cov[i][j] += di * (row[j] - mean[j]);
            }
        }
    }
    for row in cov.iter_mut() {
        for v in row.iter_mut() {
            *v /= (t - 1) as f64;
        }
    }
    Ok((mean, cov))
}

fn matvec(a: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
    let n = x.len();
    (0..n).map(|i| (0..n).map(|j| a[i][j] * x[j]).sum()).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean projection onto the simplex (sort-based threshold).
fn project_to_simplex(v: &[f64]) -> Vec<f64> {
    let n = v.len();
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (i, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let t = (cumulative - 1.0) / (i + 1) as f64;
        if u - t > 0.0 {
            theta = t;
        }
    }
    (0..n).map(|i| (v[i] - theta).max(0.0)).collect()
}

fn pair_with(symbols: &[String], w: Vec<f64>) -> Weights {
    symbols.iter().cloned().zip(w).collect()
}

/// Minimum-variance weights: projected gradient descent on w' Σ w from
/// equal weights, fixed step and iteration budget.
pub fn min_variance(returns: &[Vec<f64>], symbols: &[String]) -> Result<Weights, OptimizeError> {
    validate_matrix(returns, symbols.len())?;
    let (_, cov) = mean_and_cov(returns)?;
    let n = symbols.len();
    let mut w = vec![1.0 / n as f64; n];
    for _ in 0..DESCENT_ITERS {
        let sw = matvec(&cov, &w);
        let stepped: Vec<f64> = (0..n)
            .map(|i| w[i] - MIN_VARIANCE_STEP * (2.0 * sw[i]))
            .collect();
        w = project_to_simplex(&stepped);
    }
    Ok(pair_with(symbols, w))
}

/// Maximum-Sharpe weights: projected gradient ascent on
/// (μ - rf)' w / σ(w) from equal weights, fixed step and iteration
/// budget. Falls back to [`min_variance`] when no asset earns more
/// than the risk-free rate.
pub fn max_sharpe(
    returns: &[Vec<f64>],
    symbols: &[String],
    risk_free: f64,
) -> Result<Weights, OptimizeError> {
    validate_matrix(returns, symbols.len())?;
    if !risk_free.is_finite() {
        return Err(OptimizeError::NonFinite);
    }
    let (mean, cov) = mean_and_cov(returns)?;
    let n = symbols.len();
    let excess: Vec<f64> = mean.iter().map(|m| m - risk_free).collect();
    if excess.iter().all(|&e| e <= 0.0) {
        return min_variance(returns, symbols);
    }
    let mut w = vec![1.0 / n as f64; n];
    for _ in 0..DESCENT_ITERS {
        let sw = matvec(&cov, &w);
        let m = dot(&excess, &w);
        let var = dot(&w, &sw);
        let sig = var.sqrt();
        let stepped: Vec<f64> = (0..n)
            .map(|i| {
                let g = -(excess[i] / sig - m * sw[i] / (sig * sig * sig));
                w[i] - MAX_SHARPE_STEP * g
            })
            .collect();
        w = project_to_simplex(&stepped);
    }
    Ok(pair_with(symbols, w))
}

/// Equal-risk-contribution weights: projected gradient descent on the
/// dispersion of risk contributions Σ_i (w_i (Σw)_i - σ²/n)², with the
/// step scaled by 1/σ⁴ so the descent is insensitive to the data's
/// variance scale. Runs until the iterate is stationary (or the
/// iteration cap); at the solution every asset contributes the same
/// marginal risk w_i (Σw)_i.
pub fn risk_parity(returns: &[Vec<f64>], symbols: &[String]) -> Result<Weights, OptimizeError> {
    validate_matrix(returns, symbols.len())?;
    let (_, cov) = mean_and_cov(returns)?;
    let n = symbols.len();
    let nf = n as f64;
    let mut w = vec![1.0 / nf; n];
    for _ in 0..RISK_PARITY_MAX_ITERS {
        let sw = matvec(&cov, &w);
        let var = dot(&w, &sw);
        let mut grad = vec![0.0; n];
        for j in 0..n {
            let mut s = 0.0;
            for i in 0..n {
                let base = if i == j { sw[i] } else { 0.0 };
                let drc = base + w[i] * cov[i][j];
                s += 2.0 * (w[i] * sw[i] - var / nf) * (drc - 2.0 * sw[j] / nf);
            }
            grad[j] = s / (var * var);
        }
        let stepped: Vec<f64> = (0..n).map(|i| w[i] - RISK_PARITY_STEP * grad[i]).collect();
        let next = project_to_simplex(&stepped);
        let delta = next
            .iter()
            .zip(&w)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f64, f64::max);
        w = next;
        if delta < RISK_PARITY_TOL {
            break;
        }
    }
    if w.iter().any(|v| !v.is_finite()) {
        return Err(OptimizeError::NoConvergence("non-finite weights".into()));
    }
    Ok(pair_with(symbols, w))
}

/// Per-asset conditional value at risk: mean loss over the worst
/// max(1, ⌈(1-α)·T⌉) periods.
fn asset_cvar(column: &[f64], alpha: f64) -> f64 {
    -cvar(column, alpha)
}

/// Per-asset conditional drawdown at risk: mean of the worst tail of
/// the drawdown series of the compounded column.
fn asset_cdar(column: &[f64], alpha: f64) -> f64 {
    let mut equity = 1.0;
    let mut peak = 1.0;
    let mut drawdowns = Vec::with_capacity(column.len());
    for r in column {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        drawdowns.push((peak - equity) / peak);
    }
    drawdowns.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let k = cvar_tail_len(column.len(), alpha);
    drawdowns[..k].iter().sum::<f64>() / k as f64
}

fn inverse_risk_weights(
    returns: &[Vec<f64>],
    symbols: &[String],
    alpha: f64,
    risk_fn: impl Fn(&[f64], f64) -> f64,
) -> Result<Weights, OptimizeError> {
    validate_matrix(returns, symbols.len())?;
    if !(0.0..1.0).contains(&alpha) || alpha <= 0.0 {
        return Err(OptimizeError::InvalidConfidence(alpha));
    }
    let n = symbols.len();
    let mut inverse: Vec<f64> = Vec::with_capacity(n);
    for j in 0..n {
        let column: Vec<f64> = returns.iter().map(|row| row[j]).collect();
        let risk = risk_fn(&column, alpha).max(1e-12);
        inverse.push(1.0 / risk);
    }
    let total: f64 = inverse.iter().sum();
    Ok(symbols
        .iter()
        .zip(inverse)
        .map(|(s, v)| (s.clone(), v / total))
        .collect())
}

/// Tail-risk-budgeted weights: w_i proportional to 1 / CVaR_α of asset
/// i. Assets with heavier loss tails receive less weight.
pub fn cvar_weights(
    returns: &[Vec<f64>],
    symbols: &[String],
    alpha: f64,
) -> Result<Weights, OptimizeError> {
    inverse_risk_weights(returns, symbols, alpha, asset_cvar)
}

/// Drawdown-budgeted weights: w_i proportional to 1 / CDaR_α of asset
/// i.
pub fn cdar_weights(
    returns: &[Vec<f64>],
    symbols: &[String],
    alpha: f64,
) -> Result<Weights, OptimizeError> {
    inverse_risk_weights(returns, symbols, alpha, asset_cdar)
}
