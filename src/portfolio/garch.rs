//! GARCH(p, q) one-step volatility forecasting.
//!
//! The fit is a Gaussian quasi-likelihood with variance targeting: the
//! intercept is pinned to ω = v̄ (1 - Σα - Σβ) and (α₁..α_p, β₁..β_q)
//! descend the likelihood gradient under a fixed step and iteration
//! budget, clamped to the non-negative stationarity region. Pre-sample
//! squared innovations and variances seed at the sample variance v̄.
//! The derivative recursion needs no transcendentals, so the fit is
//! exactly reproducible across platforms.

use super::error::OptimizeError;
use std::str::FromStr;

/// Mean specification applied before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GarchMean {
    /// Innovations are the raw returns.
    #[default]
    Zero,
    /// Innovations are returns minus their sample mean.
    Constant,
}

impl FromStr for GarchMean {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(GarchMean::Zero),
            "constant" => Ok(GarchMean::Constant),
            other => Err(OptimizeError::InvalidGarchSpec(format!(
                "unknown mean {other:?}"
            ))),
        }
    }
}

/// Fixed descent budget for the quasi-likelihood fit.
const GARCH_ITERS: usize = 3000;
/// Fixed descent step.
const GARCH_STEP: f64 = 9.684_249_144_644_143_6e-5;
/// Initial ARCH mass, split across the p lags.
const INIT_ALPHA: f64 = 0.05;
/// Initial GARCH mass, split across the q lags.
const INIT_BETA: f64 = 0.85;
/// Stationarity cap on Σα + Σβ.
const STATIONARITY_CAP: f64 = 0.999;

struct GarchProblem {
    eps: Vec<f64>,
    vbar: f64,
    p: usize,
    q: usize,
}

impl GarchProblem {
    #[inline]
    fn lagged_eps2(&self, t: usize, i: usize) -> f64 {
        if t >= i + 1 {
            self.eps[t - 1 - i] * self.eps[t - 1 - i]
        } else {
            self.vbar
        }
    }

    /// Conditional variance series for the given parameters.
    fn variance_series(&self, theta: &[f64]) -> Vec<f64> {
        let n = self.eps.len();
        let (alpha, beta) = theta.split_at(self.p);
        let omega = self.vbar * (1.0 - theta.iter().sum::<f64>());
        let mut sigma = vec![0.0; n];
        for t in 0..n {
            let mut v = omega;
            for (i, a) in alpha.iter().enumerate() {
                v += a * self.lagged_eps2(t, i);
            }
            for (j, b) in beta.iter().enumerate() {
                let prev = if t >= j + 1 { sigma[t - 1 - j] } else { self.vbar };
                v += b * prev;
            }
            sigma[t] = v;
        }
        sigma
    }

    /// Gradient of the negative quasi-likelihood in (α, β), with ω
    /// eliminated by variance targeting. The variance derivative runs
    /// the same recursion as the variance itself.
    fn likelihood_gradient(&self, theta: &[f64]) -> Vec<f64> {
        let n = self.eps.len();
        let dim = theta.len();
        let (alpha, beta) = theta.split_at(self.p);
        let omega = self.vbar * (1.0 - theta.iter().sum::<f64>());

        let mut sigma = vec![0.0; n];
        let mut dsigma = vec![vec![0.0; dim]; n];
        for t in 0..n {
            let mut v = omega;
            // dω/dθ_d = -v̄ for every component.
            let mut dv = vec![-self.vbar; dim];
            for (i, a) in alpha.iter().enumerate() {
                let e2 = self.lagged_eps2(t, i);
                v += a * e2;
                dv[i] += e2;
            }
            for (j, b) in beta.iter().enumerate() {
                let prev = if t >= j + 1 { sigma[t - 1 - j] } else { self.vbar };
                v += b * prev;
                dv[self.p + j] += prev;
                if t >= j + 1 {
                    for d in 0..dim {
                        dv[d] += b * dsigma[t - 1 - j][d];
                    }
                }
            }
            sigma[t] = v;
            dsigma[t] = dv;
        }

        let mut grad = vec![0.0; dim];
        for t in 0..n {
            let v = sigma[t];
            let coef = 0.5 * (1.0 / v - self.eps[t] * self.eps[t] / (v * v));
            for d in 0..dim {
                grad[d] += coef * dsigma[t][d];
            }
        }
        grad
    }

    /// One-step-ahead variance for the given parameters.
    fn forecast_variance(&self, theta: &[f64]) -> f64 {
        let n = self.eps.len();
        let (alpha, beta) = theta.split_at(self.p);
        let omega = self.vbar * (1.0 - theta.iter().sum::<f64>());
        let sigma = self.variance_series(theta);
        let mut f = omega;
        for (i, a) in alpha.iter().enumerate() {
            let e2 = if n >= i + 1 {
                self.eps[n - 1 - i] * self.eps[n - 1 - i]
            } else {
                self.vbar
            };
            f += a * e2;
        }
        for (j, b) in beta.iter().enumerate() {
            let prev = if n >= j + 1 { sigma[n - 1 - j] } else { self.vbar };
            f += b * prev;
        }
        f
    }
}

/// Fit GARCH(p, q) and forecast the next-step volatility (the square
/// root of the one-step-ahead conditional variance).
///
/// The output is finite and non-negative; degenerate fits surface as
/// [`OptimizeError`].
pub fn garch_forecast(
    returns: &[f64],
    p: usize,
    q: usize,
    mean: GarchMean,
) -> Result<f64, OptimizeError> {
    if p == 0 {
        return Err(OptimizeError::InvalidGarchSpec("p must be >= 1".into()));
    }
    let min_len = (p.max(q) + 2).max(4);
    if returns.len() < min_len {
        return Err(OptimizeError::TooFewPeriods {
            needed: min_len,
            got: returns.len(),
        });
    }
    if returns.iter().any(|v| !v.is_finite()) {
        return Err(OptimizeError::NonFinite);
    }

    let eps: Vec<f64> = match mean {
        GarchMean::Zero => returns.to_vec(),
        GarchMean::Constant => {
            let m = returns.iter().sum::<f64>() / returns.len() as f64;
            returns.iter().map(|r| r - m).collect()
        }
    };
    let vbar = eps.iter().map(|e| e * e).sum::<f64>() / eps.len() as f64;
    if vbar <= 0.0 {
        // A constant series has no volatility to forecast.
        return Ok(0.0);
    }

    let problem = GarchProblem { eps, vbar, p, q };
    let dim = p + q;
    let mut theta = vec![INIT_ALPHA / p as f64; p];
    theta.extend(vec![INIT_BETA / q.max(1) as f64; q]);
    for _ in 0..GARCH_ITERS {
        let grad = problem.likelihood_gradient(&theta);
        for d in 0..dim {
            theta[d] = (theta[d] - GARCH_STEP * grad[d]).max(0.0);
        }
        let total: f64 = theta.iter().sum();
        if total >= STATIONARITY_CAP {
            let scale = 0.998 / total;
            for v in theta.iter_mut() {
                *v *= scale;
            }
        }
    }

    let variance = problem.forecast_variance(&theta);
    if !variance.is_finite() || variance < 0.0 {
        return Err(OptimizeError::NoConvergence(format!(
            "non-finite variance forecast {variance}"
        )));
    }
    Ok(variance.sqrt())
}
