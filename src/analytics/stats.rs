//! Cross-sectional statistics: rank correlation, quantile spreads and
//! walk-forward index splits.

use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Input problems for the statistics helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The two series must have equal, sufficient length.
    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first series.
        left: usize,
        /// Length of the second series.
        right: usize,
    },

    /// Not enough observations for the requested statistic.
    #[error("need at least {needed} observations, got {got}")]
    TooFewObservations {
        /// Minimum required.
        needed: usize,
        /// Provided.
        got: usize,
    },

    /// Bin count must be >= 2 and <= n.
    #[error("invalid bin count {bins} for {n} observations")]
    InvalidBins {
        /// Requested bins.
        bins: usize,
        /// Observation count.
        n: usize,
    },
}

/// Average ranks (1-based) with tie groups sharing their mean rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = avg;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut dx = 0.0;
    let mut dy = 0.0;
    for i in 0..x.len() {
        let a = x[i] - mx;
        let b = y[i] - my;
        num += a * b;
        dx += a * a;
        dy += b * b;
    }
    num / (dx.sqrt() * dy.sqrt())
}

/// Spearman rank correlation with a two-sided p-value from the
/// Student-t distribution with n - 2 degrees of freedom.
///
/// Ties receive average ranks; the correlation is the Pearson
/// correlation of the rank vectors. |rho| = 1 maps to p = 0.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<(f64, f64), StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.len() < 3 {
        return Err(StatsError::TooFewObservations {
            needed: 3,
            got: x.len(),
        });
    }
    let rx = average_ranks(x);
    let ry = average_ranks(y);
    let rho = pearson(&rx, &ry);

    if rho.abs() >= 1.0 {
        return Ok((rho.clamp(-1.0, 1.0), 0.0));
    }
    let df = (x.len() - 2) as f64;
    let t = rho * (df / (1.0 - rho * rho)).sqrt();
    // df >= 1 here, so the distribution constructor cannot fail.
    let dist = StudentsT::new(0.0, 1.0, df).expect("valid degrees of freedom");
    let p = 2.0 * (1.0 - dist.cdf(t.abs()));
    Ok((rho, p))
}

/// Mean return of the top score bin minus the bottom score bin.
///
/// Observations are stably sorted by score and partitioned into `k`
/// bins of n/k, with any remainder distributed across the middle bins
/// so the outer bins stay equal-sized.
pub fn quintile_spread(scores: &[f64], returns: &[f64], k: usize) -> Result<f64, StatsError> {
    if scores.len() != returns.len() {
        return Err(StatsError::LengthMismatch {
            left: scores.len(),
            right: returns.len(),
        });
    }
    let n = scores.len();
    if k < 2 || k > n {
        return Err(StatsError::InvalidBins { bins: k, n });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let base = n / k;
    let rem = n % k;
    let mut sizes = vec![base; k];
    let start = (k - rem) / 2;
    for size in sizes.iter_mut().skip(start).take(rem) {
        *size += 1;
    }

    let bottom = &order[..sizes[0]];
    let top = &order[n - sizes[k - 1]..];
    let mean_of = |idx: &[usize]| idx.iter().map(|&i| returns[i]).sum::<f64>() / idx.len() as f64;
    Ok(mean_of(top) - mean_of(bottom))
}

/// Expanding-train / fixed-test walk-forward splits with
/// scikit-learn's TimeSeriesSplit integer arithmetic:
/// `test_size = n / (k + 1)`, first test start `n - k * test_size`.
pub fn time_series_split(
    n: usize,
    k: usize,
) -> Result<Vec<(Vec<usize>, Vec<usize>)>, StatsError> {
    if k == 0 {
        return Err(StatsError::InvalidBins { bins: k, n });
    }
    let test_size = n / (k + 1);
    if test_size == 0 {
        return Err(StatsError::TooFewObservations {
            needed: k + 1,
            got: n,
        });
    }
    let first_test = n - k * test_size;
    let mut folds = Vec::with_capacity(k);
    for i in 0..k {
        let test_start = first_test + i * test_size;
        let train: Vec<usize> = (0..test_start).collect();
        let test: Vec<usize> = (test_start..test_start + test_size).collect();
        folds.push((train, test));
    }
    Ok(folds)
}
