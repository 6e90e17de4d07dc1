//! Numeric-layer errors. These propagate to the caller in single-call
//! APIs and become empty slots inside sweeps; they never corrupt
//! engine state.

/// Failures of the optimizers and the GARCH fitter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum OptimizeError {
    /// No assets or no periods supplied.
    #[error("empty returns matrix")]
    EmptyInput,

    /// Rows of the returns matrix must all match the symbol count.
    #[error("shape mismatch: row {row} has {got} entries, expected {expected}")]
    ShapeMismatch {
        /// Offending row.
        row: usize,
        /// Entries found.
        got: usize,
        /// Symbol count.
        expected: usize,
    },

    /// A sample covariance needs at least two periods.
    #[error("need at least {needed} periods, got {got}")]
    TooFewPeriods {
        /// Minimum required.
        needed: usize,
        /// Provided.
        got: usize,
    },

    /// NaN or infinity in the inputs.
    #[error("non-finite value in returns matrix")]
    NonFinite,

    /// The solver left the feasible region or failed to converge.
    #[error("optimizer did not converge: {0}")]
    NoConvergence(String),

    /// Confidence levels must lie in (0, 1).
    #[error("invalid confidence level {0}")]
    InvalidConfidence(f64),

    /// Bad GARCH order or mean specification.
    #[error("invalid garch specification: {0}")]
    InvalidGarchSpec(String),
}
