//! Order book error types.

use crate::core::{Price, Quantity};

/// Errors that can occur within the order book.
///
/// These reject synchronously: when a submit returns an error the book
/// has not been mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum OrderBookError {
    /// Zero-quantity orders are rejected at submission.
    #[error("invalid quantity: {quantity} (must be positive)")]
    InvalidQuantity {
        /// The offending quantity.
        quantity: Quantity,
    },

    /// Limit and trigger prices must be strictly positive.
    #[error("invalid price: {price} (must be positive cents)")]
    InvalidPrice {
        /// The offending price.
        price: Price,
    },

    /// Trailing-stop parameter outside its valid range.
    #[error("invalid trailing parameter: {param}")]
    InvalidTrailParam {
        /// The offending parameter.
        param: f64,
    },

    /// The `Atr` anchor requires a lookback period.
    #[error("atr anchor requires atr_period >= 1")]
    MissingAtrPeriod,
}
