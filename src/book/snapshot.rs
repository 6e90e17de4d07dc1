//! Read-only views of the book.

use crate::core::{Price, Quantity};
use serde::Serialize;

/// Aggregated depth: up to `n` levels per side as `(price, total)`
/// pairs, best first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DepthSnapshot {
    /// Bid levels, highest price first.
    pub bids: Vec<(Price, Quantity)>,
    /// Ask levels, lowest price first.
    pub asks: Vec<(Price, Quantity)>,
}

impl DepthSnapshot {
    /// Best bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|&(p, _)| p)
    }

    /// Best ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|&(p, _)| p)
    }
}
