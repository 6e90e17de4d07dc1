//! Order records, stop specifications and the order status lifecycle.

use super::types::{Price, Quantity, Side, TimeInForce, TrailAnchor};
use serde::Serialize;
use std::fmt;

/// What kind of order was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum OrderKind {
    /// Rests at `price` when not immediately matched.
    Limit {
        /// Limit price in cents.
        price: Price,
    },
    /// Infinitely aggressive; never rests.
    Market,
    /// Pending until the mark crosses `trigger`, then enters the book
    /// as an IOC market order.
    StopMarket {
        /// Trigger price in cents.
        trigger: Price,
    },
    /// Stop whose trigger re-anchors to the best mark seen while
    /// pending.
    TrailingStopMarket {
        /// Current trigger price in cents.
        trigger: Price,
        /// How the trigger follows the peak.
        anchor: TrailAnchor,
        /// Anchor parameter (fraction for `Percentage`, multiplier for
        /// `Atr`, offset for `Fixed`).
        param: f64,
        /// ATR lookback, for the `Atr` anchor.
        atr_period: Option<usize>,
    },
}

/// Status of an order at the end of a public operation.
///
/// `New -> PartiallyFilled -> Filled`; `New -> Cancelled`;
/// `Pending -> (trigger) -> New -> ...`; `New -> Rejected` (FOK).
/// `Filled`, `Cancelled` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    /// Accepted; resting with no fills.
    New,
    /// Some quantity filled, some resting or cancelled.
    PartiallyFilled,
    /// Fully filled.
    Filled,
    /// Fully cancelled (explicitly, or the residual of an IOC).
    Cancelled,
    /// A stop waiting for its trigger.
    Pending,
    /// Refused without touching the book (FOK shortfall, empty-book
    /// market order).
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::New => "New",
            OrderStatus::PartiallyFilled => "PartiallyFilled",
            OrderStatus::Filled => "Filled",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Pending => "Pending",
            OrderStatus::Rejected => "Rejected",
        };
        write!(f, "{s}")
    }
}

/// An order as the engine sees it.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Exchange-assigned identifier.
    pub id: super::types::OrderId,
    /// Buy or sell.
    pub side: Side,
    /// Original quantity.
    pub quantity: Quantity,
    /// Unfilled quantity.
    pub remaining: Quantity,
    /// Time-in-force policy.
    pub time_in_force: TimeInForce,
    /// Limit/market/stop specification.
    pub kind: OrderKind,
    /// Arrival sequence, assigned monotonically by the book.
    pub seq: u64,
}

impl Order {
    /// Limit price, when the order has one.
    pub fn limit_price(&self) -> Option<Price> {
        match self.kind {
            OrderKind::Limit { price } => Some(price),
            _ => None,
        }
    }
}
