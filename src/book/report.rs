//! Execution reports returned by the public book operations.

use crate::core::{OrderId, OrderStatus, Price, Quantity};
use serde::Serialize;
use std::fmt;

/// One match print. Prices are the resting order's price: price
/// improvement goes to the aggressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trade {
    /// Buy-side order.
    pub buy_order_id: OrderId,
    /// Sell-side order.
    pub sell_order_id: OrderId,
    /// Execution price in cents.
    pub price: Price,
    /// Executed quantity.
    pub quantity: Quantity,
    /// Strictly increasing trade sequence number.
    pub seq: u64,
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade(#{} {} x {} buy:{} sell:{})",
            self.seq, self.price, self.quantity, self.buy_order_id, self.sell_order_id
        )
    }
}

/// Result of a submit operation. Quantities always reconcile:
/// `filled + resting + cancelled == original`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    /// Exchange-assigned id of the submitted order.
    pub order_id: OrderId,
    /// State at the end of the call.
    pub status: OrderStatus,
    /// Quantity executed during this call.
    pub filled_quantity: Quantity,
    /// Quantity left resting on the book.
    pub resting_quantity: Quantity,
    /// Quantity cancelled in-flight (IOC residual, FOK reject).
    pub cancelled_quantity: Quantity,
    /// Trades produced by this order, in execution order.
    pub trades: Vec<Trade>,
}

/// Result of a cancel request.
#[derive(Debug, Clone, Serialize)]
pub struct CancelResult {
    /// True when an order (resting or pending stop) was removed.
    pub success: bool,
    /// Quantity removed from the book.
    pub cancelled_quantity: Quantity,
    /// Failure reason when `success` is false.
    pub error: Option<String>,
}

impl CancelResult {
    pub(crate) fn not_found(id: OrderId) -> Self {
        Self {
            success: false,
            cancelled_quantity: 0,
            error: Some(format!("order {id} not found")),
        }
    }
}

/// Result of a modify request. Modify is cancel-then-submit: it loses
/// time priority and issues a fresh [`OrderId`].
#[derive(Debug, Clone, Serialize)]
pub struct ModifyResult {
    /// True when the original order was found and replaced.
    pub success: bool,
    /// Id of the replacement order, when successful.
    pub new_order_id: Option<OrderId>,
    /// Quantity cancelled from the original order.
    pub cancelled_quantity: Quantity,
    /// Submit report for the replacement order, when successful.
    pub submit: Option<SubmitResult>,
}
