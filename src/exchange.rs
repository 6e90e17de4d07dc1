//! Thread-safe facade over the order book.
//!
//! All mutating operations serialize on one write lock; read-only
//! queries share a read lock and always observe a consistent book.

use crate::book::{
    CancelResult, DepthSnapshot, ModifyResult, OrderBook, OrderBookError, SubmitResult, Trade,
};
use crate::core::{OrderId, Price, Quantity, Side, TimeInForce, TrailAnchor};
use parking_lot::RwLock;

/// A single-venue exchange: one order book behind a reader-writer lock.
#[derive(Debug)]
pub struct Exchange {
    inner: RwLock<OrderBook>,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange {
    /// A fresh exchange with an empty book.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(OrderBook::new()),
        }
    }

    /// Submit a limit order. See [`OrderBook::submit_limit`].
    pub fn submit_limit(
        &self,
        side: Side,
        price: Price,
        quantity: Quantity,
        time_in_force: TimeInForce,
    ) -> Result<SubmitResult, OrderBookError> {
        self.inner
            .write()
            .submit_limit(side, price, quantity, time_in_force)
    }

    /// Submit a market order. See [`OrderBook::submit_market`].
    pub fn submit_market(
        &self,
        side: Side,
        quantity: Quantity,
    ) -> Result<SubmitResult, OrderBookError> {
        self.inner.write().submit_market(side, quantity)
    }

    /// Register a stop-market order.
    pub fn submit_stop_market(
        &self,
        side: Side,
        trigger: Price,
        quantity: Quantity,
    ) -> Result<SubmitResult, OrderBookError> {
        self.inner
            .write()
            .submit_stop_market(side, trigger, quantity)
    }

    /// Register a trailing stop-market order.
    pub fn submit_trailing_stop_market(
        &self,
        side: Side,
        initial_trigger: Price,
        quantity: Quantity,
        anchor: TrailAnchor,
        param: f64,
        atr_period: Option<usize>,
    ) -> Result<SubmitResult, OrderBookError> {
        self.inner.write().submit_trailing_stop_market(
            side,
            initial_trigger,
            quantity,
            anchor,
            param,
            atr_period,
        )
    }

    /// Cancel a resting order or pending stop.
    pub fn cancel(&self, order_id: OrderId) -> CancelResult {
        self.inner.write().cancel(order_id)
    }

    /// Replace price and quantity; the replacement gets a fresh id.
    pub fn modify(
        &self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<ModifyResult, OrderBookError> {
        self.inner.write().modify(order_id, new_price, new_quantity)
    }

    /// Top of book.
    pub fn best_bid_ask(&self) -> (Option<Price>, Option<Price>) {
        self.inner.read().best_bid_ask()
    }

    /// Ask minus bid, when both sides exist.
    pub fn spread(&self) -> Option<Price> {
        self.inner.read().spread()
    }

    /// Up to `n` levels per side.
    pub fn depth(&self, n: usize) -> DepthSnapshot {
        self.inner.read().depth(n)
    }

    /// Snapshot of the trade log.
    pub fn trades(&self) -> Vec<Trade> {
        self.inner.read().trades()
    }

    /// Empty the trade log.
    pub fn clear_trades(&self) {
        self.inner.write().clear_trades()
    }

    /// Number of stops waiting for their trigger.
    pub fn pending_stop_count(&self) -> usize {
        self.inner.read().pending_stop_count()
    }

    /// Number of resting orders.
    pub fn order_count(&self) -> usize {
        self.inner.read().order_count()
    }

    /// Run a closure under the read lock for multi-query consistency.
    pub fn with_book<R>(&self, f: impl FnOnce(&OrderBook) -> R) -> R {
        f(&self.inner.read())
    }
}
