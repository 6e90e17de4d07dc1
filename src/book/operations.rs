//! Public order book operations: submit, cancel and modify entry
//! points with validation.

use super::book::OrderBook;
use super::error::OrderBookError;
use super::report::{CancelResult, ModifyResult, SubmitResult};
use super::stops::PendingStop;
use crate::core::{
    Order, OrderId, OrderKind, OrderStatus, Price, Quantity, Side, TimeInForce, TrailAnchor,
};
use tracing::trace;

impl OrderBook {
    fn validate_quantity(quantity: Quantity) -> Result<(), OrderBookError> {
        if quantity == 0 {
            return Err(OrderBookError::InvalidQuantity { quantity });
        }
        Ok(())
    }

    fn validate_price(price: Price) -> Result<(), OrderBookError> {
        if !price.is_valid_limit() {
            return Err(OrderBookError::InvalidPrice { price });
        }
        Ok(())
    }

    /// Submit a limit order.
    ///
    /// Crosses against the opposing side first; a GTC residual rests,
    /// an IOC residual is cancelled, and FOK rejects wholesale when the
    /// pre-scan cannot cover the full quantity.
    pub fn submit_limit(
        &mut self,
        side: Side,
        price: Price,
        quantity: Quantity,
        time_in_force: TimeInForce,
    ) -> Result<SubmitResult, OrderBookError> {
        Self::validate_quantity(quantity)?;
        Self::validate_price(price)?;
        trace!("submit_limit {side} {price} x {quantity} {time_in_force}");
        let result = self.execute(side, Some(price), quantity, time_in_force);
        self.run_stop_sweep();
        self.debug_check_invariants();
        Ok(result)
    }

    /// Submit a market order. Behaves as an infinitely aggressive IOC;
    /// rejected when the opposing side is empty.
    pub fn submit_market(
        &mut self,
        side: Side,
        quantity: Quantity,
    ) -> Result<SubmitResult, OrderBookError> {
        Self::validate_quantity(quantity)?;
        trace!("submit_market {side} x {quantity}");
        let result = self.execute(side, None, quantity, TimeInForce::Ioc);
        self.run_stop_sweep();
        self.debug_check_invariants();
        Ok(result)
    }

    /// Register a stop-market order. It stays pending until the mark
    /// crosses the trigger, then enters the book as an IOC market
    /// order.
    pub fn submit_stop_market(
        &mut self,
        side: Side,
        trigger: Price,
        quantity: Quantity,
    ) -> Result<SubmitResult, OrderBookError> {
        Self::validate_quantity(quantity)?;
        Self::validate_price(trigger)?;
        let order_id = self.alloc_order_id();
        let seq = self.alloc_seq();
        trace!("submit_stop_market {side} trigger {trigger} x {quantity} -> {order_id}");
        self.stops.push(PendingStop::new(Order {
            id: order_id,
            side,
            quantity,
            remaining: quantity,
            time_in_force: TimeInForce::Gtc,
            kind: OrderKind::StopMarket { trigger },
            seq,
        }));
        Ok(SubmitResult {
            order_id,
            status: OrderStatus::Pending,
            filled_quantity: 0,
            resting_quantity: 0,
            cancelled_quantity: 0,
            trades: Vec::new(),
        })
    }

    /// Register a trailing stop-market order.
    ///
    /// `param` is the anchor parameter: a fraction in (0, 1) for
    /// `Percentage`, an ATR multiplier for `Atr`, and a retained-but-
    /// inert offset for `Fixed` (whose trigger is the constant
    /// `initial_trigger`).
    pub fn submit_trailing_stop_market(
        &mut self,
        side: Side,
        initial_trigger: Price,
        quantity: Quantity,
        anchor: TrailAnchor,
        param: f64,
        atr_period: Option<usize>,
    ) -> Result<SubmitResult, OrderBookError> {
        Self::validate_quantity(quantity)?;
        Self::validate_price(initial_trigger)?;
        if !param.is_finite() || param < 0.0 {
            return Err(OrderBookError::InvalidTrailParam { param });
        }
        if anchor == TrailAnchor::Percentage && !(0.0..1.0).contains(&param) {
            return Err(OrderBookError::InvalidTrailParam { param });
        }
        if anchor == TrailAnchor::Atr && atr_period.map_or(true, |p| p == 0) {
            return Err(OrderBookError::MissingAtrPeriod);
        }
        let order_id = self.alloc_order_id();
        let seq = self.alloc_seq();
        trace!(
            "submit_trailing_stop {side} {anchor} param {param} trigger {initial_trigger} -> {order_id}"
        );
        self.stops.push(PendingStop::new(Order {
            id: order_id,
            side,
            quantity,
            remaining: quantity,
            time_in_force: TimeInForce::Gtc,
            kind: OrderKind::TrailingStopMarket {
                trigger: initial_trigger,
                anchor,
                param,
                atr_period,
            },
            seq,
        }));
        Ok(SubmitResult {
            order_id,
            status: OrderStatus::Pending,
            filled_quantity: 0,
            resting_quantity: 0,
            cancelled_quantity: 0,
            trades: Vec::new(),
        })
    }

    /// Cancel a resting order or a pending stop. Unknown ids report
    /// `success == false` without mutating anything.
    pub fn cancel(&mut self, order_id: OrderId) -> CancelResult {
        if let Some(location) = self.id_index.remove(&order_id) {
            let ladder = match location.side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            let mut cancelled = 0;
            if let Some(level) = ladder.get_mut(&location.price.cents()) {
                if let Some(entry) = level.remove_by_seq(location.seq) {
                    cancelled = entry.remaining;
                }
                if level.is_empty() {
                    ladder.remove(&location.price.cents());
                }
            }
            debug_assert!(cancelled > 0, "indexed order missing from its level");
            trace!("cancel {order_id}: released {cancelled}");
            self.run_stop_sweep();
            self.debug_check_invariants();
            return CancelResult {
                success: true,
                cancelled_quantity: cancelled,
                error: None,
            };
        }
        if let Some(stop) = self.stops.remove(order_id) {
            trace!("cancel pending stop {order_id}");
            return CancelResult {
                success: true,
                cancelled_quantity: stop.order.remaining,
                error: None,
            };
        }
        CancelResult::not_found(order_id)
    }

    /// Replace a resting order's price and quantity. Implemented as
    /// cancel-then-submit: the replacement gets a fresh id and loses
    /// time priority. The new parameters are validated before the
    /// original is touched.
    pub fn modify(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<ModifyResult, OrderBookError> {
        Self::validate_quantity(new_quantity)?;
        Self::validate_price(new_price)?;
        let Some(location) = self.id_index.get(&order_id).copied() else {
            return Ok(ModifyResult {
                success: false,
                new_order_id: None,
                cancelled_quantity: 0,
                submit: None,
            });
        };
        let cancelled = self.cancel(order_id).cancelled_quantity;
        let submit = self.submit_limit(location.side, new_price, new_quantity, TimeInForce::Gtc)?;
        trace!("modify {order_id} -> {}", submit.order_id);
        Ok(ModifyResult {
            success: true,
            new_order_id: Some(submit.order_id),
            cancelled_quantity: cancelled,
            submit: Some(submit),
        })
    }
}
