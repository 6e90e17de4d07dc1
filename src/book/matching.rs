//! The matching engine: price-priority cross walk, FIFO fills within a
//! level, TIF finalization and the post-mutation stop sweep.

use super::book::{OrderBook, OrderLocation};
use super::level::{LevelEntry, PriceLevel};
use super::report::{SubmitResult, Trade};
use crate::core::{OrderId, OrderStatus, Price, Quantity, Side, TimeInForce};
use tracing::trace;

impl OrderBook {
    /// How much quantity the opposing side can supply at crossable
    /// prices, capped at `cap`. Used as the FOK pre-scan.
    pub(crate) fn crossable_quantity(
        &self,
        side: Side,
        limit: Option<Price>,
        cap: Quantity,
    ) -> Quantity {
        let mut available: Quantity = 0;
        match side {
            Side::Buy => {
                for (&price, level) in self.asks.iter() {
                    if let Some(limit) = limit {
                        if price > limit.cents() {
                            break;
                        }
                    }
                    available = available.saturating_add(level.total_quantity());
                    if available >= cap {
                        break;
                    }
                }
            }
            Side::Sell => {
                for (&price, level) in self.bids.iter().rev() {
                    if let Some(limit) = limit {
                        if price < limit.cents() {
                            break;
                        }
                    }
                    available = available.saturating_add(level.total_quantity());
                    if available >= cap {
                        break;
                    }
                }
            }
        }
        available.min(cap)
    }

    /// Walk opposing levels in price priority and fill FIFO within
    /// each. Trades print at the resting order's price. Returns the
    /// filled quantity and this aggressor's trades.
    fn cross(
        &mut self,
        aggressor_id: OrderId,
        side: Side,
        limit: Option<Price>,
        quantity: Quantity,
    ) -> (Quantity, Vec<Trade>) {
        let mut remaining = quantity;
        let mut trades = Vec::new();

        while remaining > 0 {
            let best = match side {
                Side::Buy => self.asks.keys().next().copied(),
                Side::Sell => self.bids.keys().next_back().copied(),
            };
            let Some(level_price) = best else { break };
            if let Some(limit) = limit {
                let crosses = match side {
                    Side::Buy => level_price <= limit.cents(),
                    Side::Sell => level_price >= limit.cents(),
                };
                if !crosses {
                    break;
                }
            }

            let mut fills: Vec<(OrderId, Quantity)> = Vec::new();
            let mut fully_consumed: Vec<OrderId> = Vec::new();
            {
                let ladder = match side {
                    Side::Buy => &mut self.asks,
                    Side::Sell => &mut self.bids,
                };
                let Some(level) = ladder.get_mut(&level_price) else {
                    break;
                };
                while remaining > 0 {
                    let Some(front) = level.front().copied() else {
                        break;
                    };
                    let (executed, removed) = level.fill_front(remaining);
                    if executed == 0 {
                        break;
                    }
                    remaining -= executed;
                    fills.push((front.id, executed));
                    if removed {
                        fully_consumed.push(front.id);
                    }
                }
                if level.is_empty() {
                    ladder.remove(&level_price);
                }
            }

            for id in fully_consumed {
                self.id_index.remove(&id);
            }
            for (resting_id, executed) in fills {
                let seq = self.alloc_trade_seq();
                let (buy_order_id, sell_order_id) = match side {
                    Side::Buy => (aggressor_id, resting_id),
                    Side::Sell => (resting_id, aggressor_id),
                };
                let trade = Trade {
                    buy_order_id,
                    sell_order_id,
                    price: Price(level_price),
                    quantity: executed,
                    seq,
                };
                trace!("trade {}", trade);
                self.last_trade = Some(trade.price);
                self.trade_log.push(trade);
                trades.push(trade);
            }
        }

        (quantity - remaining, trades)
    }

    fn insert_resting(&mut self, id: OrderId, side: Side, price: Price, remaining: Quantity, seq: u64) {
        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        ladder
            .entry(price.cents())
            .or_insert_with(|| PriceLevel::new(price))
            .push_back(LevelEntry {
                id,
                remaining,
                seq,
            });
        self.id_index.insert(id, OrderLocation { side, price, seq });
    }

    /// Match an aggressor and finalize per TIF. `limit == None` means a
    /// market order, which always behaves as IOC. Does not sweep stops;
    /// the public operations do that once per mutation.
    pub(crate) fn execute(
        &mut self,
        side: Side,
        limit: Option<Price>,
        quantity: Quantity,
        time_in_force: TimeInForce,
    ) -> SubmitResult {
        let order_id = self.alloc_order_id();
        let seq = self.alloc_seq();

        // FOK precondition: reject wholesale when the opposing side
        // cannot satisfy the full quantity at crossable prices.
        if time_in_force == TimeInForce::Fok
            && self.crossable_quantity(side, limit, quantity) < quantity
        {
            return SubmitResult {
                order_id,
                status: OrderStatus::Rejected,
                filled_quantity: 0,
                resting_quantity: 0,
                cancelled_quantity: quantity,
                trades: Vec::new(),
            };
        }

        // A market order against an empty opposing side is rejected.
        if limit.is_none() {
            let opposing_empty = match side {
                Side::Buy => self.asks.is_empty(),
                Side::Sell => self.bids.is_empty(),
            };
            if opposing_empty {
                return SubmitResult {
                    order_id,
                    status: OrderStatus::Rejected,
                    filled_quantity: 0,
                    resting_quantity: 0,
                    cancelled_quantity: quantity,
                    trades: Vec::new(),
                };
            }
        }

        let (filled, trades) = self.cross(order_id, side, limit, quantity);
        let residual = quantity - filled;

        let rests = residual > 0 && limit.is_some() && time_in_force == TimeInForce::Gtc;
        let (resting_quantity, cancelled_quantity) = if rests {
            // Safe: limit.is_some() holds on this branch.
            if let Some(price) = limit {
                self.insert_resting(order_id, side, price, residual, seq);
            }
            (residual, 0)
        } else {
            (0, residual)
        };

        let status = if filled == quantity {
            OrderStatus::Filled
        } else if filled > 0 {
            OrderStatus::PartiallyFilled
        } else if resting_quantity > 0 {
            OrderStatus::New
        } else {
            // No fill, nothing resting: the IOC residual was cancelled.
            OrderStatus::Cancelled
        };

        SubmitResult {
            order_id,
            status,
            filled_quantity: filled,
            resting_quantity,
            cancelled_quantity,
            trades,
        }
    }

    /// Sweep pending stops against the current mark until quiescent.
    /// Each fired stop re-enters the matching pipeline as an IOC market
    /// order; its trades land in the book log within the same
    /// operation.
    pub(crate) fn run_stop_sweep(&mut self) {
        loop {
            let Some(mark) = self.mark() else { return };
            let Some(fired) = self.stops.fire_next(mark) else {
                return;
            };
            let result = self.execute(
                fired.order.side,
                None,
                fired.order.remaining,
                TimeInForce::Ioc,
            );
            trace!(
                "stop {} converted to market order {}: {:?} filled {}",
                fired.order.id,
                result.order_id,
                result.status,
                result.filled_quantity
            );
        }
    }
}
