//! Core order book state: two price ladders, the order index, the
//! pending-stop set and the trade log.
//!
//! The book is single-writer: every mutating operation takes `&mut
//! self` and the [`crate::Exchange`] facade serializes writers behind
//! one lock. After each mutation the pending stops are swept against
//! the fresh mark (see [`super::stops`]).

use super::level::PriceLevel;
use super::report::Trade;
use super::snapshot::DepthSnapshot;
use super::stops::StopBook;
use crate::core::{OrderId, Price, Side};
use std::collections::{BTreeMap, HashMap};

/// Where a resting order lives, for O(log) cancels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderLocation {
    pub side: Side,
    pub price: Price,
    pub seq: u64,
}

/// A price-time-priority limit order book with stop orders.
#[derive(Debug)]
pub struct OrderBook {
    /// Bid ladder, keyed by price in cents. Iterated highest-first.
    pub(crate) bids: BTreeMap<i64, PriceLevel>,
    /// Ask ladder, keyed by price in cents. Iterated lowest-first.
    pub(crate) asks: BTreeMap<i64, PriceLevel>,
    /// Order id -> exact level and queue position.
    pub(crate) id_index: HashMap<OrderId, OrderLocation>,
    /// Stops waiting for their trigger.
    pub(crate) stops: StopBook,
    /// Append-only trade log (until `clear_trades`).
    pub(crate) trade_log: Vec<Trade>,
    /// Next order id to assign.
    pub(crate) next_order_id: u64,
    /// Next arrival sequence number.
    pub(crate) next_seq: u64,
    /// Next trade sequence number.
    pub(crate) next_trade_seq: u64,
    /// Last trade print; survives `clear_trades` so the stop mark does
    /// not reset.
    pub(crate) last_trade: Option<Price>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// An empty book.
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            id_index: HashMap::new(),
            stops: StopBook::default(),
            trade_log: Vec::new(),
            next_order_id: 1,
            next_seq: 1,
            next_trade_seq: 1,
            last_trade: None,
        }
    }

    pub(crate) fn alloc_order_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        id
    }

    pub(crate) fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub(crate) fn alloc_trade_seq(&mut self) -> u64 {
        let seq = self.next_trade_seq;
        self.next_trade_seq += 1;
        seq
    }

    /// Best (highest) bid price.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().map(|&c| Price(c))
    }

    /// Best (lowest) ask price.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().map(|&c| Price(c))
    }

    /// Top of book as `(best_bid, best_ask)`.
    pub fn best_bid_ask(&self) -> (Option<Price>, Option<Price>) {
        (self.best_bid(), self.best_ask())
    }

    /// Ask minus bid, when both sides exist.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(Price(ask.cents() - bid.cents())),
            _ => None,
        }
    }

    /// Up to `n` levels per side as `(price, total_quantity)` pairs,
    /// best first.
    pub fn depth(&self, n: usize) -> DepthSnapshot {
        DepthSnapshot {
            bids: self
                .bids
                .iter()
                .rev()
                .take(n)
                .map(|(&c, level)| (Price(c), level.total_quantity()))
                .collect(),
            asks: self
                .asks
                .iter()
                .take(n)
                .map(|(&c, level)| (Price(c), level.total_quantity()))
                .collect(),
        }
    }

    /// Snapshot of the trade log, in execution order.
    pub fn trades(&self) -> Vec<Trade> {
        self.trade_log.clone()
    }

    /// Number of logged trades.
    pub fn trade_count(&self) -> usize {
        self.trade_log.len()
    }

    /// Empty the trade log. The last trade print is retained as the
    /// stop-evaluation mark.
    pub fn clear_trades(&mut self) {
        self.trade_log.clear();
    }

    /// Number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.id_index.len()
    }

    /// Number of stops waiting for their trigger.
    pub fn pending_stop_count(&self) -> usize {
        self.stops.len()
    }

    /// The reference price for stop evaluation: last trade print, else
    /// the mid, else the best of whichever side exists.
    pub fn mark(&self) -> Option<Price> {
        if let Some(last) = self.last_trade {
            return Some(last);
        }
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(bid.midpoint(ask)),
            (Some(bid), None) => Some(bid),
            (None, Some(ask)) => Some(ask),
            (None, None) => None,
        }
    }

    /// Check the §3 structural invariants. Debug builds call this after
    /// every public mutation.
    #[cfg(debug_assertions)]
    pub(crate) fn debug_check_invariants(&self) {
        if let (Some(bid), Some(ask)) = self.best_bid_ask() {
            debug_assert!(bid < ask, "book is crossed: bid {bid} >= ask {ask}");
        }
        for (id, loc) in &self.id_index {
            let ladder = match loc.side {
                Side::Buy => &self.bids,
                Side::Sell => &self.asks,
            };
            let level = ladder
                .get(&loc.price.cents())
                .unwrap_or_else(|| panic!("order {id} indexed at missing level {}", loc.price));
            debug_assert!(
                level.entries().any(|e| e.id == *id && e.seq == loc.seq),
                "order {id} not found in its indexed level"
            );
        }
        for ladder in [&self.bids, &self.asks] {
            for level in ladder.values() {
                let sum: u64 = level.entries().map(|e| e.remaining).sum();
                debug_assert_eq!(sum, level.total_quantity(), "level total out of sync");
                debug_assert!(!level.is_empty(), "empty level left in ladder");
            }
        }
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_check_invariants(&self) {}
}
