//! Pending stop orders: trigger evaluation, trailing peak tracking and
//! ATR re-anchoring.
//!
//! Stops are expected to number in the hundreds at most, so the book
//! sweeps them linearly after every mutation.

use crate::core::{Order, OrderId, OrderKind, Price, Side, TrailAnchor};
use tracing::debug;

/// A stop order waiting for its trigger.
#[derive(Debug, Clone)]
pub(crate) struct PendingStop {
    pub order: Order,
    /// Best-ever mark since the stop went pending: highest for sell
    /// stops, lowest for buy stops. Never moves against the holder.
    peak: Option<Price>,
    /// Marks observed while pending, for ATR re-anchoring.
    marks: Vec<Price>,
}

impl PendingStop {
    pub(crate) fn new(order: Order) -> Self {
        Self {
            order,
            peak: None,
            marks: Vec::new(),
        }
    }

    fn trigger(&self) -> Price {
        match self.order.kind {
            OrderKind::StopMarket { trigger } => trigger,
            OrderKind::TrailingStopMarket { trigger, .. } => trigger,
            // Only stop kinds are ever stored here.
            _ => unreachable!("non-stop order in the pending set"),
        }
    }

    /// Feed a new mark: ratchet the peak, re-anchor the trigger.
    fn observe_mark(&mut self, mark: Price) {
        let side = self.order.side;
        let OrderKind::TrailingStopMarket {
            trigger,
            anchor,
            param,
            atr_period,
        } = &mut self.order.kind
        else {
            return;
        };
        let (anchor, param, atr_period) = (*anchor, *param, *atr_period);

        let peak = match (self.peak, side) {
            (None, _) => mark,
            (Some(p), Side::Sell) => p.max(mark),
            (Some(p), Side::Buy) => p.min(mark),
        };
        self.peak = Some(peak);

        if self.marks.last() != Some(&mark) {
            self.marks.push(mark);
        }

        match anchor {
            // The trigger is a constant set at submit time.
            TrailAnchor::Fixed => {}
            TrailAnchor::Percentage => {
                let factor = match side {
                    Side::Sell => 1.0 - param,
                    Side::Buy => 1.0 + param,
                };
                *trigger = Price((peak.cents() as f64 * factor).round() as i64);
            }
            TrailAnchor::Atr => {
                let period = atr_period.unwrap_or(0);
                if let Some(atr) = mark_atr(&self.marks, period) {
                    let offset = (atr * param).round() as i64;
                    *trigger = match side {
                        Side::Sell => Price(peak.cents() - offset),
                        Side::Buy => Price(peak.cents() + offset),
                    };
                }
                // Not enough history yet: keep the last trigger.
            }
        }
    }

    fn is_triggered(&self, mark: Price) -> bool {
        match self.order.side {
            Side::Sell => mark <= self.trigger(),
            Side::Buy => mark >= self.trigger(),
        }
    }
}

/// Wilder-smoothed average true range over a mark series where each
/// true range is the absolute mark-to-mark move. `None` until
/// `period + 1` marks have been seen.
fn mark_atr(marks: &[Price], period: usize) -> Option<f64> {
    if period == 0 || marks.len() < period + 1 {
        return None;
    }
    let trs: Vec<f64> = marks
        .windows(2)
        .map(|w| (w[1].cents() - w[0].cents()).abs() as f64)
        .collect();
    let mut atr = trs[..period].iter().sum::<f64>() / period as f64;
    for tr in &trs[period..] {
        atr = (atr * (period as f64 - 1.0) + tr) / period as f64;
    }
    Some(atr)
}

/// The set of pending stops, in submission order.
#[derive(Debug, Default)]
pub(crate) struct StopBook {
    pending: Vec<PendingStop>,
}

impl StopBook {
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn push(&mut self, stop: PendingStop) {
        self.pending.push(stop);
    }

    /// Cancel a pending stop by order id.
    pub(crate) fn remove(&mut self, id: OrderId) -> Option<PendingStop> {
        let idx = self.pending.iter().position(|s| s.order.id == id)?;
        Some(self.pending.remove(idx))
    }

    /// Feed the current mark to every pending stop and pop the first
    /// one (in submission order) whose trigger rule fires.
    pub(crate) fn fire_next(&mut self, mark: Price) -> Option<PendingStop> {
        for stop in &mut self.pending {
            stop.observe_mark(mark);
        }
        let idx = self.pending.iter().position(|s| s.is_triggered(mark))?;
        let fired = self.pending.remove(idx);
        debug!(
            "stop {} triggered at mark {} (trigger {})",
            fired.order.id,
            mark,
            fired.trigger()
        );
        Some(fired)
    }
}
