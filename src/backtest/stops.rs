//! Per-symbol stop-loss state machine.
//!
//! A position lifecycle starts when a rebalance takes a symbol's
//! holding from zero to nonzero and ends when it returns to zero. A
//! stop fires at most once per lifecycle; when several configured
//! rules breach in the same period the tightest trigger (highest, for
//! long positions) wins, with ties broken trailing > fixed > atr.

use super::config::StopConfig;
use crate::analytics;
use crate::core::Price;
use serde::Serialize;
use std::fmt;

/// Which stop rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    /// Entry-anchored fixed percentage stop.
    Fixed,
    /// Peak-anchored trailing percentage stop.
    Trailing,
    /// Peak-anchored ATR stop.
    Atr,
}

impl StopReason {
    /// Tie-break priority: trailing > fixed > atr.
    fn priority(self) -> u8 {
        match self {
            StopReason::Trailing => 2,
            StopReason::Fixed => 1,
            StopReason::Atr => 0,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Fixed => write!(f, "fixed"),
            StopReason::Trailing => write!(f, "trailing"),
            StopReason::Atr => write!(f, "atr"),
        }
    }
}

/// A stop exit, reported once per position lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopEvent {
    /// The stopped symbol.
    pub symbol: String,
    /// Period in which the stop fired.
    pub period_index: usize,
    /// Which rule fired (the tightest breaching one).
    pub reason: StopReason,
    /// The breached trigger price in cents.
    pub trigger_price: Price,
    /// The exit (period close) price in cents.
    pub exit_price: Price,
}

/// Stop state for one open position.
#[derive(Debug, Clone)]
pub(crate) struct PositionStops {
    /// Fill price of the opening rebalance.
    entry_price: f64,
    /// Highest close since entry, entry included.
    peak: f64,
    /// Set once a stop has fired for this lifecycle.
    fired: bool,
}

impl PositionStops {
    pub(crate) fn open(entry_price: f64) -> Self {
        Self {
            entry_price,
            peak: entry_price,
            fired: false,
        }
    }

    /// Feed the period close and decide whether a stop fires.
    ///
    /// `history` is the symbol's full close series up to and including
    /// this period, for the ATR rule.
    pub(crate) fn evaluate(
        &mut self,
        close: f64,
        history: &[f64],
        cfg: &StopConfig,
    ) -> Option<(StopReason, Price)> {
        if close > self.peak {
            self.peak = close;
        }
        if self.fired {
            return None;
        }

        let mut best: Option<(StopReason, i64)> = None;
        let mut consider = |reason: StopReason, trigger: f64| {
            let trigger = trigger.round() as i64;
            if close <= trigger as f64 {
                let tighter = match best {
                    None => true,
                    Some((prev_reason, prev_trigger)) => {
                        trigger > prev_trigger
                            || (trigger == prev_trigger
                                && reason.priority() > prev_reason.priority())
                    }
                };
                if tighter {
                    best = Some((reason, trigger));
                }
            }
        };

        if let Some(pct) = cfg.trailing_stop_pct {
            consider(StopReason::Trailing, self.peak * (1.0 - pct));
        }
        if let Some(pct) = cfg.fixed_stop_pct {
            consider(StopReason::Fixed, self.entry_price * (1.0 - pct));
        }
        if let Some(atr_cfg) = cfg.atr_stop {
            // Closes double as a degenerate OHLC series: the true range
            // collapses to the absolute close-to-close move.
            let series = analytics::atr(history, history, history, atr_cfg.period);
            if let Some(&atr) = series.last().filter(|v| !v.is_nan()) {
                consider(StopReason::Atr, self.peak - atr * atr_cfg.multiplier);
            }
        }

        let (reason, trigger) = best?;
        self.fired = true;
        Some((reason, Price(trigger)))
    }
}
