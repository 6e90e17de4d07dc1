//! Domain primitives: fixed-point price, quantity, order identity,
//! side and time-in-force tokens.
//!
//! All engine arithmetic is pure integer. A [`Price`] is an `i64` count
//! of cents (1/100 of the display currency); floats only appear at the
//! display boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price in integer cents. Exactly 8 bytes, fits in a register, and
/// compares with plain integer ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub i64);

impl Price {
    /// The zero price. Invalid for limit orders.
    pub const ZERO: Price = Price(0);

    /// Create a price from a raw cent count.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Price(cents)
    }

    /// The raw cent count.
    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Display-currency value (e.g. `10050` cents -> `100.50`).
    #[inline]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Midpoint of two prices. Integer division truncates toward zero.
    #[inline]
    pub fn midpoint(self, other: Price) -> Price {
        Price((self.0 + other.0) / 2)
    }

    /// True for prices usable as a limit: strictly positive.
    #[inline]
    pub fn is_valid_limit(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Share quantity. Zero quantities are rejected at order submission.
pub type Quantity = u64;

/// Exchange-assigned order identifier. Monotonically increasing,
/// never reused within a process lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A token failed validation before reaching the engine. Distinct from
/// engine errors: nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} token: {token:?}")]
pub struct TokenError {
    /// Which token class failed (`"side"`, `"time-in-force"`, `"anchor"`).
    pub kind: &'static str,
    /// The offending token.
    pub token: String,
}

impl TokenError {
    fn new(kind: &'static str, token: &str) -> Self {
        Self {
            kind,
            token: token.to_string(),
        }
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side (bids).
    Buy,
    /// Sell side (asks).
    Sell,
}

impl Side {
    /// The opposite side.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Side {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(TokenError::new("side", other)),
        }
    }
}

/// Specifies how long an order remains active before it is executed or
/// cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Good Till Cancelled - rests until explicitly cancelled.
    #[default]
    Gtc,
    /// Immediate Or Cancel - fills what it can, cancels the rest.
    Ioc,
    /// Fill Or Kill - fills entirely or not at all.
    Fok,
}

impl TimeInForce {
    /// True if any residual must be cancelled after matching.
    #[inline]
    pub fn is_immediate(self) -> bool {
        matches!(self, TimeInForce::Ioc | TimeInForce::Fok)
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::Gtc => write!(f, "gtc"),
            TimeInForce::Ioc => write!(f, "ioc"),
            TimeInForce::Fok => write!(f, "fok"),
        }
    }
}

impl FromStr for TimeInForce {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gtc" => Ok(TimeInForce::Gtc),
            "ioc" => Ok(TimeInForce::Ioc),
            "fok" => Ok(TimeInForce::Fok),
            other => Err(TokenError::new("time-in-force", other)),
        }
    }
}

/// Anchor rule for a trailing stop's trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailAnchor {
    /// Trigger is a constant price set at submit time.
    Fixed,
    /// Trigger = peak * (1 - param) for sell stops, peak * (1 + param)
    /// for buy stops.
    Percentage,
    /// Trigger = peak -/+ ATR(atr_period) * param, recomputed from the
    /// mark history observed while pending.
    Atr,
}

impl fmt::Display for TrailAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrailAnchor::Fixed => write!(f, "fixed"),
            TrailAnchor::Percentage => write!(f, "percentage"),
            TrailAnchor::Atr => write!(f, "atr"),
        }
    }
}

impl FromStr for TrailAnchor {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(TrailAnchor::Fixed),
            "percentage" => Ok(TrailAnchor::Percentage),
            "atr" => Ok(TrailAnchor::Atr),
            other => Err(TokenError::new("anchor", other)),
        }
    }
}
