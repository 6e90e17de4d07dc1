//! Domain primitives shared across the engine, decoder and backtester.

mod order;
mod types;

pub use order::{Order, OrderKind, OrderStatus};
pub use types::{OrderId, Price, Quantity, Side, TimeInForce, TokenError, TrailAnchor};
