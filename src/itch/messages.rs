//! ITCH 5.0 record layouts.
//!
//! The feed is a stream of length-prefixed records: a 2-byte big-endian
//! payload length, then the payload, whose first byte is the message
//! type.
//!
//! Add Order (`A`), 36-byte payload:
//!
//! ```text
//! Offset | Size | Field
//! -------|------|---------------------------
//!  0     |  1   | message type ('A')
//!  1     |  2   | stock locate (u16)
//!  3     |  2   | tracking number (u16)
//!  5     |  6   | timestamp (u48, ns since midnight)
//! 11     |  8   | order reference (u64)
//! 19     |  1   | side ('B' | 'S')
//! 20     |  4   | shares (u32)
//! 24     |  8   | stock (ASCII, right-padded with spaces)
//! 32     |  4   | price (u32, fixed-point x10,000)
//! ```
//!
//! Replace Order (`U`), 35-byte payload:
//!
//! ```text
//! Offset | Size | Field
//! -------|------|---------------------------
//!  0     |  1   | message type ('U')
//!  1     |  2   | stock locate
//!  3     |  2   | tracking number
//!  5     |  6   | timestamp
//! 11     |  8   | original order reference (u64)
//! 19     |  8   | new order reference (u64)
//! 27     |  4   | shares (u32)
//! 31     |  4   | price (u32, fixed-point x10,000)
//! ```
//!
//! Delete Order (`D`), 19-byte payload: type, locate, tracking,
//! timestamp, order reference.
//!
//! Engine prices are integer cents, so wire prices divide by 100
//! (integer division): `engine_cents = wire_price_10000ths / 100`.

/// Message type bytes recognized by the decoder.
pub mod msg_type {
    /// Add Order (no MPID attribution).
    pub const ADD_ORDER: u8 = b'A';
    /// Replace Order.
    pub const REPLACE_ORDER: u8 = b'U';
    /// Delete Order.
    pub const DELETE_ORDER: u8 = b'D';

    /// Types the core decoder skips with a cursor advance.
    pub const SKIPPED: [u8; 6] = [b'E', b'X', b'F', b'P', b'Q', b'R'];
}

/// Payload length of an Add Order record.
pub const ADD_ORDER_LEN: usize = 36;
/// Payload length of a Replace Order record.
pub const REPLACE_ORDER_LEN: usize = 35;
/// Payload length of a Delete Order record.
pub const DELETE_ORDER_LEN: usize = 19;

/// Wire price units per engine cent.
pub const PRICE_DIVISOR: u32 = 100;

/// Frame a payload with its big-endian length prefix.
fn frame(payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + payload.len());
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out
}

fn push_symbol(payload: &mut Vec<u8>, symbol: &str) {
    let mut stock = [b' '; 8];
    let bytes = symbol.as_bytes();
    stock[..bytes.len().min(8)].copy_from_slice(&bytes[..bytes.len().min(8)]);
    payload.extend_from_slice(&stock);
}

/// Encode a framed Add Order record.
pub fn encode_add_order(
    locate: u16,
    order_ref: u64,
    side: u8,
    shares: u32,
    symbol: &str,
    price_10000ths: u32,
) -> Vec<u8> {
    let mut payload = Vec::with_capacity(ADD_ORDER_LEN);
    payload.push(msg_type::ADD_ORDER);
    payload.extend_from_slice(&locate.to_be_bytes());
    payload.extend_from_slice(&0u16.to_be_bytes());
    payload.extend_from_slice(&[0u8; 6]);
    payload.extend_from_slice(&order_ref.to_be_bytes());
    payload.push(side);
    payload.extend_from_slice(&shares.to_be_bytes());
    push_symbol(&mut payload, symbol);
    payload.extend_from_slice(&price_10000ths.to_be_bytes());
    frame(payload)
}

/// Encode a framed Replace Order record.
pub fn encode_replace_order(
    old_ref: u64,
    new_ref: u64,
    shares: u32,
    price_10000ths: u32,
) -> Vec<u8> {
    let mut payload = Vec::with_capacity(REPLACE_ORDER_LEN);
    payload.push(msg_type::REPLACE_ORDER);
    payload.extend_from_slice(&0u16.to_be_bytes());
    payload.extend_from_slice(&0u16.to_be_bytes());
    payload.extend_from_slice(&[0u8; 6]);
    payload.extend_from_slice(&old_ref.to_be_bytes());
    payload.extend_from_slice(&new_ref.to_be_bytes());
    payload.extend_from_slice(&shares.to_be_bytes());
    payload.extend_from_slice(&price_10000ths.to_be_bytes());
    frame(payload)
}

/// Encode a framed Delete Order record.
pub fn encode_delete_order(order_ref: u64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(DELETE_ORDER_LEN);
    payload.push(msg_type::DELETE_ORDER);
    payload.extend_from_slice(&0u16.to_be_bytes());
    payload.extend_from_slice(&0u16.to_be_bytes());
    payload.extend_from_slice(&[0u8; 6]);
    payload.extend_from_slice(&order_ref.to_be_bytes());
    frame(payload)
}
