//! Streaming ITCH 5.0 decoder.
//!
//! [`ItchDecoder`] is an iterator over decode results, so events
//! emitted before an error remain valid; [`parse_bytes`] and
//! [`parse_file`] are collecting conveniences that abort on the first
//! error.

use super::messages::{
    msg_type, ADD_ORDER_LEN, DELETE_ORDER_LEN, PRICE_DIVISOR, REPLACE_ORDER_LEN,
};
use crate::core::{Price, Quantity, Side};
use serde::Serialize;
use std::path::Path;

/// An engine event decoded from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FeedEvent {
    /// Add Order: a new resting limit order.
    SubmitLimit {
        /// Venue-assigned order reference.
        order_ref: u64,
        /// Buy or sell.
        side: Side,
        /// Limit price in engine cents.
        price: Price,
        /// Shares.
        quantity: Quantity,
    },
    /// Replace Order: cancel `order_ref`, re-enter with new terms.
    Modify {
        /// Venue reference of the order being replaced.
        order_ref: u64,
        /// New limit price in engine cents.
        new_price: Price,
        /// New quantity.
        new_quantity: Quantity,
    },
    /// Delete Order.
    Cancel {
        /// Venue reference of the order being removed.
        order_ref: u64,
    },
}

impl FeedEvent {
    /// Stable lowercase tag for the event, matching the engine
    /// operation it maps to.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::SubmitLimit { .. } => "submit_limit",
            FeedEvent::Modify { .. } => "modify",
            FeedEvent::Cancel { .. } => "cancel",
        }
    }
}

/// A decoded record: the stock symbol (empty for messages that carry
/// none) and the engine event.
pub type FeedMessage = (String, FeedEvent);

/// Decoder errors. The byte offset always points at the start of the
/// offending frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended inside a length prefix or payload.
    #[error("truncated record at offset {offset}: need {needed} bytes, have {available}")]
    Truncated {
        /// Frame start offset.
        offset: usize,
        /// Bytes the frame required.
        needed: usize,
        /// Bytes remaining in the buffer.
        available: usize,
    },

    /// A message type byte the decoder does not recognize.
    #[error("unknown message type {message_type:#04x} at offset {offset}")]
    UnknownMessageType {
        /// Frame start offset.
        offset: usize,
        /// The unrecognized type byte.
        message_type: u8,
    },

    /// A recognized type with the wrong payload length.
    #[error(
        "bad payload length for type {message_type:?} at offset {offset}: expected {expected}, got {actual}"
    )]
    BadPayloadLength {
        /// Frame start offset.
        offset: usize,
        /// Message type as a char.
        message_type: char,
        /// Layout length.
        expected: usize,
        /// Framed length.
        actual: usize,
    },

    /// A side byte other than `B` or `S`.
    #[error("bad side byte {byte:#04x} at offset {offset}")]
    BadSide {
        /// Frame start offset.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// A stock field that is not ASCII.
    #[error("non-ascii symbol at offset {offset}")]
    BadSymbol {
        /// Frame start offset.
        offset: usize,
    },

    /// An empty payload (zero framed length).
    #[error("empty payload at offset {offset}")]
    EmptyPayload {
        /// Frame start offset.
        offset: usize,
    },

    /// Reading the feed file failed.
    #[error("feed io error: {0}")]
    Io(String),
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_be_bytes(buf)
}

fn read_symbol(bytes: &[u8], at: usize, frame_offset: usize) -> Result<String, DecodeError> {
    let raw = &bytes[at..at + 8];
    if !raw.is_ascii() {
        return Err(DecodeError::BadSymbol {
            offset: frame_offset,
        });
    }
    let symbol: String = raw.iter().map(|&b| b as char).collect();
    Ok(symbol.trim_end_matches(' ').to_string())
}

fn read_side(bytes: &[u8], at: usize, frame_offset: usize) -> Result<Side, DecodeError> {
    match bytes[at] {
        b'B' => Ok(Side::Buy),
        b'S' => Ok(Side::Sell),
        byte => Err(DecodeError::BadSide {
            offset: frame_offset,
            byte,
        }),
    }
}

#[inline]
fn wire_price_to_cents(price_10000ths: u32) -> Price {
    Price((price_10000ths / PRICE_DIVISOR) as i64)
}

/// Iterator over the records of a length-prefixed ITCH byte stream.
///
/// Yields `Ok` for each decoded `A`/`U`/`D` record, silently advances
/// over the recognized-but-ignored types, and yields one `Err` (then
/// fuses) on malformed input.
#[derive(Debug)]
pub struct ItchDecoder<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> ItchDecoder<'a> {
    /// Decode from a byte buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            failed: false,
        }
    }

    /// Current cursor position in bytes.
    pub fn position(&self) -> usize {
        self.offset
    }

    fn decode_payload(
        &self,
        frame_offset: usize,
        payload: &[u8],
    ) -> Result<Option<FeedMessage>, DecodeError> {
        let check_len = |expected: usize| -> Result<(), DecodeError> {
            if payload.len() != expected {
                Err(DecodeError::BadPayloadLength {
                    offset: frame_offset,
                    message_type: payload[0] as char,
                    expected,
                    actual: payload.len(),
                })
            } else {
                Ok(())
            }
        };

        match payload[0] {
            msg_type::ADD_ORDER => {
                check_len(ADD_ORDER_LEN)?;
                let order_ref = read_u64(payload, 11);
                let side = read_side(payload, 19, frame_offset)?;
                let quantity = read_u32(payload, 20) as Quantity;
                let symbol = read_symbol(payload, 24, frame_offset)?;
                let price = wire_price_to_cents(read_u32(payload, 32));
                Ok(Some((
                    symbol,
                    FeedEvent::SubmitLimit {
                        order_ref,
                        side,
                        price,
                        quantity,
                    },
                )))
            }
            msg_type::REPLACE_ORDER => {
                check_len(REPLACE_ORDER_LEN)?;
                let order_ref = read_u64(payload, 11);
                let new_quantity = read_u32(payload, 27) as Quantity;
                let new_price = wire_price_to_cents(read_u32(payload, 31));
                Ok(Some((
                    String::new(),
                    FeedEvent::Modify {
                        order_ref,
                        new_price,
                        new_quantity,
                    },
                )))
            }
            msg_type::DELETE_ORDER => {
                check_len(DELETE_ORDER_LEN)?;
                let order_ref = read_u64(payload, 11);
                Ok(Some((String::new(), FeedEvent::Cancel { order_ref })))
            }
            t if msg_type::SKIPPED.contains(&t) => Ok(None),
            t => Err(DecodeError::UnknownMessageType {
                offset: frame_offset,
                message_type: t,
            }),
        }
    }
}

impl Iterator for ItchDecoder<'_> {
    type Item = Result<FeedMessage, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed || self.offset >= self.data.len() {
                return None;
            }
            let frame_offset = self.offset;
            let remaining = self.data.len() - frame_offset;
            if remaining < 2 {
                self.failed = true;
                return Some(Err(DecodeError::Truncated {
                    offset: frame_offset,
                    needed: 2,
                    available: remaining,
                }));
            }
            let length = read_u16(self.data, frame_offset) as usize;
            if length == 0 {
                self.failed = true;
                return Some(Err(DecodeError::EmptyPayload {
                    offset: frame_offset,
                }));
            }
            if remaining < 2 + length {
                self.failed = true;
                return Some(Err(DecodeError::Truncated {
                    offset: frame_offset,
                    needed: 2 + length,
                    available: remaining,
                }));
            }
            let payload = &self.data[frame_offset + 2..frame_offset + 2 + length];
            self.offset = frame_offset + 2 + length;
            match self.decode_payload(frame_offset, payload) {
                Ok(Some(message)) => return Some(Ok(message)),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Decode a whole buffer, preserving feed order. Aborts on the first
/// malformed record.
pub fn parse_bytes(data: &[u8]) -> Result<Vec<FeedMessage>, DecodeError> {
    ItchDecoder::new(data).collect()
}

/// Decode an ITCH file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<FeedMessage>, DecodeError> {
    let data = std::fs::read(path).map_err(|e| DecodeError::Io(e.to_string()))?;
    parse_bytes(&data)
}
