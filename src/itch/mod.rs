//! ITCH 5.0 binary feed decoding.

mod decoder;
pub mod messages;

pub use decoder::{parse_bytes, parse_file, DecodeError, FeedEvent, FeedMessage, ItchDecoder};
pub use messages::{encode_add_order, encode_delete_order, encode_replace_order};
