//! ITCH 5.0 decoder tests against hand-framed wire bytes.

use nanobook::itch::{
    encode_add_order, encode_delete_order, encode_replace_order, parse_bytes, parse_file,
    DecodeError, FeedEvent, ItchDecoder,
};
use nanobook::{Price, Side};
use std::io::Write;

/// A canonical Add Order frame: locate 1, ref 1, side 'B', 100 shares
/// of "AAPL", wire price 1,000,000 (= $100.0000).
fn reference_add_frame() -> Vec<u8> {
    encode_add_order(1, 1, b'B', 100, "AAPL", 1_000_000)
}

#[test]
fn test_parse_add_order() {
    let events = parse_bytes(&reference_add_frame()).unwrap();
    assert_eq!(events.len(), 1);
    let (symbol, event) = &events[0];
    assert_eq!(symbol, "AAPL");
    assert_eq!(event.kind(), "submit_limit");
    assert_eq!(
        *event,
        FeedEvent::SubmitLimit {
            order_ref: 1,
            side: Side::Buy,
            // 1,000,000 ten-thousandths -> 10,000 cents ($100.00)
            price: Price(10000),
            quantity: 100,
        }
    );
}

#[test]
fn test_parse_replace_order() {
    let bytes = encode_replace_order(1, 2, 50, 1_010_000);
    let events = parse_bytes(&bytes).unwrap();
    assert_eq!(events.len(), 1);
    let (_, event) = &events[0];
    assert_eq!(event.kind(), "modify");
    assert_eq!(
        *event,
        FeedEvent::Modify {
            order_ref: 1,
            new_price: Price(10100),
            new_quantity: 50,
        }
    );
}

#[test]
fn test_parse_delete_order() {
    let bytes = encode_delete_order(7);
    let events = parse_bytes(&bytes).unwrap();
    assert_eq!(events[0].1, FeedEvent::Cancel { order_ref: 7 });
}

#[test]
fn test_round_trip_add_order() {
    let bytes = encode_add_order(2, 42, b'S', 500, "MSFT", 2_345_600);
    let events = parse_bytes(&bytes).unwrap();
    assert_eq!(
        events[0],
        (
            "MSFT".to_string(),
            FeedEvent::SubmitLimit {
                order_ref: 42,
                side: Side::Sell,
                price: Price(23456),
                quantity: 500,
            }
        )
    );
}

#[test]
fn test_symbol_right_trim() {
    let bytes = encode_add_order(1, 1, b'B', 1, "AB", 10_000);
    let events = parse_bytes(&bytes).unwrap();
    assert_eq!(events[0].0, "AB");
}

#[test]
fn test_multiple_records_preserve_feed_order() {
    let mut bytes = encode_add_order(1, 1, b'B', 100, "AAPL", 1_000_000);
    bytes.extend(encode_replace_order(1, 2, 50, 1_010_000));
    bytes.extend(encode_delete_order(2));
    let events = parse_bytes(&bytes).unwrap();
    let kinds: Vec<&str> = events.iter().map(|(_, e)| e.kind()).collect();
    assert_eq!(kinds, vec!["submit_limit", "modify", "cancel"]);
}

#[test]
fn test_skipped_types_advance_cursor() {
    // A System Event-style record of an ignored type ('P' trade),
    // framed with an arbitrary payload, then a real Add Order.
    let mut bytes = Vec::new();
    let skipped_payload = [b'P', 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3];
    bytes.extend_from_slice(&(skipped_payload.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&skipped_payload);
    bytes.extend(reference_add_frame());

    let events = parse_bytes(&bytes).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "AAPL");
}

#[test]
fn test_unknown_type_errors_with_offset() {
    let mut bytes = reference_add_frame();
    let bad_offset = bytes.len();
    bytes.extend_from_slice(&3u16.to_be_bytes());
    bytes.extend_from_slice(&[b'Z', 0, 0]);

    let err = parse_bytes(&bytes).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnknownMessageType {
            offset: bad_offset,
            message_type: b'Z',
        }
    );
}

#[test]
fn test_truncated_payload_errors() {
    let mut bytes = reference_add_frame();
    bytes.truncate(bytes.len() - 4);
    let err = parse_bytes(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { offset: 0, .. }));
}

#[test]
fn test_bad_side_byte_errors() {
    let bytes = encode_add_order(1, 1, b'X', 100, "AAPL", 1_000_000);
    let err = parse_bytes(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::BadSide { byte: b'X', .. }));
}

#[test]
fn test_events_before_error_remain_valid() {
    let mut bytes = reference_add_frame();
    bytes.extend(encode_add_order(1, 2, b'S', 10, "MSFT", 500_000));
    bytes.extend_from_slice(&2u16.to_be_bytes());
    bytes.extend_from_slice(&[b'Z', 0]);

    let mut decoder = ItchDecoder::new(&bytes);
    let first = decoder.next().unwrap().unwrap();
    assert_eq!(first.0, "AAPL");
    let second = decoder.next().unwrap().unwrap();
    assert_eq!(second.0, "MSFT");
    assert!(decoder.next().unwrap().is_err());
    // The iterator fuses after an error.
    assert!(decoder.next().is_none());
}

#[test]
fn test_parse_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&reference_add_frame()).unwrap();
    file.flush().unwrap();
    let events = parse_file(file.path()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "AAPL");
}

#[test]
fn test_missing_file_is_io_error() {
    let err = parse_file("/nonexistent/feed.itch").unwrap_err();
    assert!(matches!(err, DecodeError::Io(_)));
}

#[test]
fn test_wire_price_integer_division() {
    // 1,234,567 ten-thousandths -> 12,345 cents (truncating).
    let bytes = encode_add_order(1, 1, b'B', 1, "A", 1_234_567);
    let events = parse_bytes(&bytes).unwrap();
    match events[0].1 {
        FeedEvent::SubmitLimit { price, .. } => assert_eq!(price, Price(12345)),
        ref other => panic!("unexpected event {other:?}"),
    }
}
