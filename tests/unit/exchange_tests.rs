//! End-to-end exchange scenarios, including the literal contract
//! cases for fills, IOC residuals and FOK rejections.

use nanobook::prelude::*;

#[test]
fn test_submit_limit_no_match() {
    let ex = Exchange::new();
    let result = ex
        .submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    assert_eq!(result.order_id, OrderId(1));
    assert_eq!(result.status, OrderStatus::New);
    assert_eq!(result.filled_quantity, 0);
    assert_eq!(result.resting_quantity, 100);
    assert!(result.trades.is_empty());
}

#[test]
fn test_limit_full_fill() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Sell, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    let result = ex
        .submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    assert_eq!(result.status, OrderStatus::Filled);
    assert_eq!(result.filled_quantity, 100);
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].price, Price(10000));
    assert_eq!(result.trades[0].quantity, 100);
}

#[test]
fn test_ioc_residual_cancel() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Sell, Price(10000), 30, TimeInForce::Gtc)
        .unwrap();
    let result = ex
        .submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Ioc)
        .unwrap();
    assert_eq!(result.filled_quantity, 30);
    assert_eq!(result.cancelled_quantity, 70);
    assert_eq!(result.resting_quantity, 0);
}

#[test]
fn test_fok_reject() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Sell, Price(10000), 50, TimeInForce::Gtc)
        .unwrap();
    let result = ex
        .submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Fok)
        .unwrap();
    assert_eq!(result.filled_quantity, 0);
    assert_eq!(result.cancelled_quantity, 100);
    assert!(result.trades.is_empty());
}

#[test]
fn test_submit_market_fill() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Sell, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    let result = ex.submit_market(Side::Buy, 100).unwrap();
    assert_eq!(result.filled_quantity, 100);
    assert_eq!(result.status, OrderStatus::Filled);
}

#[test]
fn test_cancel_resting_order() {
    let ex = Exchange::new();
    let submit = ex
        .submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    let result = ex.cancel(submit.order_id);
    assert!(result.success);
    assert_eq!(result.cancelled_quantity, 100);
}

#[test]
fn test_cancel_nonexistent() {
    let ex = Exchange::new();
    let result = ex.cancel(OrderId(999));
    assert!(!result.success);
    assert!(result.error.is_some());
}

#[test]
fn test_modify_reissues_order() {
    let ex = Exchange::new();
    let submit = ex
        .submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    let result = ex.modify(submit.order_id, Price(9900), 150).unwrap();
    assert!(result.success);
    assert!(result.new_order_id.is_some());
    assert_eq!(result.cancelled_quantity, 100);
    let (bid, _) = ex.best_bid_ask();
    assert_eq!(bid, Some(Price(9900)));
}

#[test]
fn test_best_bid_ask_and_spread() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    ex.submit_limit(Side::Sell, Price(10100), 100, TimeInForce::Gtc)
        .unwrap();
    assert_eq!(ex.best_bid_ask(), (Some(Price(10000)), Some(Price(10100))));
    assert_eq!(ex.spread(), Some(Price(100)));
}

#[test]
fn test_depth_levels() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    ex.submit_limit(Side::Buy, Price(9900), 200, TimeInForce::Gtc)
        .unwrap();
    ex.submit_limit(Side::Sell, Price(10100), 150, TimeInForce::Gtc)
        .unwrap();
    let snap = ex.depth(10);
    assert_eq!(snap.bids.len(), 2);
    assert_eq!(snap.asks.len(), 1);
    assert_eq!(snap.best_bid(), Some(Price(10000)));
}

#[test]
fn test_trades_log_and_clear() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Sell, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    ex.submit_limit(Side::Buy, Price(10000), 100, TimeInForce::Gtc)
        .unwrap();
    let trades = ex.trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].quantity, 100);
    ex.clear_trades();
    assert!(ex.trades().is_empty());
}

#[test]
fn test_stop_market_pending() {
    let ex = Exchange::new();
    let result = ex.submit_stop_market(Side::Buy, Price(10500), 100).unwrap();
    assert_eq!(result.status, OrderStatus::Pending);
    assert_eq!(ex.pending_stop_count(), 1);
}

#[test]
fn test_cancel_pending_stop() {
    let ex = Exchange::new();
    let stop = ex.submit_stop_market(Side::Buy, Price(10500), 100).unwrap();
    let result = ex.cancel(stop.order_id);
    assert!(result.success);
    assert_eq!(ex.pending_stop_count(), 0);
}

#[test]
fn test_trailing_stop_anchors_accepted() {
    let ex = Exchange::new();
    let fixed = ex
        .submit_trailing_stop_market(Side::Sell, Price(9500), 100, TrailAnchor::Fixed, 200.0, None)
        .unwrap();
    assert_eq!(fixed.status, OrderStatus::Pending);
    let pct = ex
        .submit_trailing_stop_market(
            Side::Sell,
            Price(9500),
            100,
            TrailAnchor::Percentage,
            0.05,
            None,
        )
        .unwrap();
    assert_eq!(pct.status, OrderStatus::Pending);
    let atr = ex
        .submit_trailing_stop_market(Side::Sell, Price(9500), 100, TrailAnchor::Atr, 2.0, Some(14))
        .unwrap();
    assert_eq!(atr.status, OrderStatus::Pending);
    assert_eq!(ex.pending_stop_count(), 3);
}

#[test]
fn test_trailing_stop_atr_requires_period() {
    let ex = Exchange::new();
    assert!(ex
        .submit_trailing_stop_market(Side::Sell, Price(9500), 100, TrailAnchor::Atr, 2.0, None)
        .is_err());
}

#[test]
fn test_invalid_side_token() {
    let err = "invalid".parse::<Side>().unwrap_err();
    assert_eq!(err.kind, "side");
    assert_eq!(err.token, "invalid");
}

#[test]
fn test_invalid_tif_token() {
    assert!("invalid".parse::<TimeInForce>().is_err());
}

#[test]
fn test_token_round_trips() {
    for side in [Side::Buy, Side::Sell] {
        assert_eq!(side.to_string().parse::<Side>().unwrap(), side);
    }
    for tif in [TimeInForce::Gtc, TimeInForce::Ioc, TimeInForce::Fok] {
        assert_eq!(tif.to_string().parse::<TimeInForce>().unwrap(), tif);
    }
    for anchor in [TrailAnchor::Fixed, TrailAnchor::Percentage, TrailAnchor::Atr] {
        assert_eq!(anchor.to_string().parse::<TrailAnchor>().unwrap(), anchor);
    }
}

#[test]
fn test_order_ids_monotonic() {
    let ex = Exchange::new();
    let a = ex
        .submit_limit(Side::Buy, Price(9000), 10, TimeInForce::Gtc)
        .unwrap();
    let b = ex
        .submit_limit(Side::Buy, Price(9100), 10, TimeInForce::Gtc)
        .unwrap();
    let stop = ex.submit_stop_market(Side::Sell, Price(8000), 10).unwrap();
    assert!(a.order_id < b.order_id);
    assert!(b.order_id < stop.order_id);
}

#[test]
fn test_trade_price_display_in_major_units() {
    let ex = Exchange::new();
    ex.submit_limit(Side::Sell, Price(10050), 100, TimeInForce::Gtc)
        .unwrap();
    ex.submit_limit(Side::Buy, Price(10050), 100, TimeInForce::Gtc)
        .unwrap();
    let trade = ex.trades()[0];
    assert_eq!(trade.price.to_major(), 100.50);
    assert!(trade.to_string().contains("Trade"));
}
