//! Parallel sweep executor contracts: ordering, failure isolation and
//! determinism.

use nanobook::prelude::*;

fn rising_prices() -> Vec<Vec<(String, Price)>> {
    vec![
        vec![("AAPL".to_string(), Price(15_000))],
        vec![("AAPL".to_string(), Price(15_500))],
        vec![("AAPL".to_string(), Price(16_000))],
    ]
}

fn multi_stock_prices() -> Vec<Vec<(String, Price)>> {
    vec![
        vec![("AAPL".to_string(), Price(15_000)), ("MSFT".to_string(), Price(30_000))],
        vec![("AAPL".to_string(), Price(15_500)), ("MSFT".to_string(), Price(31_000))],
        vec![("AAPL".to_string(), Price(16_000)), ("MSFT".to_string(), Price(32_000))],
    ]
}

#[test]
fn test_sweep_basic() {
    let results = sweep_equal_weight(5, &rising_prices(), 100_000_000, 12.0, 0.0);
    assert_eq!(results.len(), 5);
    for metrics in &results {
        let metrics = metrics.expect("slot should succeed");
        assert!(metrics.total_return > 0.0);
    }
}

#[test]
fn test_sweep_empty() {
    let results = sweep_equal_weight(0, &rising_prices(), 100_000_000, 12.0, 0.0);
    assert!(results.is_empty());
}

#[test]
fn test_sweep_multi_stock() {
    let results = sweep_equal_weight(10, &multi_stock_prices(), 100_000_000, 12.0, 0.0);
    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|r| r.is_some()));
}

#[test]
fn test_sweep_output_order_matches_param_order() {
    // Cost grows with the parameter index, so total return must be
    // non-increasing across the result vector regardless of which
    // worker finished first.
    let results = sweep_equal_weight(12, &rising_prices(), 100_000_000, 12.0, 0.0);
    let totals: Vec<f64> = results.iter().map(|m| m.unwrap().total_return).collect();
    for pair in totals.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[test]
fn test_sweep_bit_identical_across_runs() {
    let a = sweep_equal_weight(6, &multi_stock_prices(), 100_000_000, 12.0, 0.0);
    let b = sweep_equal_weight(6, &multi_stock_prices(), 100_000_000, 12.0, 0.0);
    for (x, y) in a.iter().zip(&b) {
        let (x, y) = (x.unwrap(), y.unwrap());
        assert_eq!(x.total_return.to_bits(), y.total_return.to_bits());
        assert_eq!(x.sharpe.to_bits(), y.sharpe.to_bits());
        assert_eq!(x.max_drawdown.to_bits(), y.max_drawdown.to_bits());
    }
}

#[test]
fn test_sweep_invalid_input_yields_none_slots() {
    let results = sweep_equal_weight(4, &[], 100_000_000, 12.0, 0.0);
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.is_none()));
}
