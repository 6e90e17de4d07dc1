//! Backtester scenarios: payload shape, stop exits, lifecycle rules
//! and cost accounting.

use nanobook::prelude::*;

fn single_symbol_schedule(
    symbol: &str,
    prices: &[i64],
) -> (Vec<Vec<(String, f64)>>, Vec<Vec<(String, Price)>>) {
    let weights = prices
        .iter()
        .map(|_| vec![(symbol.to_string(), 1.0)])
        .collect();
    let price_schedule = prices
        .iter()
        .map(|&p| vec![(symbol.to_string(), Price(p))])
        .collect();
    (weights, price_schedule)
}

#[test]
fn test_report_payload_shape() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 10_200]);
    let report = run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None).unwrap();
    assert_eq!(report.equity_curve.len(), 2);
    assert_eq!(report.returns.len(), 2);
    assert_eq!(report.holdings.len(), 2);
    assert_eq!(report.symbol_returns.len(), 2);
    assert!(report.stop_events.is_empty());
}

#[test]
fn test_full_weight_tracks_price() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 10_200]);
    let report = run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None).unwrap();
    assert!((report.returns[0] - 0.0).abs() < 1e-12);
    assert!((report.returns[1] - 0.02).abs() < 1e-12);
    assert!((report.equity_curve[1] - 10_200_000.0).abs() < 1e-6);
    // 1000 shares at 100.00
    assert_eq!(report.holdings[0].len(), 1);
    assert!((report.holdings[0][0].1 - 1000.0).abs() < 1e-9);
    assert!((report.symbol_returns[1][0].1 - 0.02).abs() < 1e-12);
}

#[test]
fn test_fixed_stop_fires() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 8_500]);
    let cfg = StopConfig {
        fixed_stop_pct: Some(0.10),
        ..Default::default()
    };
    let report =
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, Some(&cfg)).unwrap();

    assert_eq!(report.stop_events.len(), 1);
    let event = &report.stop_events[0];
    assert_eq!(event.symbol, "AAPL");
    assert_eq!(event.reason, StopReason::Fixed);
    assert_eq!(event.trigger_price, Price(9_000));
    assert_eq!(event.exit_price, Price(8_500));
    assert_eq!(event.period_index, 1);
    assert!(report.holdings[1].is_empty());
    assert!((report.equity_curve[1] - 8_500_000.0).abs() < 1e-6);
}

#[test]
fn test_stop_fires_once_per_lifecycle() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 9_000, 8_900]);
    let cfg = StopConfig {
        fixed_stop_pct: Some(0.10),
        ..Default::default()
    };
    let report =
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, Some(&cfg)).unwrap();

    assert_eq!(report.stop_events.len(), 1);
    assert_eq!(report.stop_events[0].period_index, 1);
    assert_eq!(report.stop_events[0].reason, StopReason::Fixed);
    // The rebalance at period 2 re-opens a fresh lifecycle.
    assert_eq!(report.holdings[2].len(), 1);
}

#[test]
fn test_tightest_stop_wins() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 11_000, 10_300]);
    let cfg = StopConfig {
        fixed_stop_pct: Some(0.10),
        trailing_stop_pct: Some(0.05),
        ..Default::default()
    };
    let report =
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, Some(&cfg)).unwrap();

    assert_eq!(report.stop_events.len(), 1);
    let event = &report.stop_events[0];
    assert_eq!(event.reason, StopReason::Trailing);
    assert_eq!(event.trigger_price, Price(10_450));
    assert_eq!(event.exit_price, Price(10_300));
}

#[test]
fn test_atr_stop_fires_after_lookback() {
    // Mild wiggles establish a small ATR, then a hard break fires it.
    let closes = [10_000, 10_050, 9_990, 10_040, 9_300];
    let (weights, prices) = single_symbol_schedule("AAPL", &closes);
    let cfg = StopConfig {
        atr_stop: Some(AtrStopConfig {
            multiplier: 2.0,
            period: 3,
        }),
        ..Default::default()
    };
    let report =
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, Some(&cfg)).unwrap();
    assert_eq!(report.stop_events.len(), 1);
    let event = &report.stop_events[0];
    assert_eq!(event.reason, StopReason::Atr);
    assert_eq!(event.period_index, 4);
    assert_eq!(event.exit_price, Price(9_300));
}

#[test]
fn test_stopped_symbol_sits_out_one_period() {
    let weights = vec![
        vec![("AAPL".to_string(), 0.5), ("MSFT".to_string(), 0.5)],
        vec![("AAPL".to_string(), 0.5), ("MSFT".to_string(), 0.5)],
    ];
    let prices = vec![
        vec![("AAPL".to_string(), Price(10_000)), ("MSFT".to_string(), Price(20_000))],
        vec![("AAPL".to_string(), Price(8_000)), ("MSFT".to_string(), Price(20_200))],
    ];
    let cfg = StopConfig {
        fixed_stop_pct: Some(0.10),
        ..Default::default()
    };
    let report =
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, Some(&cfg)).unwrap();
    assert_eq!(report.stop_events.len(), 1);
    assert_eq!(report.stop_events[0].symbol, "AAPL");
    // Only MSFT remains held after the stop.
    let held: Vec<&str> = report.holdings[1].iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(held, vec!["MSFT"]);
}

#[test]
fn test_cost_bps_reduces_equity() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 10_000]);
    let free = run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None).unwrap();
    let costly = run_backtest(&weights, &prices, 10_000_000, 10.0, 252.0, 0.0, None).unwrap();
    // 10 bps on the opening 10,000,000 notional = 10,000 cents.
    assert!((free.equity_curve[0] - 10_000_000.0).abs() < 1e-6);
    assert!((costly.equity_curve[0] - 9_990_000.0).abs() < 1e-6);
    assert!(costly.equity_curve[1] < free.equity_curve[1]);
}

#[test]
fn test_partial_weight_keeps_cash() {
    let (mut weights, prices) = single_symbol_schedule("AAPL", &[10_000, 5_000]);
    for period in weights.iter_mut() {
        period[0].1 = 0.5;
    }
    let report = run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None).unwrap();
    // Half the book rides the crash: -25%, not -50%.
    assert!((report.returns[1] - (-0.25)).abs() < 1e-12);
}

#[test]
fn test_dropped_symbol_is_closed() {
    let weights = vec![
        vec![("AAPL".to_string(), 1.0)],
        vec![],
        vec![("AAPL".to_string(), 1.0)],
    ];
    let prices = vec![
        vec![("AAPL".to_string(), Price(10_000))],
        vec![("AAPL".to_string(), Price(10_500))],
        vec![("AAPL".to_string(), Price(10_500))],
    ];
    let report = run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None).unwrap();
    assert!(report.holdings[1].is_empty());
    assert_eq!(report.holdings[2].len(), 1);
    assert!((report.equity_curve[1] - 10_500_000.0).abs() < 1e-6);
}

#[test]
fn test_metrics_attached() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 10_200, 10_400]);
    let report = run_backtest(&weights, &prices, 10_000_000, 0.0, 12.0, 0.0, None).unwrap();
    assert!(report.metrics.total_return > 0.0);
    assert_eq!(report.metrics.win_rate, 1.0);
}

#[test]
fn test_schedule_length_mismatch() {
    let (weights, mut prices) = single_symbol_schedule("AAPL", &[10_000, 10_200]);
    prices.pop();
    assert!(matches!(
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None),
        Err(BacktestError::ScheduleLengthMismatch { .. })
    ));
}

#[test]
fn test_empty_schedule_rejected() {
    assert!(matches!(
        run_backtest(&[], &[], 10_000_000, 0.0, 252.0, 0.0, None),
        Err(BacktestError::EmptySchedule)
    ));
}

#[test]
fn test_missing_price_rejected() {
    let weights = vec![vec![("AAPL".to_string(), 1.0)]];
    let prices = vec![vec![("MSFT".to_string(), Price(10_000))]];
    assert!(matches!(
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None),
        Err(BacktestError::MissingPrice { .. })
    ));
}

#[test]
fn test_negative_weight_rejected() {
    let weights = vec![vec![("AAPL".to_string(), -0.5)]];
    let prices = vec![vec![("AAPL".to_string(), Price(10_000))]];
    assert!(matches!(
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, None),
        Err(BacktestError::InvalidWeight { .. })
    ));
}

#[test]
fn test_invalid_stop_pct_rejected() {
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000]);
    let cfg = StopConfig {
        fixed_stop_pct: Some(1.5),
        ..Default::default()
    };
    assert!(matches!(
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, Some(&cfg)),
        Err(BacktestError::InvalidStopConfig(_))
    ));
}

#[test]
fn test_stop_config_json_unknown_keys() {
    let cfg: StopConfig = serde_json::from_str(
        r#"{"fixed_stop_pct": 0.1, "rebalance_band": 0.02}"#,
    )
    .unwrap();
    let (weights, prices) = single_symbol_schedule("AAPL", &[10_000, 8_500]);
    let report =
        run_backtest(&weights, &prices, 10_000_000, 0.0, 252.0, 0.0, Some(&cfg)).unwrap();
    assert_eq!(report.stop_events.len(), 1);
}
