//! Technical indicators with TA-Lib-compatible lookbacks and smoothing.
//!
//! Every function returns a series the same length as its input, with
//! the reference implementation's leading-NaN lookback.

/// Relative Strength Index with Wilder smoothing.
///
/// The first average is a simple mean over the first `period` changes;
/// subsequent averages use `avg = (prev * (period - 1) + current) /
/// period`. Outputs `[0, 100]`; the first `period` slots are NaN. A
/// zero loss average maps to 100.
pub fn rsi(close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n <= period {
        return out;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = close[i] - close[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }
    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in period + 1..n {
        let change = close[i] - close[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// EMA seeded with the SMA of the first `period` samples, NaN before.
fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = seed;
    let alpha = 2.0 / (period as f64 + 1.0);
    for i in period..n {
        out[i] = (values[i] - out[i - 1]) * alpha + out[i - 1];
    }
    out
}

/// MACD line, signal line and histogram.
///
/// Line = EMA(fast) - EMA(slow); signal = EMA(signal_period) of the
/// line; histogram = line - signal. All three share TA-Lib's lookback
/// of `(slow - 1) + (signal_period - 1)` leading NaNs.
pub fn macd(
    close: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = close.len();
    let nan = vec![f64::NAN; n];
    if fast == 0 || slow == 0 || signal_period == 0 || fast > slow || n < slow {
        return (nan.clone(), nan.clone(), nan);
    }

    let ema_fast = ema(close, fast);
    let ema_slow = ema(close, slow);
    let mut line: Vec<f64> = (0..n).map(|i| ema_fast[i] - ema_slow[i]).collect();

    // Signal EMA runs over the line values defined from slow-1 onward.
    let defined: Vec<f64> = line[slow - 1..].to_vec();
    let signal_defined = ema(&defined, signal_period);
    let mut signal = vec![f64::NAN; n];
    for (k, v) in signal_defined.into_iter().enumerate() {
        signal[slow - 1 + k] = v;
    }

    let lookback = (slow - 1) + (signal_period - 1);
    for slot in line.iter_mut().take(lookback.min(n)) {
        *slot = f64::NAN;
    }
    let histogram: Vec<f64> = (0..n).map(|i| line[i] - signal[i]).collect();
    (line, signal, histogram)
}

/// Bollinger Bands: SMA middle band with population-stddev envelopes.
pub fn bbands(
    close: &[f64],
    period: usize,
    nbdev_up: f64,
    nbdev_down: f64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = close.len();
    let mut upper = vec![f64::NAN; n];
    let mut middle = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    if period == 0 || n < period {
        return (upper, middle, lower);
    }
    for i in period - 1..n {
        let window = &close[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / period as f64;
        let sd = var.sqrt();
        middle[i] = mean;
        upper[i] = mean + nbdev_up * sd;
        lower[i] = mean - nbdev_down * sd;
    }
    (upper, middle, lower)
}

/// Wilder-smoothed Average True Range.
///
/// `TR[t] = max(high - low, |high - prev_close|, |low - prev_close|)`;
/// the first ATR is the simple mean of the first `period` true ranges.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len().min(high.len()).min(low.len());
    let mut out = vec![f64::NAN; n];
    if period == 0 || n <= period {
        return out;
    }

    let true_range = |i: usize| -> f64 {
        let hl = high[i] - low[i];
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        hl.max(hc).max(lc)
    };

    let mut sum = 0.0;
    for i in 1..=period {
        sum += true_range(i);
    }
    let mut value = sum / period as f64;
    out[period] = value;
    for i in period + 1..n {
        value = (value * (period as f64 - 1.0) + true_range(i)) / period as f64;
        out[i] = value;
    }
    out
}
