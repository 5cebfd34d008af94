// =============================================================================
// Simple & Exponential Moving Averages
// =============================================================================
//
// SMA: plain mean of the last `period` closes.
//
// EMA formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The first EMA value is seeded with the SMA of the first `period` closes
// and the recurrence is then applied forward over the remaining samples.

/// Mean of the last `period` closes.
///
/// # Edge cases
/// - Empty input => 0.0
/// - Fewer than `period` closes => the most recent close (degenerate
///   fallback, not an error)
pub fn sma(closes: &[f64], period: usize) -> f64 {
    match closes.last() {
        None => 0.0,
        Some(&last) if period == 0 || closes.len() < period => last,
        Some(_) => {
            let window = &closes[closes.len() - period..];
            window.iter().sum::<f64>() / period as f64
        }
    }
}

/// Exponential moving average of `closes` over `period`, returning the most
/// recent value.
///
/// Seeded with the SMA of the first `period` closes, then the recurrence is
/// applied to every subsequent close. Same short-input fallback as [`sma`].
pub fn ema(closes: &[f64], period: usize) -> f64 {
    match closes.last() {
        None => 0.0,
        Some(&last) if period == 0 || closes.len() < period => last,
        Some(_) => {
            let multiplier = 2.0 / (period + 1) as f64;
            let seed: f64 = closes[..period].iter().sum::<f64>() / period as f64;

            let mut value = seed;
            for &close in &closes[period..] {
                value = close * multiplier + value * (1.0 - multiplier);
            }
            value
        }
    }
}
