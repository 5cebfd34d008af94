// =============================================================================
// Relative Strength Index (RSI) — windowed average variant
// =============================================================================
//
// Average gain and average loss are the simple means over the last `period`
// deltas (a sliding window, deliberately NOT Wilder's running smoothing —
// the window mean is the designed behaviour of this pipeline).
//
//   RS  = avg_gain / avg_loss
//   RSI = 100 - 100 / (1 + RS)

/// RSI over the last `period` price deltas.
///
/// # Edge cases
/// - Fewer than `period + 1` closes => 50.0 (neutral default)
/// - `avg_loss == 0` (no down moves in the window) => 100.0
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }

    let window = &closes[closes.len() - period - 1..];
    let (sum_gain, sum_loss) = window.windows(2).fold((0.0_f64, 0.0_f64), |(g, l), w| {
        let delta = w[1] - w[0];
        if delta > 0.0 {
            (g + delta, l)
        } else {
            (g, l + delta.abs())
        }
    });

    let avg_gain = sum_gain / period as f64;
    let avg_loss = sum_loss / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_insufficient_data_is_neutral() {
        assert_eq!(rsi(&[], 14), 50.0);
        // 14 closes give only 13 deltas.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert_eq!(rsi(&closes, 14), 50.0);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        assert!((rsi(&closes, 14) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_all_losses_approaches_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        assert!(rsi(&closes, 14).abs() < 1e-10);
    }

    #[test]
    fn rsi_flat_market() {
        // No gains, no losses: avg_loss == 0 takes the 100 branch.
        let closes = vec![100.0; 30];
        assert!((rsi(&closes, 14) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_balanced_moves_near_50() {
        // Alternating +1/-1 deltas: equal gain and loss mass.
        let mut closes = vec![100.0];
        for i in 1..30 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let value = rsi(&closes, 14);
        assert!((value - 50.0).abs() < 1.0, "expected ~50, got {value}");
    }

    #[test]
    fn rsi_always_in_bounds() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 44.01, 43.50,
        ];
        for period in [2, 5, 14] {
            let v = rsi(&closes, period);
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_uses_window_only() {
        // A huge loss outside the window must not depress the value.
        let mut closes = vec![500.0, 100.0];
        closes.extend((1..=20).map(|i| 100.0 + i as f64));
        assert!((rsi(&closes, 14) - 100.0).abs() < 1e-10);
    }
}
