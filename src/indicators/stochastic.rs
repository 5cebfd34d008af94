// =============================================================================
// Stochastic Oscillator (%K 14, %D 3)
// =============================================================================
//
//   %K = (close - lowestLow_14) / (highestHigh_14 - lowestLow_14) * 100
//   %D = simple mean of the last 3 %K values
//
// Each %K sample for %D is recomputed over the full candle prefix (a
// rolling recomputation rather than a cached series — preserved behaviour).

use crate::types::Candle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stochastic {
    pub k: f64,
    pub d: f64,
}

/// %K over the trailing `k_period` candles of `candles`.
///
/// Degenerate inputs (empty series, zero high-low range) return 50.
fn percent_k(candles: &[Candle], k_period: usize) -> f64 {
    if candles.is_empty() || k_period == 0 {
        return 50.0;
    }

    let window = if candles.len() < k_period {
        candles
    } else {
        &candles[candles.len() - k_period..]
    };

    let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = candles[candles.len() - 1].close;

    let range = highest - lowest;
    if range == 0.0 {
        return 50.0;
    }

    (close - lowest) / range * 100.0
}

/// Full stochastic reading for a candle series.
///
/// %D averages the %K of the last `d_period` prefixes of the series, so a
/// series shorter than `d_period` simply averages fewer samples.
pub fn stochastic(candles: &[Candle], k_period: usize, d_period: usize) -> Stochastic {
    let k = percent_k(candles, k_period);

    if d_period == 0 {
        return Stochastic { k, d: k };
    }

    let samples = d_period.min(candles.len()).max(1);
    let mut sum = 0.0;
    for back in 0..samples {
        sum += percent_k(&candles[..candles.len() - back], k_period);
    }

    Stochastic {
        k,
        d: sum / samples as f64,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: 0,
            open: (high + low) / 2.0,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn empty_series_is_neutral() {
        let s = stochastic(&[], 14, 3);
        assert_eq!(s.k, 50.0);
        assert_eq!(s.d, 50.0);
    }

    #[test]
    fn zero_range_is_neutral() {
        let candles = vec![candle(100.0, 100.0, 100.0); 20];
        let s = stochastic(&candles, 14, 3);
        assert_eq!(s.k, 50.0);
        assert_eq!(s.d, 50.0);
    }

    #[test]
    fn close_at_high_is_100() {
        let mut candles = vec![candle(105.0, 95.0, 100.0); 20];
        candles.push(candle(105.0, 95.0, 105.0));
        let s = stochastic(&candles, 14, 3);
        assert!((s.k - 100.0).abs() < 1e-10);
    }

    #[test]
    fn close_at_low_is_0() {
        let mut candles = vec![candle(105.0, 95.0, 100.0); 20];
        candles.push(candle(105.0, 95.0, 95.0));
        let s = stochastic(&candles, 14, 3);
        assert!(s.k.abs() < 1e-10);
    }

    #[test]
    fn midpoint_close_is_50() {
        let candles = vec![candle(110.0, 90.0, 100.0); 20];
        let s = stochastic(&candles, 14, 3);
        assert!((s.k - 50.0).abs() < 1e-10);
    }

    #[test]
    fn d_smooths_k() {
        // A sudden move: %D (3-sample mean) must lag %K.
        let mut candles = vec![candle(105.0, 95.0, 96.0); 20];
        candles.push(candle(105.0, 95.0, 104.0));
        let s = stochastic(&candles, 14, 3);
        assert!(s.k > s.d, "k {} should lead d {}", s.k, s.d);
    }

    #[test]
    fn bounds_hold() {
        let candles: Vec<Candle> = (0..40)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.9).sin() * 4.0;
                candle(base + 1.0, base - 1.0, base + (i as f64 * 0.4).cos())
            })
            .collect();
        let s = stochastic(&candles, 14, 3);
        assert!((0.0..=100.0).contains(&s.k));
        assert!((0.0..=100.0).contains(&s.d));
    }
}
