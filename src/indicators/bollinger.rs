// =============================================================================
// Bollinger Bands (period 20, k = 2)
// =============================================================================
//
//   middle = SMA(20)
//   upper  = middle + k * stddev(last 20 closes)
//   lower  = middle - k * stddev(last 20 closes)
//
// Percent-B locates the price within the bands; a breakout is any close
// outside them.

use super::ema::sma;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (price - lower) / (upper - lower); 0.5 when the bands have no width.
    pub percent_b: f64,
    /// Price closed outside [lower, upper].
    pub breakout: bool,
}

/// Compute Bollinger Bands over the last `period` closes.
///
/// Short input degenerates gracefully: the middle falls back to the last
/// close (SMA fallback) and the deviation is taken over whatever samples
/// exist, so the bands collapse toward the price instead of erroring.
pub fn bollinger(closes: &[f64], period: usize, k: f64) -> BollingerBands {
    let price = closes.last().copied().unwrap_or(0.0);
    let middle = sma(closes, period);

    let window = if closes.len() < period {
        closes
    } else {
        &closes[closes.len() - period..]
    };

    let stddev = if window.is_empty() {
        0.0
    } else {
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let variance =
            window.iter().map(|c| (c - mean) * (c - mean)).sum::<f64>() / window.len() as f64;
        variance.sqrt()
    };

    let upper = middle + k * stddev;
    let lower = middle - k * stddev;

    let width = upper - lower;
    let percent_b = if width == 0.0 {
        0.5
    } else {
        (price - lower) / width
    };

    BollingerBands {
        upper,
        middle,
        lower,
        percent_b,
        breakout: price > upper || price < lower,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_flat_series_collapse() {
        let closes = vec![100.0; 30];
        let bb = bollinger(&closes, 20, 2.0);
        assert!((bb.upper - 100.0).abs() < 1e-12);
        assert!((bb.lower - 100.0).abs() < 1e-12);
        assert!((bb.percent_b - 0.5).abs() < 1e-12);
        assert!(!bb.breakout);
    }

    #[test]
    fn bands_bracket_the_mean() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0).collect();
        let bb = bollinger(&closes, 20, 2.0);
        assert!(bb.upper > bb.middle);
        assert!(bb.middle > bb.lower);
    }

    #[test]
    fn breakout_above_upper() {
        let mut closes = vec![100.0; 25];
        // Inject mild noise so the bands have width, then spike.
        for (i, c) in closes.iter_mut().enumerate() {
            *c += (i % 2) as f64 * 0.2;
        }
        closes.push(105.0);
        let bb = bollinger(&closes, 20, 2.0);
        assert!(bb.breakout);
        assert!(bb.percent_b > 1.0);
    }

    #[test]
    fn breakout_below_lower() {
        let mut closes: Vec<f64> = (0..25).map(|i| 100.0 + (i % 2) as f64 * 0.2).collect();
        closes.push(95.0);
        let bb = bollinger(&closes, 20, 2.0);
        assert!(bb.breakout);
        assert!(bb.percent_b < 0.0);
    }

    #[test]
    fn short_input_does_not_panic() {
        let bb = bollinger(&[1.10, 1.11], 20, 2.0);
        assert!(bb.middle > 0.0);
        assert!(bb.upper >= bb.lower);
    }

    #[test]
    fn empty_input_is_inert() {
        let bb = bollinger(&[], 20, 2.0);
        assert_eq!(bb.middle, 0.0);
        assert!(!bb.breakout);
    }
}
