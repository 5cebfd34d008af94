// =============================================================================
// Moving Average Convergence/Divergence (MACD)
// =============================================================================
//
//   macd_line  = EMA12 - EMA26
//   signal     = EMA9 over the MACD-line history
//   histogram  = macd_line - signal
//
// The MACD-line history is rebuilt by recomputing EMA12/EMA26 over every
// prefix slice from index 26 onward. Quadratic, but the engine only ever
// feeds ~100 candles per pass and the rolling recomputation is the designed
// behaviour.

use super::ema::ema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Macd {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

/// Compute MACD(12, 26, 9) for `closes`.
///
/// With fewer than 27 closes the line series is empty; the signal then
/// degenerates to the MACD line itself (histogram 0), riding on the EMA
/// short-input fallbacks.
pub fn macd(closes: &[f64]) -> Macd {
    let macd_line = ema(closes, 12) - ema(closes, 26);

    let mut series = Vec::new();
    for i in 27..=closes.len() {
        let prefix = &closes[..i];
        series.push(ema(prefix, 12) - ema(prefix, 26));
    }

    let signal_line = if series.is_empty() {
        macd_line
    } else {
        ema(&series, 9)
    };

    Macd {
        macd_line,
        signal_line,
        histogram: macd_line - signal_line,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_short_input_degenerates() {
        let out = macd(&[1.0, 2.0, 3.0]);
        // EMA fallbacks both return the last close, so the line is zero and
        // the signal collapses onto it.
        assert!(out.macd_line.abs() < 1e-12);
        assert!(out.histogram.abs() < 1e-12);
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let closes = vec![100.0; 60];
        let out = macd(&closes);
        assert!(out.macd_line.abs() < 1e-9);
        assert!(out.signal_line.abs() < 1e-9);
        assert!(out.histogram.abs() < 1e-9);
    }

    #[test]
    fn macd_uptrend_is_positive() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let out = macd(&closes);
        assert!(out.macd_line > 0.0, "line {} should be positive", out.macd_line);
    }

    #[test]
    fn macd_downtrend_is_negative() {
        let closes: Vec<f64> = (1..=60).rev().map(|x| x as f64).collect();
        let out = macd(&closes);
        assert!(out.macd_line < 0.0);
    }

    #[test]
    fn histogram_identity() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let out = macd(&closes);
        assert!((out.histogram - (out.macd_line - out.signal_line)).abs() < 1e-12);
    }

    #[test]
    fn fresh_acceleration_beats_signal() {
        // Flat then a sharp ramp: the line leads the slower signal, so the
        // histogram turns positive.
        let mut closes = vec![100.0; 40];
        for i in 1..=15 {
            closes.push(100.0 + i as f64 * 0.8);
        }
        let out = macd(&closes);
        assert!(out.histogram > 0.0, "histogram {} should be positive", out.histogram);
    }
}
