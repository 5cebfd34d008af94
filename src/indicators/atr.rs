// =============================================================================
// Average True Range (ATR) — windowed mean variant
// =============================================================================
//
// True Range per bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR here is the simple mean of the last `period` TR values (a window
// mean, not Wilder smoothing — the designed behaviour of this pipeline).

use crate::types::Candle;

/// True range of `candle` given the previous close.
pub fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    let hl = candle.high - candle.low;
    let hc = (candle.high - prev_close).abs();
    let lc = (candle.low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Mean of the last `period` true ranges.
///
/// # Edge cases
/// - Empty input => 0.0
/// - Fewer than `period + 1` candles (not enough TR samples) => the last
///   candle's plain high-low range
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    let Some(last) = candles.last() else {
        return 0.0;
    };

    if period == 0 || candles.len() < period + 1 {
        return last.range();
    }

    let start = candles.len() - period;
    let mut sum = 0.0;
    for i in start..candles.len() {
        sum += true_range(&candles[i], candles[i - 1].close);
    }
    sum / period as f64
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: 0,
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn atr_empty_is_zero() {
        assert_eq!(atr(&[], 14), 0.0);
    }

    #[test]
    fn atr_short_input_uses_last_range() {
        let candles = vec![
            candle(100.0, 102.0, 98.0, 101.0),
            candle(101.0, 106.0, 100.0, 104.0),
        ];
        assert!((atr(&candles, 14) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn atr_constant_range_converges() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                candle(base, base + 5.0, base - 5.0, base)
            })
            .collect();
        let value = atr(&candles, 14);
        assert!((value - 10.0).abs() < 0.5, "expected ~10, got {value}");
    }

    #[test]
    fn true_range_uses_gap_to_prev_close() {
        // Gap up: |H - prevClose| = 20 dominates H - L = 7.
        let c = candle(110.0, 115.0, 108.0, 112.0);
        assert!((true_range(&c, 95.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn atr_reflects_volatility_growth() {
        let mut calm: Vec<Candle> = Vec::new();
        let mut wild: Vec<Candle> = Vec::new();
        for i in 0..30 {
            let base = 100.0 + i as f64 * 0.05;
            calm.push(candle(base, base + 0.5, base - 0.5, base));
            wild.push(candle(base, base + 3.0, base - 3.0, base));
        }
        assert!(atr(&wild, 14) > atr(&calm, 14));
    }

    #[test]
    fn atr_is_non_negative() {
        let candles: Vec<Candle> = (0..40)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.5).sin() * 8.0;
                candle(base - 0.3, base + 1.5, base - 1.5, base + 0.4)
            })
            .collect();
        assert!(atr(&candles, 14) >= 0.0);
    }
}
