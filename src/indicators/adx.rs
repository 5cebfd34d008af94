// =============================================================================
// Average Directional Index (ADX) — single-period DX variant
// =============================================================================
//
// Directional movement over the last `period` bars:
//   +DM = max(H - prevH, 0)  when it exceeds the -DM candidate
//   -DM = max(prevL - L, 0)  when it exceeds the +DM candidate
//   +DI = 100 * sum(+DM) / sum(TR)
//   -DI = 100 * sum(-DM) / sum(TR)
//   DX  = |+DI - -DI| / (+DI + -DI) * 100
//
// Note: this returns the single-period DX rather than a smoothed average of
// DX values. That is the designed behaviour of this pipeline and is kept
// as-is; a textbook ADX would further average DX over `period`.

use super::atr::true_range;
use crate::types::Candle;

/// Single-period DX over the last `period` bars, reported as the ADX value.
///
/// # Edge cases
/// - Fewer than `period + 1` candles => 25.0 (middling trend strength)
/// - Zero summed TR or zero +DI + -DI => 25.0
pub fn adx(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return 25.0;
    }

    let start = candles.len() - period;
    let mut sum_plus_dm = 0.0;
    let mut sum_minus_dm = 0.0;
    let mut sum_tr = 0.0;

    for i in start..candles.len() {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;

        if up > down && up > 0.0 {
            sum_plus_dm += up;
        }
        if down > up && down > 0.0 {
            sum_minus_dm += down;
        }

        sum_tr += true_range(&candles[i], candles[i - 1].close);
    }

    if sum_tr == 0.0 {
        return 25.0;
    }

    let plus_di = 100.0 * sum_plus_dm / sum_tr;
    let minus_di = 100.0 * sum_minus_dm / sum_tr;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 25.0;
    }

    (plus_di - minus_di).abs() / di_sum * 100.0
}
