// =============================================================================
// Candle Pattern Recognition
// =============================================================================
//
// Examines the last three candles and classifies the most recent formation.
// Detection runs in a fixed priority order — the first match wins:
//
//   bullish_engulfing, bearish_engulfing, doji, hammer, shooting_star,
//   pin_bar_bullish, pin_bar_bearish, morning_star, evening_star
//
// Thresholds:
//   doji              body <= 10% of range
//   hammer / star     dominant wick >= 2x body, close in the far half
//   pin bar           wick >= 66% of range
//   morning/evening   trend bar + small middle body + reversal bar closing
//                     past the midpoint of the first

use crate::types::{Candle, CandlePattern};

fn upper_wick(c: &Candle) -> f64 {
    c.high - c.open.max(c.close)
}

fn lower_wick(c: &Candle) -> f64 {
    c.open.min(c.close) - c.low
}

fn is_doji(c: &Candle) -> bool {
    let range = c.range();
    range > 0.0 && c.body() <= range * 0.10
}

fn is_small_body(c: &Candle) -> bool {
    let range = c.range();
    range > 0.0 && c.body() <= range * 0.30
}

/// Detect the candle pattern formed by the tail of `candles`, if any.
///
/// Needs at least 2 candles for the two-bar patterns; three-bar stars only
/// fire with 3 or more. Returns `None` for short input or no match.
pub fn detect_pattern(candles: &[Candle]) -> Option<CandlePattern> {
    if candles.len() < 2 {
        return None;
    }

    let last = &candles[candles.len() - 1];
    let prev = &candles[candles.len() - 2];
    let third = if candles.len() >= 3 {
        Some(&candles[candles.len() - 3])
    } else {
        None
    };

    // -- Engulfing pairs ------------------------------------------------------
    if prev.is_bearish()
        && last.is_bullish()
        && last.open <= prev.close
        && last.close >= prev.open
    {
        return Some(CandlePattern::BullishEngulfing);
    }
    if prev.is_bullish()
        && last.is_bearish()
        && last.open >= prev.close
        && last.close <= prev.open
    {
        return Some(CandlePattern::BearishEngulfing);
    }

    // -- Single-bar indecision / rejection ------------------------------------
    if is_doji(last) {
        return Some(CandlePattern::Doji);
    }

    let body = last.body();
    if body > 0.0 {
        let lower = lower_wick(last);
        let upper = upper_wick(last);
        let midpoint = last.low + last.range() / 2.0;

        if lower >= body * 2.0 && upper <= body && last.close >= midpoint {
            return Some(CandlePattern::Hammer);
        }
        if upper >= body * 2.0 && lower <= body && last.close <= midpoint {
            return Some(CandlePattern::ShootingStar);
        }
    }

    let range = last.range();
    if range > 0.0 {
        if lower_wick(last) >= range * 0.66 {
            return Some(CandlePattern::PinBarBullish);
        }
        if upper_wick(last) >= range * 0.66 {
            return Some(CandlePattern::PinBarBearish);
        }
    }

    // -- Three-bar stars ------------------------------------------------------
    if let Some(first) = third {
        let first_mid = (first.open + first.close) / 2.0;
        if first.is_bearish()
            && is_small_body(prev)
            && last.is_bullish()
            && last.close > first_mid
        {
            return Some(CandlePattern::MorningStar);
        }
        if first.is_bullish()
            && is_small_body(prev)
            && last.is_bearish()
            && last.close < first_mid
        {
            return Some(CandlePattern::EveningStar);
        }
    }

    None
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

    /// A featureless bar that matches nothing on its own.
    fn plain(level: f64) -> Candle {
        candle(level, level + 1.0, level - 0.2, level + 0.8)
    }

    #[test]
    fn too_few_candles_is_none() {
        assert_eq!(detect_pattern(&[]), None);
        assert_eq!(detect_pattern(&[plain(100.0)]), None);
    }

    #[test]
    fn bullish_engulfing() {
        let candles = vec![
            plain(100.0),
            candle(101.0, 101.2, 99.8, 100.0),  // bearish
            candle(99.9, 101.6, 99.7, 101.4),   // bullish, engulfs prev body
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::BullishEngulfing));
    }

    #[test]
    fn bearish_engulfing() {
        let candles = vec![
            plain(100.0),
            candle(100.0, 101.2, 99.8, 101.0),  // bullish
            candle(101.1, 101.3, 99.5, 99.8),   // bearish, engulfs prev body
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::BearishEngulfing));
    }

    #[test]
    fn doji() {
        let candles = vec![
            plain(100.0),
            plain(100.0),
            candle(100.0, 101.0, 99.0, 100.05), // body 0.05 of range 2.0
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::Doji));
    }

    #[test]
    fn hammer() {
        // Long lower wick, tiny upper wick, close in the upper half.
        let candles = vec![
            plain(100.0),
            plain(100.0),
            candle(100.0, 100.5, 98.0, 100.4),
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::Hammer));
    }

    #[test]
    fn shooting_star() {
        let candles = vec![
            plain(100.0),
            plain(100.0),
            candle(100.0, 102.0, 99.5, 99.6),
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::ShootingStar));
    }

    #[test]
    fn engulfing_wins_priority_over_doji() {
        // The last bar qualifies as a doji (body exactly 10% of range) AND
        // engulfs the previous bearish body — engulfing is checked first.
        let candles = vec![
            plain(100.0),
            candle(100.3, 100.4, 100.1, 100.2), // small bearish
            candle(100.1, 102.0, 98.0, 100.5),  // wide-range bullish engulfing
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::BullishEngulfing));
    }

    #[test]
    fn morning_star() {
        let candles = vec![
            candle(102.0, 102.2, 99.8, 100.0),   // strong bearish
            candle(99.9, 100.4, 99.6, 100.05),   // small body, above the doji cutoff
            candle(100.1, 101.8, 100.0, 101.6),  // strong bullish past midpoint 101.0
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::MorningStar));
    }

    #[test]
    fn evening_star() {
        let candles = vec![
            candle(100.0, 102.2, 99.9, 102.0),   // strong bullish
            candle(102.1, 102.6, 101.8, 102.3),  // small body
            candle(102.2, 102.3, 100.2, 100.4),  // strong bearish below midpoint 101.0
        ];
        assert_eq!(detect_pattern(&candles), Some(CandlePattern::EveningStar));
    }

    #[test]
    fn no_pattern_on_plain_bars() {
        let candles = vec![plain(100.0), plain(100.5), plain(101.0)];
        assert_eq!(detect_pattern(&candles), None);
    }
}
