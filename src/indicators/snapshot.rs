// =============================================================================
// Technical Snapshot — one-shot aggregate of every indicator
// =============================================================================
//
// Recomputed from scratch on every analysis pass; immutable once built.
// The trend vote accumulates weighted bullish/bearish points across the
// indicator battery; Bullish requires a lead of more than 2 points.
//
// Momentum cutoffs:  ADX > 40 => STRONG, ADX > 25 => MODERATE, else WEAK.
// Volatility cutoffs: ATR/price > 0.015 => HIGH, > 0.008 => MEDIUM, else LOW.

use serde::{Deserialize, Serialize};

use super::adx::adx;
use super::atr::atr;
use super::bollinger::{bollinger, BollingerBands};
use super::ema::{ema, sma};
use super::macd::{macd, Macd};
use super::patterns::detect_pattern;
use super::rsi::rsi;
use super::stochastic::{stochastic, Stochastic};
use super::supertrend::{supertrend, Supertrend};
use crate::types::{Candle, CandlePattern, Momentum, TrendDirection, VolatilityTier};

/// Momentum classification cutoffs on ADX.
const ADX_STRONG: f64 = 40.0;
const ADX_MODERATE: f64 = 25.0;
/// Volatility classification cutoffs on ATR / price.
const ATR_RATIO_HIGH: f64 = 0.015;
const ATR_RATIO_MEDIUM: f64 = 0.008;

/// Immutable aggregate of all indicator outputs for one candle series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub rsi: f64,
    pub macd: Macd,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub bollinger: BollingerBands,
    pub stochastic: Stochastic,
    pub atr: f64,
    pub adx: f64,
    pub supertrend: Supertrend,
    pub candle_pattern: Option<CandlePattern>,
    pub trend: TrendDirection,
    pub momentum: Momentum,
    pub volatility: VolatilityTier,
}

impl TechnicalSnapshot {
    /// Compute every indicator over `candles` (oldest-first).
    pub fn compute(candles: &[Candle]) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let price = closes.last().copied().unwrap_or(0.0);

        let rsi = rsi(&closes, 14);
        let macd = macd(&closes);
        let sma20 = sma(&closes, 20);
        let sma50 = sma(&closes, 50);
        let sma200 = sma(&closes, 200);
        let ema12 = ema(&closes, 12);
        let ema26 = ema(&closes, 26);
        let bollinger = bollinger(&closes, 20, 2.0);
        let stochastic = stochastic(candles, 14, 3);
        let atr = atr(candles, 14);
        let adx = adx(candles, 14);
        let supertrend = supertrend(candles, 10, 3.0);
        let candle_pattern = detect_pattern(candles);

        // -- Weighted trend vote ----------------------------------------------
        let mut bullish = 0.0_f64;
        let mut bearish = 0.0_f64;

        if price > sma20 {
            bullish += 1.0;
        } else if price < sma20 {
            bearish += 1.0;
        }
        if sma20 > sma50 {
            bullish += 1.0;
        } else if sma20 < sma50 {
            bearish += 1.0;
        }
        if price > sma200 {
            bullish += 1.0;
        } else if price < sma200 {
            bearish += 1.0;
        }
        if ema12 > ema26 {
            bullish += 1.0;
        } else if ema12 < ema26 {
            bearish += 1.0;
        }
        // Faster signals carry double weight.
        if macd.histogram > 0.0 {
            bullish += 2.0;
        } else if macd.histogram < 0.0 {
            bearish += 2.0;
        }
        match supertrend.direction {
            TrendDirection::Bullish => bullish += 2.0,
            TrendDirection::Bearish => bearish += 2.0,
            TrendDirection::Neutral => {}
        }
        if rsi > 55.0 {
            bullish += 1.0;
        } else if rsi < 45.0 {
            bearish += 1.0;
        }
        if bollinger.percent_b > 0.5 {
            bullish += 1.0;
        } else if bollinger.percent_b < 0.5 {
            bearish += 1.0;
        }
        if stochastic.k > stochastic.d {
            bullish += 1.0;
        } else if stochastic.k < stochastic.d {
            bearish += 1.0;
        }
        // A trending ADX amplifies whichever side already leads.
        if adx > ADX_MODERATE {
            if bullish > bearish {
                bullish += 1.0;
            } else if bearish > bullish {
                bearish += 1.0;
            }
        }

        let trend = if bullish - bearish > 2.0 {
            TrendDirection::Bullish
        } else if bearish - bullish > 2.0 {
            TrendDirection::Bearish
        } else {
            TrendDirection::Neutral
        };

        let momentum = if adx > ADX_STRONG {
            Momentum::Strong
        } else if adx > ADX_MODERATE {
            Momentum::Moderate
        } else {
            Momentum::Weak
        };

        let atr_ratio = if price > 0.0 { atr / price } else { 0.0 };
        let volatility = if atr_ratio > ATR_RATIO_HIGH {
            VolatilityTier::High
        } else if atr_ratio > ATR_RATIO_MEDIUM {
            VolatilityTier::Medium
        } else {
            VolatilityTier::Low
        };

        Self {
            rsi,
            macd,
            sma20,
            sma50,
            sma200,
            ema12,
            ema26,
            bollinger,
            stochastic,
            atr,
            adx,
            supertrend,
            candle_pattern,
            trend,
            momentum,
            volatility,
        }
    }
}
