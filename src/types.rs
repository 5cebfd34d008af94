// =============================================================================
// Shared types used across the Meridian signal engine
// =============================================================================

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Market data
// -----------------------------------------------------------------------------

/// A single OHLC candle, oldest-first in any series the engine handles.
///
/// Invariant: `low <= min(open, close)` and `high >= max(open, close)`;
/// timestamps are unique within a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, milliseconds since the UNIX epoch.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Full bar range (high - low).
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute body size (|close - open|).
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Latest quote for a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub bid: f64,
    pub ask: f64,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: i64,
    pub change: f64,
    pub change_percent: f64,
}

// -----------------------------------------------------------------------------
// Directional enums
// -----------------------------------------------------------------------------

/// Directional call produced by the scorer: Call = up, Put = down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    Call,
    Put,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "BULLISH"),
            Self::Bearish => write!(f, "BEARISH"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Momentum {
    Strong,
    Moderate,
    Weak,
}

impl std::fmt::Display for Momentum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "STRONG"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Weak => write!(f, "WEAK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityTier {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for VolatilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// Win/loss outcome of a logged trade. Pending until settled exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeResult {
    Win,
    Loss,
    Pending,
}

impl std::fmt::Display for TradeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win => write!(f, "WIN"),
            Self::Loss => write!(f, "LOSS"),
            Self::Pending => write!(f, "PENDING"),
        }
    }
}

// -----------------------------------------------------------------------------
// Candle patterns
// -----------------------------------------------------------------------------

/// Recognised 1-3 bar candle patterns, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandlePattern {
    BullishEngulfing,
    BearishEngulfing,
    Doji,
    Hammer,
    ShootingStar,
    PinBarBullish,
    PinBarBearish,
    MorningStar,
    EveningStar,
    SpinningTop,
}

impl CandlePattern {
    /// Patterns too weak to confirm a direction on their own.
    pub fn is_weak(&self) -> bool {
        matches!(
            self,
            Self::Doji | Self::SpinningTop | Self::PinBarBullish | Self::PinBarBearish
        )
    }

    /// Indecision patterns that draw a scoring penalty.
    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Doji | Self::SpinningTop)
    }

    /// Directional reading of the pattern, if it has one.
    pub fn direction(&self) -> Option<SignalType> {
        match self {
            Self::BullishEngulfing | Self::Hammer | Self::PinBarBullish | Self::MorningStar => {
                Some(SignalType::Call)
            }
            Self::BearishEngulfing
            | Self::ShootingStar
            | Self::PinBarBearish
            | Self::EveningStar => Some(SignalType::Put),
            Self::Doji | Self::SpinningTop => None,
        }
    }

    /// Whether the pattern counts as confirming evidence for `side` in the
    /// confluence scorer (directional and non-doji only).
    pub fn confirms(&self, side: SignalType) -> bool {
        !self.is_weak() && self.direction() == Some(side)
    }
}

impl std::fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BullishEngulfing => "bullish_engulfing",
            Self::BearishEngulfing => "bearish_engulfing",
            Self::Doji => "doji",
            Self::Hammer => "hammer",
            Self::ShootingStar => "shooting_star",
            Self::PinBarBullish => "pin_bar_bullish",
            Self::PinBarBearish => "pin_bar_bearish",
            Self::MorningStar => "morning_star",
            Self::EveningStar => "evening_star",
            Self::SpinningTop => "spinning_top",
        };
        write!(f, "{name}")
    }
}

// -----------------------------------------------------------------------------
// Pair universe
// -----------------------------------------------------------------------------

/// The fixed 12-pair universe the engine scans, with the synthetic
/// generator's base price for each pair.
pub const PAIR_UNIVERSE: &[(&str, f64)] = &[
    ("EURUSD", 1.0850),
    ("GBPUSD", 1.2650),
    ("USDJPY", 149.50),
    ("AUDUSD", 0.6550),
    ("USDCAD", 1.3550),
    ("USDCHF", 0.8850),
    ("NZDUSD", 0.6150),
    ("EURGBP", 0.8580),
    ("EURJPY", 162.20),
    ("GBPJPY", 189.10),
    ("AUDJPY", 97.90),
    ("EURCHF", 0.9600),
];

/// True when `pair` is part of the tradable universe.
pub fn is_known_pair(pair: &str) -> bool {
    PAIR_UNIVERSE.iter().any(|(p, _)| *p == pair)
}

/// Synthetic base price for a known pair.
pub fn base_price(pair: &str) -> Option<f64> {
    PAIR_UNIVERSE
        .iter()
        .find(|(p, _)| *p == pair)
        .map(|(_, price)| *price)
}

/// True for JPY-quoted pairs, which use two-decimal pricing.
pub fn is_jpy_pair(pair: &str) -> bool {
    pair.ends_with("JPY")
}

/// Pip size for a pair: 0.01 for JPY quotes, 0.0001 otherwise.
pub fn pip_size(pair: &str) -> f64 {
    if is_jpy_pair(pair) {
        0.01
    } else {
        0.0001
    }
}
