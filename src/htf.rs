// =============================================================================
// Higher Time Frame (HTF) Alignment
// =============================================================================
//
// Computes the supertrend direction independently on the base timeframe,
// M15, and H1, and summarises how many of the higher frames agree with the
// base. Full alignment is a hard requirement of the filter stage; the
// alignment grade also feeds the confluence scorer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::supertrend::supertrend;
use crate::types::{Candle, TrendDirection};

/// How strongly the higher timeframes agree with the base direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HtfAlignment {
    /// Base, M15, and H1 all point the same way.
    Full,
    /// Exactly one higher frame agrees with the base.
    Partial,
    /// Neither higher frame agrees.
    None,
}

impl std::fmt::Display for HtfAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "FULL"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Multi-timeframe supertrend snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HtfAnalysis {
    pub base_direction: TrendDirection,
    pub m15_direction: TrendDirection,
    pub h1_direction: TrendDirection,
    pub alignment: HtfAlignment,
}

/// Grade the tri-timeframe supertrend alignment for a pair.
pub fn analyze(
    pair: &str,
    base_candles: &[Candle],
    m15_candles: &[Candle],
    h1_candles: &[Candle],
) -> HtfAnalysis {
    let base_direction = supertrend(base_candles, 10, 3.0).direction;
    let m15_direction = supertrend(m15_candles, 10, 3.0).direction;
    let h1_direction = supertrend(h1_candles, 10, 3.0).direction;

    let agreeing = [m15_direction, h1_direction]
        .iter()
        .filter(|d| **d == base_direction)
        .count();

    let alignment = match agreeing {
        2 => HtfAlignment::Full,
        1 => HtfAlignment::Partial,
        _ => HtfAlignment::None,
    };

    debug!(
        pair,
        base = %base_direction,
        m15 = %m15_direction,
        h1 = %h1_direction,
        alignment = %alignment,
        "HTF analysis complete"
    );

    HtfAnalysis {
        base_direction,
        m15_direction,
        h1_direction,
        alignment,
    }
}
