// =============================================================================
// Signal Filter Stage — hard vetoes ahead of scoring
// =============================================================================
//
// Seven veto checks run in a fixed order. Every check always runs — even
// after one has already fired — so the verdict carries the complete list
// of objections. Any fired veto blocks the pass: the scorer never runs and
// the signal is emitted with confidence 0.
//
// The verdict is typed: `blocked` + `reasons` drive control flow, the
// rendered `reasoning` strings exist for humans and logs only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::htf::{HtfAlignment, HtfAnalysis};
use crate::indicators::TechnicalSnapshot;
use crate::session::{PairAccuracy, Session};
use crate::types::{is_jpy_pair, Candle};

/// Hard-veto outcome codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    HtfMisaligned,
    ExtremeOscillator,
    BollingerExtremeCombo,
    VolatilitySpike,
    SessionRestricted,
    WeakCandleConfirmation,
    WeakPatternInExtremeZone,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::HtfMisaligned => "HTF_MISALIGNED",
            Self::ExtremeOscillator => "EXTREME_OSCILLATOR",
            Self::BollingerExtremeCombo => "BOLLINGER_EXTREME_COMBO",
            Self::VolatilitySpike => "VOLATILITY_SPIKE",
            Self::SessionRestricted => "SESSION_RESTRICTED",
            Self::WeakCandleConfirmation => "WEAK_CANDLE_CONFIRMATION",
            Self::WeakPatternInExtremeZone => "WEAK_PATTERN_EXTREME_ZONE",
        };
        write!(f, "{name}")
    }
}

/// Result of running the full veto battery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterVerdict {
    /// True when any veto fired; the pass must end with confidence 0.
    pub blocked: bool,
    pub reasons: Vec<BlockReason>,
    /// Human-readable rendering of each fired veto, in check order.
    pub reasoning: Vec<String>,
    /// Consecutive confirming candles found by check 6 (0, 2 or 3).
    pub confirmation_strength: u8,
    /// Alignment grade carried forward for the scorer's HTF votes.
    pub htf: HtfAlignment,
}

/// Everything the veto battery needs for one pass.
pub struct FilterContext<'a> {
    pub pair: &'a str,
    pub session: Session,
    pub accuracy: PairAccuracy,
    pub candles: &'a [Candle],
    pub snapshot: &'a TechnicalSnapshot,
    pub htf: &'a HtfAnalysis,
}

/// Hard bound on RSI/stochastic before a pass is vetoed outright.
const OSC_HARD_LOW: f64 = 3.0;
const OSC_HARD_HIGH: f64 = 97.0;
/// JPY pairs run a slightly tighter RSI band.
const RSI_HARD_LOW_JPY: f64 = 4.0;
const RSI_HARD_HIGH_JPY: f64 = 96.0;
/// Caution band used by the combo and weak-pattern checks.
const OSC_SOFT_LOW: f64 = 10.0;
const OSC_SOFT_HIGH: f64 = 90.0;
/// Volatility-spike trigger: last range vs mean range of the window.
const SPIKE_RATIO: f64 = 1.5;
const SPIKE_WINDOW: usize = 14;
/// A confirming candle's body must cover this share of its range.
const MIN_BODY_RATIO: f64 = 0.30;

/// True when RSI or either stochastic line sits outside the caution band.
pub fn oscillator_in_caution_zone(snapshot: &TechnicalSnapshot) -> bool {
    let s = &snapshot.stochastic;
    !(OSC_SOFT_LOW..=OSC_SOFT_HIGH).contains(&snapshot.rsi)
        || !(OSC_SOFT_LOW..=OSC_SOFT_HIGH).contains(&s.k)
        || !(OSC_SOFT_LOW..=OSC_SOFT_HIGH).contains(&s.d)
}

/// Count the consecutive same-direction, decisive candles at the tail of
/// the series (capped at 3). Indecision bars (body < 30% of range) break
/// the streak.
fn confirmation_streak(candles: &[Candle]) -> u8 {
    let Some(last) = candles.last() else {
        return 0;
    };
    if last.range() <= 0.0 || last.body() < last.range() * MIN_BODY_RATIO {
        return 0;
    }
    let bullish = last.is_bullish();

    let mut streak = 0u8;
    for c in candles.iter().rev() {
        let decisive = c.range() > 0.0 && c.body() >= c.range() * MIN_BODY_RATIO;
        let same_direction = if bullish { c.is_bullish() } else { c.is_bearish() };
        if decisive && same_direction {
            streak += 1;
            if streak == 3 {
                break;
            }
        } else {
            break;
        }
    }
    streak
}

/// Run every veto check and return the combined verdict.
pub fn evaluate(ctx: &FilterContext<'_>) -> FilterVerdict {
    let mut reasons = Vec::new();
    let mut reasoning = Vec::new();
    let snap = ctx.snapshot;

    // ── 1. Multi-timeframe alignment ─────────────────────────────────────
    if ctx.htf.alignment != HtfAlignment::Full {
        reasons.push(BlockReason::HtfMisaligned);
        reasoning.push(format!(
            "BLOCKED: HTF misaligned — base {} / M15 {} / H1 {}",
            ctx.htf.base_direction, ctx.htf.m15_direction, ctx.htf.h1_direction
        ));
    }

    // ── 2. Extreme oscillator zones ──────────────────────────────────────
    let (rsi_low, rsi_high) = if is_jpy_pair(ctx.pair) {
        (RSI_HARD_LOW_JPY, RSI_HARD_HIGH_JPY)
    } else {
        (OSC_HARD_LOW, OSC_HARD_HIGH)
    };
    let rsi_extreme = snap.rsi < rsi_low || snap.rsi > rsi_high;
    let stoch_extreme = snap.stochastic.k < OSC_HARD_LOW
        || snap.stochastic.k > OSC_HARD_HIGH
        || snap.stochastic.d < OSC_HARD_LOW
        || snap.stochastic.d > OSC_HARD_HIGH;
    if rsi_extreme || stoch_extreme {
        reasons.push(BlockReason::ExtremeOscillator);
        if rsi_extreme {
            reasoning.push(format!(
                "BLOCKED: EXTREME RSI {:.1} outside [{rsi_low}, {rsi_high}]",
                snap.rsi
            ));
        }
        if stoch_extreme {
            reasoning.push(format!(
                "BLOCKED: EXTREME STOCHASTIC K {:.1} / D {:.1} outside [{OSC_HARD_LOW}, {OSC_HARD_HIGH}]",
                snap.stochastic.k, snap.stochastic.d
            ));
        }
    }

    // ── 3. Bollinger breakout + caution-zone oscillator ──────────────────
    if snap.bollinger.breakout && oscillator_in_caution_zone(snap) {
        reasons.push(BlockReason::BollingerExtremeCombo);
        reasoning.push(format!(
            "BLOCKED: price outside Bollinger bands with oscillator in caution zone (%B {:.2})",
            snap.bollinger.percent_b
        ));
    }

    // ── 4. Volatility spike ──────────────────────────────────────────────
    if let Some(last) = ctx.candles.last() {
        let window_start = ctx.candles.len().saturating_sub(SPIKE_WINDOW);
        let window = &ctx.candles[window_start..];
        let mean_range =
            window.iter().map(Candle::range).sum::<f64>() / window.len().max(1) as f64;
        if mean_range > 0.0 && last.range() >= mean_range * SPIKE_RATIO {
            reasons.push(BlockReason::VolatilitySpike);
            reasoning.push(format!(
                "BLOCKED: volatility spike — last range {:.5} >= {SPIKE_RATIO}x mean {:.5}",
                last.range(),
                mean_range
            ));
        }
    }

    // ── 5. Session / pair restrictions ───────────────────────────────────
    let session_blocked = match ctx.session {
        Session::Evening => ctx.accuracy != PairAccuracy::High,
        Session::Afternoon => ctx.accuracy == PairAccuracy::Low,
        Session::Morning => false,
    };
    if session_blocked {
        reasons.push(BlockReason::SessionRestricted);
        reasoning.push(format!(
            "BLOCKED: {} session does not allow {}-accuracy pairs",
            ctx.session, ctx.accuracy
        ));
    }

    // ── 6. Candle confirmation ───────────────────────────────────────────
    let confirmation_strength = confirmation_streak(ctx.candles);
    if confirmation_strength < 2 {
        reasons.push(BlockReason::WeakCandleConfirmation);
        reasoning.push(format!(
            "BLOCKED: only {confirmation_strength} consecutive confirming candles (need >= 2)"
        ));
    }

    // ── 7. Weak pattern while stretched ──────────────────────────────────
    if oscillator_in_caution_zone(snap) {
        let weak = match snap.candle_pattern {
            None => true,
            Some(p) => p.is_weak(),
        };
        if weak {
            reasons.push(BlockReason::WeakPatternInExtremeZone);
            let pattern = snap
                .candle_pattern
                .map(|p| p.to_string())
                .unwrap_or_else(|| "none".to_string());
            reasoning.push(format!(
                "BLOCKED: oscillator stretched with weak/absent pattern ({pattern})"
            ));
        }
    }

    let blocked = !reasons.is_empty();
    debug!(
        pair = ctx.pair,
        blocked,
        vetoes = reasons.len(),
        confirmation_strength,
        "filter stage evaluated"
    );

    FilterVerdict {
        blocked,
        reasons,
        reasoning,
        confirmation_strength,
        htf: ctx.htf.alignment,
    }
}
