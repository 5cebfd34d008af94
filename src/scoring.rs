// =============================================================================
// Confluence Scorer — weighted-vote confidence engine
// =============================================================================
//
// Runs only when the filter stage passed. Every indicator casts a weighted
// vote into a bullish or bearish total; the spread between the two totals
// maps through a tiered curve into a confidence value, which is then bent
// by secondary bonuses, extreme-zone penalties, session strictness and two
// sequential clamps before the soft gate gets the last word.
//
// The scorer is pure: trade-log side effects belong to the engine.

use tracing::debug;

use crate::filters::{BlockReason, FilterVerdict};
use crate::indicators::TechnicalSnapshot;
use crate::htf::HtfAlignment;
use crate::session::{PairAccuracy, Session};
use crate::types::{pip_size, Candle, Momentum, SignalType, TrendDirection, VolatilityTier};
use serde::{Deserialize, Serialize};

/// Output of one full analysis pass. `confidence == 0` means no-trade.
/// Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalAnalysis {
    pub pair: String,
    pub current_price: f64,
    pub signal_type: SignalType,
    pub confidence: u32,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub technicals: TechnicalSnapshot,
    pub blocked: bool,
    pub block_reasons: Vec<BlockReason>,
    pub reasoning: Vec<String>,
}

/// Inputs for one scoring pass.
pub struct ScoreContext<'a> {
    pub pair: &'a str,
    pub session: Session,
    pub accuracy: PairAccuracy,
    pub candles: &'a [Candle],
    pub snapshot: &'a TechnicalSnapshot,
    pub verdict: &'a FilterVerdict,
}

// ── vote weights ─────────────────────────────────────────────────────────
const W_HTF_FULL: f64 = 50.0;
const W_HTF_PARTIAL: f64 = 20.0;
const W_CONFIRM_3: f64 = 25.0;
const W_CONFIRM_2: f64 = 15.0;
const W_MACD: f64 = 40.0;
const W_SUPERTREND: f64 = 40.0;
const W_BB_BREAKOUT: f64 = 30.0;
const W_BB_PROXIMITY: f64 = 15.0;
const W_RSI_DEEP: f64 = 20.0;
const W_RSI_MILD: f64 = 10.0;
const W_SMA_STACK: f64 = 15.0;
const W_SMA_SINGLE: f64 = 10.0;
const W_STOCH: f64 = 15.0;
const W_PATTERN: f64 = 15.0;
const W_ADX_STRONG: f64 = 10.0;
const W_ADX_MODERATE: f64 = 5.0;

/// Placeholder risk geometry for blocked passes, in pips.
const BLOCKED_SL_PIPS: f64 = 15.0;
const BLOCKED_TP_PIPS: f64 = 30.0;
/// Volatility-adjusted stops never go below this.
const MIN_SL_PIPS: f64 = 15.0;

impl SignalAnalysis {
    /// Build the zero-confidence result for a filter-blocked pass: entry at
    /// the current price, placeholder 15/30-pip geometry in the supertrend
    /// direction and the complete veto reasoning. The scorer never runs.
    pub fn blocked(
        pair: &str,
        current_price: f64,
        snapshot: &TechnicalSnapshot,
        verdict: &FilterVerdict,
    ) -> Self {
        let signal_type = match snapshot.supertrend.direction {
            TrendDirection::Bearish => SignalType::Put,
            _ => SignalType::Call,
        };
        let pip = pip_size(pair);
        let (stop_loss, take_profit) = offsets(
            current_price,
            signal_type,
            BLOCKED_SL_PIPS * pip,
            BLOCKED_TP_PIPS * pip,
        );
        Self {
            pair: pair.to_string(),
            current_price,
            signal_type,
            confidence: 0,
            entry: current_price,
            stop_loss,
            take_profit,
            technicals: snapshot.clone(),
            blocked: true,
            block_reasons: verdict.reasons.clone(),
            reasoning: verdict.reasoning.clone(),
        }
    }
}

fn offsets(entry: f64, side: SignalType, sl_dist: f64, tp_dist: f64) -> (f64, f64) {
    match side {
        SignalType::Call => (entry - sl_dist, entry + tp_dist),
        SignalType::Put => (entry + sl_dist, entry - tp_dist),
    }
}

/// Tiered confidence curve: maps the score spread to (base confidence, cap).
fn tier(diff: f64) -> (f64, f64) {
    if diff < 20.0 {
        (50.0 + 0.3 * diff, 56.0)
    } else if diff < 40.0 {
        (55.0 + 0.4 * (diff - 20.0), 70.0)
    } else if diff < 60.0 {
        (65.0 + 0.5 * (diff - 40.0), 85.0)
    } else {
        (75.0 + 0.3 * (diff - 60.0), 98.0)
    }
}

/// Caution band shared by the first extreme-zone penalty pass.
fn outside(value: f64, low: f64, high: f64) -> bool {
    value < low || value > high
}

/// Add one weighted vote to the matching side and record it.
fn vote(
    side: TrendDirection,
    weight: f64,
    label: &str,
    bullish: &mut f64,
    bearish: &mut f64,
    reasoning: &mut Vec<String>,
) {
    match side {
        TrendDirection::Bullish => *bullish += weight,
        TrendDirection::Bearish => *bearish += weight,
        TrendDirection::Neutral => return,
    }
    reasoning.push(format!("{label} ({side}) +{weight:.0}"));
}

/// Run the full confluence algorithm over a pass that survived the filters.
pub fn score(ctx: &ScoreContext<'_>) -> SignalAnalysis {
    let snap = ctx.snapshot;
    let current_price = ctx.candles.last().map(|c| c.close).unwrap_or(0.0);
    let mut bullish = 0.0f64;
    let mut bearish = 0.0f64;
    let mut reasoning: Vec<String> = Vec::new();

    // ── 1. HTF alignment ─────────────────────────────────────────────────
    let base_dir = snap.supertrend.direction;
    match ctx.verdict.htf {
        HtfAlignment::Full => vote(base_dir, W_HTF_FULL, "HTF fully aligned", &mut bullish, &mut bearish, &mut reasoning),
        HtfAlignment::Partial => vote(base_dir, W_HTF_PARTIAL, "HTF partially aligned", &mut bullish, &mut bearish, &mut reasoning),
        HtfAlignment::None => {}
    }

    // ── 2. Candle confirmation streak ────────────────────────────────────
    let streak_dir = match ctx.candles.last() {
        Some(c) if c.is_bullish() => TrendDirection::Bullish,
        Some(c) if c.is_bearish() => TrendDirection::Bearish,
        _ => TrendDirection::Neutral,
    };
    match ctx.verdict.confirmation_strength {
        3 => vote(streak_dir, W_CONFIRM_3, "3-candle confirmation", &mut bullish, &mut bearish, &mut reasoning),
        2 => vote(streak_dir, W_CONFIRM_2, "2-candle confirmation", &mut bullish, &mut bearish, &mut reasoning),
        _ => {}
    }

    // ── 3. MACD histogram ────────────────────────────────────────────────
    if snap.macd.histogram > 0.0 {
        vote(TrendDirection::Bullish, W_MACD, "MACD histogram positive", &mut bullish, &mut bearish, &mut reasoning);
    } else if snap.macd.histogram < 0.0 {
        vote(TrendDirection::Bearish, W_MACD, "MACD histogram negative", &mut bullish, &mut bearish, &mut reasoning);
    }

    // ── 4. Supertrend ────────────────────────────────────────────────────
    vote(base_dir, W_SUPERTREND, "Supertrend", &mut bullish, &mut bearish, &mut reasoning);

    // ── 5. Bollinger breakout / proximity ────────────────────────────────
    // Breakouts read as continuation: a close above the upper band votes
    // bullish, below the lower band bearish.
    if snap.bollinger.breakout {
        let side = if current_price > snap.bollinger.upper {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        };
        vote(side, W_BB_BREAKOUT, "Bollinger breakout", &mut bullish, &mut bearish, &mut reasoning);
    } else if snap.bollinger.percent_b >= 0.8 {
        vote(TrendDirection::Bullish, W_BB_PROXIMITY, "Bollinger upper proximity", &mut bullish, &mut bearish, &mut reasoning);
    } else if snap.bollinger.percent_b <= 0.2 {
        vote(TrendDirection::Bearish, W_BB_PROXIMITY, "Bollinger lower proximity", &mut bullish, &mut bearish, &mut reasoning);
    }

    // ── 6. RSI zones (mean-reversion reading) ────────────────────────────
    if snap.rsi < 25.0 {
        vote(TrendDirection::Bullish, W_RSI_DEEP, "RSI deeply oversold", &mut bullish, &mut bearish, &mut reasoning);
    } else if snap.rsi < 35.0 {
        vote(TrendDirection::Bullish, W_RSI_MILD, "RSI oversold", &mut bullish, &mut bearish, &mut reasoning);
    } else if snap.rsi > 75.0 {
        vote(TrendDirection::Bearish, W_RSI_DEEP, "RSI deeply overbought", &mut bullish, &mut bearish, &mut reasoning);
    } else if snap.rsi > 65.0 {
        vote(TrendDirection::Bearish, W_RSI_MILD, "RSI overbought", &mut bullish, &mut bearish, &mut reasoning);
    }

    // ── 7. SMA stack ─────────────────────────────────────────────────────
    if current_price > snap.sma20 && snap.sma20 > snap.sma50 {
        vote(TrendDirection::Bullish, W_SMA_STACK, "SMA stack bullish", &mut bullish, &mut bearish, &mut reasoning);
    } else if current_price < snap.sma20 && snap.sma20 < snap.sma50 {
        vote(TrendDirection::Bearish, W_SMA_STACK, "SMA stack bearish", &mut bullish, &mut bearish, &mut reasoning);
    } else if current_price > snap.sma20 {
        vote(TrendDirection::Bullish, W_SMA_SINGLE, "Price above SMA20", &mut bullish, &mut bearish, &mut reasoning);
    } else if current_price < snap.sma20 {
        vote(TrendDirection::Bearish, W_SMA_SINGLE, "Price below SMA20", &mut bullish, &mut bearish, &mut reasoning);
    }

    // ── 8. Stochastic zones ──────────────────────────────────────────────
    if snap.stochastic.k < 20.0 && snap.stochastic.d < 20.0 {
        vote(TrendDirection::Bullish, W_STOCH, "Stochastic oversold", &mut bullish, &mut bearish, &mut reasoning);
    } else if snap.stochastic.k > 80.0 && snap.stochastic.d > 80.0 {
        vote(TrendDirection::Bearish, W_STOCH, "Stochastic overbought", &mut bullish, &mut bearish, &mut reasoning);
    }

    // ── 9. Candle pattern ────────────────────────────────────────────────
    if let Some(p) = snap.candle_pattern {
        if !p.is_weak() {
            let side = match p.direction() {
                Some(SignalType::Call) => TrendDirection::Bullish,
                Some(SignalType::Put) => TrendDirection::Bearish,
                None => TrendDirection::Neutral,
            };
            vote(side, W_PATTERN, "Confirming pattern", &mut bullish, &mut bearish, &mut reasoning);
        }
    }

    // ── 10. ADX: amplify whichever side already leads ────────────────────
    if bullish != bearish {
        let leader = if bullish > bearish {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        };
        if snap.adx > 40.0 {
            vote(leader, W_ADX_STRONG, "ADX strong trend", &mut bullish, &mut bearish, &mut reasoning);
        } else if snap.adx > 25.0 {
            vote(leader, W_ADX_MODERATE, "ADX moderate trend", &mut bullish, &mut bearish, &mut reasoning);
        }
    }

    let signal_type = if bullish >= bearish {
        SignalType::Call
    } else {
        SignalType::Put
    };
    let diff = (bullish - bearish).abs();
    let (mut confidence, cap) = tier(diff);
    reasoning.push(format!(
        "Confluence {bullish:.0} bull / {bearish:.0} bear, spread {diff:.0} -> base {confidence:.1}"
    ));

    // ── Secondary adjustments ────────────────────────────────────────────
    // Full set at spread >= 40, pair accuracy + pattern alignment only in
    // the 20..40 band, nothing below that.
    if diff >= 40.0 {
        if snap.adx > 40.0 {
            confidence += 5.0;
        } else if snap.adx > 25.0 {
            confidence += 3.0;
        }
        if snap.momentum == Momentum::Strong {
            confidence += 4.0;
        }
        if snap.volatility == VolatilityTier::Low {
            confidence += 3.0;
        }
    }
    if diff >= 20.0 {
        match ctx.accuracy {
            PairAccuracy::High => confidence += 5.0,
            PairAccuracy::Medium => {}
            PairAccuracy::Low => confidence -= 5.0,
        }
        if let Some(p) = snap.candle_pattern {
            if p.confirms(signal_type) {
                confidence += 8.0;
            } else if p.direction().is_some() {
                confidence -= 10.0;
            }
        }
    }

    // ── Extreme-zone penalties ───────────────────────────────────────────
    if outside(snap.rsi, 10.0, 90.0) {
        confidence -= 12.0;
        reasoning.push(format!("RSI extreme zone penalty ({:.1})", snap.rsi));
    }
    if outside(snap.stochastic.k, 10.0, 90.0) || outside(snap.stochastic.d, 10.0, 90.0) {
        confidence -= 10.0;
        reasoning.push("Stochastic extreme zone penalty".to_string());
    }

    // ── HTF bonus / penalty ──────────────────────────────────────────────
    match ctx.verdict.htf {
        HtfAlignment::Full => confidence += 15.0,
        HtfAlignment::Partial => {}
        HtfAlignment::None => confidence -= 20.0,
    }

    // ── Strict mode: afternoon on non-High pairs ─────────────────────────
    if ctx.session == Session::Afternoon && ctx.accuracy != PairAccuracy::High {
        confidence -= 20.0;
        confidence = confidence.min(55.0);
        reasoning.push("Strict afternoon mode: -20, capped at 55".to_string());
    }

    // First clamp.
    confidence = confidence.clamp(45.0, cap);

    // ── Second, overlapping extreme pass ─────────────────────────────────
    // Penalises the 90..=97 / 3..=10 caution bands on top of the hard-zone
    // penalties above.
    if (90.0..=97.0).contains(&snap.rsi) || (3.0..=10.0).contains(&snap.rsi) {
        confidence -= 7.0;
    }
    if (90.0..=97.0).contains(&snap.stochastic.k)
        || (3.0..=10.0).contains(&snap.stochastic.k)
        || (90.0..=97.0).contains(&snap.stochastic.d)
        || (3.0..=10.0).contains(&snap.stochastic.d)
    {
        confidence -= 5.0;
    }
    if snap.candle_pattern.is_some_and(|p| p.is_neutral()) {
        confidence -= 8.0;
        reasoning.push("Neutral pattern penalty".to_string());
    }

    // Second clamp.
    confidence = confidence.clamp(30.0, cap);

    // ── Soft gate ────────────────────────────────────────────────────────
    let mut final_confidence = confidence.round() as u32;
    if (ctx.session == Session::Afternoon || ctx.accuracy == PairAccuracy::Low)
        && final_confidence < 85
        && diff < 60.0
    {
        reasoning.push(format!(
            "Soft gate: {} session / {} accuracy with confidence {final_confidence} < 85 and spread {diff:.0} < 60 -> discarded",
            ctx.session, ctx.accuracy
        ));
        final_confidence = 0;
    }

    // ── Risk geometry ────────────────────────────────────────────────────
    let pip = pip_size(ctx.pair);
    let vol_mult = match snap.volatility {
        VolatilityTier::High => 2.0,
        VolatilityTier::Medium => 1.5,
        VolatilityTier::Low => 1.2,
    };
    let atr_pips = snap.atr / pip;
    let sl_pips = (atr_pips * vol_mult).max(MIN_SL_PIPS);
    let rr = match final_confidence {
        90..=100 => 3.0,
        80..=89 => 2.5,
        70..=79 => 2.0,
        _ => 1.8,
    };
    let tp_pips = sl_pips * rr;
    let (stop_loss, take_profit) = offsets(current_price, signal_type, sl_pips * pip, tp_pips * pip);

    debug!(
        pair = ctx.pair,
        %signal_type,
        confidence = final_confidence,
        spread = diff,
        sl_pips,
        tp_pips,
        "confluence pass scored"
    );

    SignalAnalysis {
        pair: ctx.pair.to_string(),
        current_price,
        signal_type,
        confidence: final_confidence,
        entry: current_price,
        stop_loss,
        take_profit,
        technicals: snap.clone(),
        blocked: false,
        block_reasons: Vec::new(),
        reasoning,
    }
}
