// =============================================================================
// Signal Engine — analysis pipeline and rescan controller
// =============================================================================
//
// One analysis pass:
//   1. Fetch candles for the base timeframe plus M15 and H1
//   2. Compute the full indicator snapshot
//   3. Grade higher-timeframe alignment
//   4. Run the hard-veto filter battery
//   5. Score confluence (or emit the blocked zero-confidence result)
//   6. Log accepted signals to the trade log
//
// The rescan controller wraps the pass in up to `max_rescans` attempts with
// fresh data each time, accepting the first pass at or above the confidence
// threshold. On exhaustion the best-seen result is returned, forced to zero
// when still sub-threshold: a sub-threshold non-zero confidence must never
// surface.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app_state::EngineState;
use crate::filters::{self, FilterContext};
use crate::htf;
use crate::indicators::TechnicalSnapshot;
use crate::scoring::{self, ScoreContext, SignalAnalysis};
use crate::session::{PairAccuracy, Session};
use crate::types::is_known_pair;

/// Provider interval strings for the two higher timeframes.
const M15_INTERVAL: &str = "15min";
const H1_INTERVAL: &str = "1h";

/// Valid/blocked counts for one batch scan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScanSummary {
    pub valid: usize,
    pub blocked: usize,
}

/// Results of one full scan over the pair universe, sorted by descending
/// confidence.
#[derive(Debug)]
pub struct ScanOutcome {
    pub results: Vec<SignalAnalysis>,
    pub summary: ScanSummary,
}

pub struct SignalEngine {
    state: Arc<EngineState>,
}

impl SignalEngine {
    pub fn new(state: Arc<EngineState>) -> Self {
        Self { state }
    }

    /// One complete pipeline pass over fresh data for `pair`.
    async fn analysis_pass(&self, pair: &str, timeframe: &str) -> Result<SignalAnalysis> {
        // Base candles are always re-fetched; the higher frames move slowly
        // enough for the 60 s cache.
        let base = self.state.provider.fetch_candles(pair, timeframe, true).await?;
        let m15 = self.state.provider.fetch_candles(pair, M15_INTERVAL, false).await?;
        let h1 = self.state.provider.fetch_candles(pair, H1_INTERVAL, false).await?;

        let snapshot = TechnicalSnapshot::compute(&base);
        let htf = htf::analyze(pair, &base, &m15, &h1);
        let session = Session::current();
        let accuracy = PairAccuracy::of(pair);

        let verdict = filters::evaluate(&FilterContext {
            pair,
            session,
            accuracy,
            candles: &base,
            snapshot: &snapshot,
            htf: &htf,
        });

        let analysis = if verdict.blocked {
            let price = base.last().map(|c| c.close).unwrap_or(0.0);
            SignalAnalysis::blocked(pair, price, &snapshot, &verdict)
        } else {
            scoring::score(&ScoreContext {
                pair,
                session,
                accuracy,
                candles: &base,
                snapshot: &snapshot,
                verdict: &verdict,
            })
        };

        if analysis.confidence > 0 {
            self.state
                .trade_log
                .log_trade(&analysis, verdict.htf, session, accuracy);
        }

        Ok(analysis)
    }

    /// Generate a signal for `pair`, rescanning on rejection.
    ///
    /// Returns the first pass whose confidence clears the configured
    /// threshold; after the rescan budget runs out, the best-seen pass with
    /// its confidence forced to zero when still below threshold.
    pub async fn generate_signal(&self, pair: &str) -> Result<SignalAnalysis> {
        if !is_known_pair(pair) {
            anyhow::bail!("unknown pair: {pair}");
        }

        let (timeframe, max_rescans, min_confidence, delay_secs) = {
            let config = self.state.config.read();
            (
                config.timeframe.clone(),
                config.max_rescans.max(1),
                config.min_confidence,
                config.rescan_delay_secs,
            )
        };

        let mut best: Option<SignalAnalysis> = None;

        for attempt in 1..=max_rescans {
            let analysis = self.analysis_pass(pair, &timeframe).await?;

            if analysis.confidence >= min_confidence && analysis.confidence > 0 {
                info!(
                    pair,
                    attempt,
                    confidence = analysis.confidence,
                    signal = %analysis.signal_type,
                    "signal accepted"
                );
                return Ok(analysis);
            }

            debug!(
                pair,
                attempt,
                confidence = analysis.confidence,
                blocked = analysis.blocked,
                "pass rejected"
            );

            let replace = best
                .as_ref()
                .map_or(true, |b| analysis.confidence > b.confidence);
            if replace {
                best = Some(analysis);
            }

            if attempt < max_rescans && delay_secs > 0 {
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }
        }

        match best {
            Some(mut analysis) => {
                if analysis.confidence < min_confidence {
                    warn!(
                        pair,
                        best = analysis.confidence,
                        threshold = min_confidence,
                        "rescan budget exhausted, forcing confidence to 0"
                    );
                    analysis.confidence = 0;
                    analysis
                        .reasoning
                        .push("Rescan budget exhausted below threshold".to_string());
                }
                Ok(analysis)
            }
            // Unreachable with max_rescans >= 1, kept as a neutral fallback.
            None => {
                let candles = self.state.provider.fetch_candles(pair, &timeframe, false).await?;
                let snapshot = TechnicalSnapshot::compute(&candles);
                let price = candles.last().map(|c| c.close).unwrap_or(0.0);
                let verdict = filters::FilterVerdict {
                    blocked: true,
                    reasons: Vec::new(),
                    reasoning: vec!["No analysis pass produced a result".to_string()],
                    confirmation_strength: 0,
                    htf: crate::htf::HtfAlignment::None,
                };
                Ok(SignalAnalysis::blocked(pair, price, &snapshot, &verdict))
            }
        }
    }

    /// Scan the whole configured pair universe concurrently.
    ///
    /// Each pair runs on a single-attempt budget here; the full rescan loop
    /// is reserved for targeted single-pair calls.
    pub async fn scan_all_pairs(&self) -> ScanOutcome {
        let (pairs, timeframe) = {
            let config = self.state.config.read();
            (config.pairs.clone(), config.timeframe.clone())
        };

        let passes = pairs
            .iter()
            .map(|pair| self.analysis_pass(pair, &timeframe));
        let outcomes = join_all(passes).await;

        let mut results: Vec<SignalAnalysis> = Vec::with_capacity(pairs.len());
        for (pair, outcome) in pairs.iter().zip(outcomes) {
            match outcome {
                Ok(analysis) => {
                    self.state.record_signal(analysis.clone());
                    results.push(analysis);
                }
                Err(err) => warn!(pair, error = %err, "scan failed for pair"),
            }
        }

        results.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        let valid = results.iter().filter(|r| r.confidence > 0).count();
        let summary = ScanSummary {
            valid,
            blocked: results.len() - valid,
        };

        info!(
            valid = summary.valid,
            blocked = summary.blocked,
            "pair universe scanned"
        );

        ScanOutcome { results, summary }
    }
}
