// =============================================================================
// Signal Notifier — outbound message gate
// =============================================================================
//
// Renders accepted signals for the downstream delivery channel. The veto
// here is a re-check, not a trust boundary: blocked or zero-confidence
// analyses must already have been dropped upstream, but the notifier
// refuses them again on its own typed flags.

use tracing::{info, warn};

use crate::scoring::SignalAnalysis;

#[derive(Debug, Default)]
pub struct SignalNotifier;

impl SignalNotifier {
    pub fn new() -> Self {
        Self
    }

    /// Forward an accepted signal. Returns false (and logs a warning)
    /// when the analysis is blocked or carries zero confidence.
    pub fn forward(&self, analysis: &SignalAnalysis) -> bool {
        if analysis.confidence == 0 || analysis.blocked {
            warn!(
                pair = %analysis.pair,
                confidence = analysis.confidence,
                blocked = analysis.blocked,
                "refusing to forward no-trade analysis"
            );
            return false;
        }

        let message = Self::render(analysis);
        info!(pair = %analysis.pair, "signal forwarded\n{message}");
        true
    }

    /// Plain-text rendering of an accepted signal.
    fn render(analysis: &SignalAnalysis) -> String {
        let mut lines = vec![
            format!("{} {}", analysis.pair, analysis.signal_type),
            format!("Confidence: {}%", analysis.confidence),
            format!("Entry: {:.5}", analysis.entry),
            format!("Stop: {:.5}", analysis.stop_loss),
            format!("Target: {:.5}", analysis.take_profit),
        ];
        for reason in &analysis.reasoning {
            lines.push(format!("  - {reason}"));
        }
        lines.join("\n")
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BlockReason, FilterVerdict};
    use crate::htf::HtfAlignment;
    use crate::indicators::TechnicalSnapshot;
    use crate::types::Candle;

    fn blocked_analysis() -> SignalAnalysis {
        let candles: Vec<Candle> = (0..30)
            .map(|i| Candle {
                timestamp: i * 60_000,
                open: 1.0,
                high: 1.001,
                low: 0.999,
                close: 1.0005,
                volume: 0.0,
            })
            .collect();
        let snapshot = TechnicalSnapshot::compute(&candles);
        let verdict = FilterVerdict {
            blocked: true,
            reasons: vec![BlockReason::ExtremeOscillator],
            reasoning: vec!["BLOCKED: EXTREME RSI 98.0 outside [3, 97]".to_string()],
            confirmation_strength: 0,
            htf: HtfAlignment::Full,
        };
        SignalAnalysis::blocked("EURUSD", 1.0005, &snapshot, &verdict)
    }

    #[test]
    fn refuses_blocked_analysis() {
        let notifier = SignalNotifier::new();
        assert!(!notifier.forward(&blocked_analysis()));
    }

    #[test]
    fn refuses_zero_confidence_even_when_not_blocked() {
        let mut analysis = blocked_analysis();
        analysis.blocked = false;
        // Soft-gated results look exactly like this: unblocked, zeroed.
        let notifier = SignalNotifier::new();
        assert!(!notifier.forward(&analysis));
    }

    #[test]
    fn forwards_accepted_analysis() {
        let mut analysis = blocked_analysis();
        analysis.blocked = false;
        analysis.confidence = 85;
        analysis.block_reasons.clear();
        let notifier = SignalNotifier::new();
        assert!(notifier.forward(&analysis));
    }

    #[test]
    fn render_carries_the_essentials() {
        let mut analysis = blocked_analysis();
        analysis.blocked = false;
        analysis.confidence = 85;
        let message = SignalNotifier::render(&analysis);
        assert!(message.contains("EURUSD CALL"));
        assert!(message.contains("Confidence: 85%"));
        assert!(message.contains("Entry:"));
    }
}
