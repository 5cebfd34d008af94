// =============================================================================
// Central Engine State
// =============================================================================
//
// Ties the long-lived pieces together: configuration, the candle provider
// with its cache, the trade log, and a short audit trail of recent signal
// results. Shared across async tasks via `Arc<EngineState>`.
//
// Thread safety:
//   - parking_lot::RwLock for all mutable shared collections.
//   - The provider and trade log manage their own interior mutability.
// =============================================================================

use std::collections::VecDeque;

use parking_lot::RwLock;

use crate::config::EngineConfig;
use crate::market_data::MarketDataProvider;
use crate::scoring::SignalAnalysis;
use crate::trade_log::TradeLog;

/// Maximum number of recent signal results retained for inspection.
const MAX_RECENT_SIGNALS: usize = 100;

/// Central engine state shared across all async tasks via `Arc<EngineState>`.
pub struct EngineState {
    pub config: RwLock<EngineConfig>,
    pub provider: MarketDataProvider,
    pub trade_log: TradeLog,
    /// Audit trail of the newest scan results, newest last.
    pub recent_signals: RwLock<VecDeque<SignalAnalysis>>,
    /// Instant when the engine was started. Used for uptime logging.
    pub start_time: std::time::Instant,
}

impl EngineState {
    pub fn new(config: EngineConfig) -> Self {
        let api_key = if config.api_key.is_empty() {
            None
        } else {
            Some(config.api_key.clone())
        };
        Self {
            config: RwLock::new(config),
            provider: MarketDataProvider::new(api_key),
            trade_log: TradeLog::new(),
            recent_signals: RwLock::new(VecDeque::with_capacity(MAX_RECENT_SIGNALS)),
            start_time: std::time::Instant::now(),
        }
    }

    /// Record a finished analysis in the audit trail, evicting the oldest
    /// once the cap is reached.
    pub fn record_signal(&self, analysis: SignalAnalysis) {
        let mut recent = self.recent_signals.write();
        if recent.len() >= MAX_RECENT_SIGNALS {
            recent.pop_front();
        }
        recent.push_back(analysis);
    }
}
