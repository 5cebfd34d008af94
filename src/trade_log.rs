// =============================================================================
// Trade Log — bounded signal history with settlement and stats
// =============================================================================
//
// Every non-zero-confidence signal is appended as a PENDING entry. An
// external settlement feed later resolves entries to WIN/LOSS, either by
// entry id (the primary channel) or by matching entry price within a
// 10-minute window (the legacy channel, kept for the settlement
// collaborator's call shape).
//
// Thread safety: parking_lot::RwLock around a VecDeque ring buffer,
// capacity 500, oldest evicted first.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::htf::HtfAlignment;
use crate::scoring::SignalAnalysis;
use crate::session::{PairAccuracy, Session};
use crate::types::{CandlePattern, SignalType, TradeResult};

/// Maximum number of entries retained before FIFO eviction.
const MAX_ENTRIES: usize = 500;
/// Legacy settlement: entry must sit within this window of the exit time.
const SETTLE_WINDOW_MINUTES: i64 = 10;
/// Legacy settlement: entry-price match tolerance.
const PRICE_EPSILON: f64 = 1e-9;
/// Minimum settled trades for a (pair, session) group to rank as a setup.
const MIN_SETUP_TRADES: usize = 5;
/// Best-setups report length.
const TOP_SETUPS: usize = 10;

/// One logged signal. `result` moves from Pending to Win/Loss exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub pair: String,
    pub signal_type: SignalType,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub confidence: u32,
    pub rsi: f64,
    pub stochastic_k: f64,
    pub candle_pattern: Option<CandlePattern>,
    pub htf_alignment: HtfAlignment,
    pub session: Session,
    pub pair_accuracy: PairAccuracy,
    pub result: TradeResult,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
}

/// Aggregate outcome counters over settled entries.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    /// Wins / settled, in percent. 0 when nothing is settled.
    pub win_rate: f64,
    pub avg_confidence: f64,
}

/// Win-rate ranking for one (pair, session) group.
#[derive(Debug, Clone, Serialize)]
pub struct SetupStats {
    pub pair: String,
    pub session: Session,
    pub trades: usize,
    pub win_rate: f64,
}

/// Bounded in-memory trade history shared across scans.
pub struct TradeLog {
    entries: RwLock<VecDeque<TradeLogEntry>>,
}

impl Default for TradeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(MAX_ENTRIES)),
        }
    }

    /// Append a Pending entry for an accepted signal and return its id.
    /// Evicts the oldest entry once the 500 cap is reached.
    pub fn log_trade(
        &self,
        analysis: &SignalAnalysis,
        htf_alignment: HtfAlignment,
        session: Session,
        pair_accuracy: PairAccuracy,
    ) -> Uuid {
        let entry = TradeLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            pair: analysis.pair.clone(),
            signal_type: analysis.signal_type,
            entry: analysis.entry,
            stop_loss: analysis.stop_loss,
            take_profit: analysis.take_profit,
            confidence: analysis.confidence,
            rsi: analysis.technicals.rsi,
            stochastic_k: analysis.technicals.stochastic.k,
            candle_pattern: analysis.technicals.candle_pattern,
            htf_alignment,
            session,
            pair_accuracy,
            result: TradeResult::Pending,
            exit_price: None,
            exit_time: None,
        };
        let id = entry.id;

        let mut entries = self.entries.write();
        if entries.len() >= MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
        debug!(%id, total = entries.len(), "trade logged");
        id
    }

    /// Settle a Pending entry by id. Returns false when the id is unknown
    /// or the entry was already settled.
    pub fn settle(
        &self,
        id: Uuid,
        exit_price: f64,
        exit_time: DateTime<Utc>,
        result: TradeResult,
    ) -> bool {
        if result == TradeResult::Pending {
            warn!(%id, "refusing to settle back to pending");
            return false;
        }
        let mut entries = self.entries.write();
        match entries
            .iter_mut()
            .find(|e| e.id == id && e.result == TradeResult::Pending)
        {
            Some(entry) => {
                entry.result = result;
                entry.exit_price = Some(exit_price);
                entry.exit_time = Some(exit_time);
                true
            }
            None => {
                warn!(%id, "settlement target not found or already settled");
                false
            }
        }
    }

    /// Legacy settlement channel: first Pending entry whose entry price
    /// matches and whose log time falls within 10 minutes of `exit_time`.
    /// First match wins; ambiguity between same-price entries is a known
    /// limitation of this channel.
    pub fn settle_by_entry(
        &self,
        entry_price: f64,
        exit_price: f64,
        exit_time: DateTime<Utc>,
        result: TradeResult,
    ) -> bool {
        if result == TradeResult::Pending {
            return false;
        }
        let window = Duration::minutes(SETTLE_WINDOW_MINUTES);
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| {
            e.result == TradeResult::Pending
                && (e.entry - entry_price).abs() < PRICE_EPSILON
                && (exit_time - e.timestamp).abs() <= window
        }) {
            Some(entry) => {
                entry.result = result;
                entry.exit_price = Some(exit_price);
                entry.exit_time = Some(exit_time);
                true
            }
            None => false,
        }
    }

    /// Outcome counters over settled entries, optionally filtered by pair
    /// and/or session.
    pub fn performance_stats(
        &self,
        pair: Option<&str>,
        session: Option<Session>,
    ) -> PerformanceStats {
        let entries = self.entries.read();
        let settled: Vec<&TradeLogEntry> = entries
            .iter()
            .filter(|e| e.result != TradeResult::Pending)
            .filter(|e| pair.map_or(true, |p| e.pair == p))
            .filter(|e| session.map_or(true, |s| e.session == s))
            .collect();

        let total = settled.len();
        let wins = settled
            .iter()
            .filter(|e| e.result == TradeResult::Win)
            .count();
        let losses = total - wins;
        let win_rate = if total > 0 {
            wins as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let avg_confidence = if total > 0 {
            settled.iter().map(|e| e.confidence as f64).sum::<f64>() / total as f64
        } else {
            0.0
        };

        PerformanceStats {
            total,
            wins,
            losses,
            win_rate,
            avg_confidence,
        }
    }

    /// Top (pair, session) groups by win rate: settled entries only, at
    /// least 5 trades per group, at most 10 groups returned.
    pub fn best_setups(&self) -> Vec<SetupStats> {
        let entries = self.entries.read();
        let mut groups: HashMap<(String, Session), (usize, usize)> = HashMap::new();
        for e in entries.iter().filter(|e| e.result != TradeResult::Pending) {
            let slot = groups.entry((e.pair.clone(), e.session)).or_insert((0, 0));
            slot.0 += 1;
            if e.result == TradeResult::Win {
                slot.1 += 1;
            }
        }

        let mut setups: Vec<SetupStats> = groups
            .into_iter()
            .filter(|(_, (trades, _))| *trades >= MIN_SETUP_TRADES)
            .map(|((pair, session), (trades, wins))| SetupStats {
                pair,
                session,
                trades,
                win_rate: wins as f64 / trades as f64 * 100.0,
            })
            .collect();
        setups.sort_by(|a, b| {
            b.win_rate
                .partial_cmp(&a.win_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        setups.truncate(TOP_SETUPS);
        setups
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the newest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<TradeLogEntry> {
        let entries = self.entries.read();
        entries.iter().rev().take(limit).cloned().collect()
    }
}
