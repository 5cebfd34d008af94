// =============================================================================
// Meridian FX Signal Engine — Main Entry Point
// =============================================================================
//
// Without a TWELVE_DATA_API_KEY the engine runs entirely on the synthetic
// candle generator, which makes it safe to start anywhere.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod app_state;
mod config;
mod engine;
mod filters;
mod htf;
mod indicators;
mod market_data;
mod notifier;
mod scoring;
mod session;
mod trade_log;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::EngineState;
use crate::config::EngineConfig;
use crate::engine::SignalEngine;
use crate::notifier::SignalNotifier;
use crate::types::{SignalType, TradeResult};

const CONFIG_PATH: &str = "engine_config.json";

/// Pending trades settle against a fresh quote once this old.
const SETTLEMENT_AGE_MINUTES: i64 = 5;
/// How often the settlement sweep runs.
const SETTLEMENT_SWEEP_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Meridian FX Signal Engine — Starting Up          ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = EngineConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // Override pairs and API key from env if available.
    if let Ok(pairs) = std::env::var("MERIDIAN_PAIRS") {
        let pairs: Vec<String> = pairs
            .split(',')
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect();
        if !pairs.is_empty() {
            config.pairs = pairs;
        }
    }
    if let Ok(key) = std::env::var("TWELVE_DATA_API_KEY") {
        config.api_key = key;
    }

    info!(pairs = ?config.pairs, timeframe = %config.timeframe, "Configured scan universe");

    // ── 2. Build shared state & engine ───────────────────────────────────
    let scan_interval = config.scan_interval_secs;
    let state = Arc::new(EngineState::new(config));
    let engine = SignalEngine::new(state.clone());
    let notifier = SignalNotifier::new();

    if state.provider.has_live_key() {
        info!("Live market data enabled");
    } else {
        info!("No API key configured — running on synthetic market data");
    }

    // ── 3. Scan loop ─────────────────────────────────────────────────────
    let scan_state = state.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(scan_interval.max(1)));
        loop {
            interval.tick().await;
            let outcome = engine.scan_all_pairs().await;
            for analysis in &outcome.results {
                if analysis.confidence > 0 {
                    notifier.forward(analysis);
                }
            }
            let stats = scan_state.trade_log.performance_stats(None, None);
            info!(
                valid = outcome.summary.valid,
                blocked = outcome.summary.blocked,
                settled = stats.total,
                win_rate = stats.win_rate,
                uptime_secs = scan_state.start_time.elapsed().as_secs(),
                "scan cycle complete"
            );
            for setup in scan_state.trade_log.best_setups().iter().take(3) {
                info!(
                    pair = %setup.pair,
                    session = %setup.session,
                    trades = setup.trades,
                    win_rate = setup.win_rate,
                    "top performing setup"
                );
            }
        }
    });

    // ── 4. Settlement sweep ──────────────────────────────────────────────
    // Resolves aged Pending entries against a fresh quote: a CALL wins when
    // price sits above its entry, a PUT below.
    let settle_state = state.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(SETTLEMENT_SWEEP_SECS));
        loop {
            interval.tick().await;
            let now = chrono::Utc::now();
            let due: Vec<_> = settle_state
                .trade_log
                .recent(usize::MAX)
                .into_iter()
                .filter(|e| e.result == TradeResult::Pending)
                .filter(|e| now - e.timestamp >= chrono::Duration::minutes(SETTLEMENT_AGE_MINUTES))
                .collect();

            for entry in due {
                match settle_state.provider.fetch_quote(&entry.pair).await {
                    Ok(quote) => {
                        let won = match entry.signal_type {
                            SignalType::Call => quote.price > entry.entry,
                            SignalType::Put => quote.price < entry.entry,
                        };
                        let result = if won { TradeResult::Win } else { TradeResult::Loss };
                        settle_state
                            .trade_log
                            .settle(entry.id, quote.price, now, result);
                    }
                    Err(e) => {
                        warn!(pair = %entry.pair, error = %e, "settlement quote fetch failed")
                    }
                }
            }
        }
    });

    info!("Engine running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save engine config on shutdown");
    }

    info!("Meridian FX shut down complete.");
    Ok(())
}
