// =============================================================================
// Engine Configuration — tunable settings with atomic save
// =============================================================================
//
// Every tunable parameter of the signal engine lives here.  Persistence
// uses an atomic tmp + rename pattern to prevent corruption on crash.  All
// fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::PAIR_UNIVERSE;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_pairs() -> Vec<String> {
    PAIR_UNIVERSE.iter().map(|(p, _)| p.to_string()).collect()
}

fn default_timeframe() -> String {
    "5min".to_string()
}

fn default_max_rescans() -> u32 {
    5
}

fn default_min_confidence() -> u32 {
    70
}

fn default_rescan_delay_secs() -> u64 {
    1
}

fn default_scan_interval_secs() -> u64 {
    300
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Tunable parameters for the signal engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pairs scanned by the batch loop.
    #[serde(default = "default_pairs")]
    pub pairs: Vec<String>,

    /// Base analysis timeframe (provider interval string).
    #[serde(default = "default_timeframe")]
    pub timeframe: String,

    /// Twelve Data API key. Empty means run on the synthetic generator.
    #[serde(default)]
    pub api_key: String,

    /// Maximum analysis attempts per pair before giving up.
    #[serde(default = "default_max_rescans")]
    pub max_rescans: u32,

    /// Confidence at or above which a pass is accepted immediately.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u32,

    /// Pacing delay between rejected rescan attempts, in seconds.
    #[serde(default = "default_rescan_delay_secs")]
    pub rescan_delay_secs: u64,

    /// Interval between full scans of the pair universe, in seconds.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pairs: default_pairs(),
            timeframe: default_timeframe(),
            api_key: String::new(),
            max_rescans: default_max_rescans(),
            min_confidence: default_min_confidence(),
            rescan_delay_secs: default_rescan_delay_secs(),
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            pairs = config.pairs.len(),
            timeframe = %config.timeframe,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise engine config")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.pairs.len(), 12);
        assert_eq!(cfg.pairs[0], "EURUSD");
        assert_eq!(cfg.timeframe, "5min");
        assert!(cfg.api_key.is_empty());
        assert_eq!(cfg.max_rescans, 5);
        assert_eq!(cfg.min_confidence, 70);
        assert_eq!(cfg.rescan_delay_secs, 1);
        assert_eq!(cfg.scan_interval_secs, 300);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.max_rescans, 5);
        assert_eq!(cfg.min_confidence, 70);
        assert_eq!(cfg.pairs.len(), 12);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "timeframe": "1min", "pairs": ["EURUSD"] }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.timeframe, "1min");
        assert_eq!(cfg.pairs, vec!["EURUSD"]);
        assert_eq!(cfg.min_confidence, 70);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.pairs, cfg2.pairs);
        assert_eq!(cfg.max_rescans, cfg2.max_rescans);
        assert_eq!(cfg.timeframe, cfg2.timeframe);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("meridian-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut cfg = EngineConfig::default();
        cfg.min_confidence = 80;
        cfg.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.min_confidence, 80);

        std::fs::remove_file(&path).ok();
    }
}
