// =============================================================================
// Market Data Provider — cached REST fetches with synthetic fallback
// =============================================================================
//
// Read-through cache (60 s TTL, keyed by pair + interval) over a Twelve
// Data style REST API. Transient failures retry up to 3 times with linear
// backoff (1 s x attempt). Any terminal provider failure — and a missing
// API key — falls back to the synthetic generator; candle/quote fetches
// never surface a hard failure to the analysis pipeline.
//
// The single fail-fast path is an unknown pair, rejected by name before
// any network attempt.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::synthetic;
use crate::types::{is_known_pair, Candle, Quote};

/// Cache entry lifetime.
const CACHE_TTL: Duration = Duration::from_secs(60);
/// Transient-failure retry budget.
const FETCH_ATTEMPTS: u32 = 3;
/// Candles requested from the live API per series.
const OUTPUT_SIZE: usize = 100;

/// Errors surfaced by the provider boundary.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown pair: {0}")]
    UnknownPair(String),
    #[error("all {attempts} fetch attempts failed: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

struct CachedCandles {
    fetched_at: Instant,
    candles: Vec<Candle>,
}

struct CachedQuote {
    fetched_at: Instant,
    quote: Quote,
}

/// Candle and quote source with an owned cache and explicit lifecycle —
/// constructed once at startup and injected (no ambient global state).
pub struct MarketDataProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
    candle_cache: RwLock<HashMap<(String, String), CachedCandles>>,
    quote_cache: RwLock<HashMap<String, CachedQuote>>,
}

impl MarketDataProvider {
    /// Build a provider. `api_key = None` routes every fetch straight to
    /// the synthetic generator.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: "https://api.twelvedata.com".to_string(),
            client,
            candle_cache: RwLock::new(HashMap::new()),
            quote_cache: RwLock::new(HashMap::new()),
        }
    }

    /// True when a live API key is configured.
    pub fn has_live_key(&self) -> bool {
        self.api_key.is_some()
    }

    // -------------------------------------------------------------------------
    // Candles
    // -------------------------------------------------------------------------

    /// Fetch candles for `pair` at `interval`, oldest-first.
    ///
    /// `force_refresh` bypasses the cache (the rescan controller uses this
    /// so every attempt sees fresh data). Unknown pairs fail fast; provider
    /// failures fall back to synthetic data.
    pub async fn fetch_candles(
        &self,
        pair: &str,
        interval: &str,
        force_refresh: bool,
    ) -> Result<Vec<Candle>> {
        if !is_known_pair(pair) {
            return Err(ProviderError::UnknownPair(pair.to_string()).into());
        }

        let key = (pair.to_string(), interval.to_string());

        if !force_refresh {
            let cache = self.candle_cache.read();
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < CACHE_TTL {
                    debug!(pair, interval, "candle cache hit");
                    return Ok(entry.candles.clone());
                }
            }
        }

        let candles = match &self.api_key {
            Some(api_key) => match self.fetch_candles_live(pair, interval, api_key).await {
                Ok(candles) => candles,
                Err(e) => {
                    warn!(pair, interval, error = %e, "live candle fetch failed — using synthetic data");
                    synthetic::generate_candles(pair, interval)
                }
            },
            None => {
                debug!(pair, interval, "no API key — using synthetic candles");
                synthetic::generate_candles(pair, interval)
            }
        };

        self.candle_cache.write().insert(
            key,
            CachedCandles {
                fetched_at: Instant::now(),
                candles: candles.clone(),
            },
        );

        Ok(candles)
    }

    /// Live path with bounded retry and linear backoff.
    async fn fetch_candles_live(
        &self,
        pair: &str,
        interval: &str,
        api_key: &str,
    ) -> Result<Vec<Candle>> {
        let symbol = format!("{}/{}", &pair[..3], &pair[3..]);
        let url = format!(
            "{}/time_series?symbol={}&interval={}&outputsize={}&apikey={}",
            self.base_url, symbol, interval, OUTPUT_SIZE, api_key
        );

        let mut last_error = String::new();
        for attempt in 1..=FETCH_ATTEMPTS {
            match self.request_candles(&url).await {
                Ok(candles) if !candles.is_empty() => {
                    debug!(pair, interval, count = candles.len(), attempt, "live candles fetched");
                    return Ok(candles);
                }
                Ok(_) => last_error = "provider returned an empty series".to_string(),
                Err(e) => last_error = format!("{e:#}"),
            }

            if attempt < FETCH_ATTEMPTS {
                warn!(pair, interval, attempt, error = %last_error, "candle fetch attempt failed — backing off");
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
        }

        Err(ProviderError::RetriesExhausted {
            attempts: FETCH_ATTEMPTS,
            last_error,
        }
        .into())
    }

    async fn request_candles(&self, url: &str) -> Result<Vec<Candle>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("time_series request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("time_series response was not JSON")?;

        if !status.is_success() {
            anyhow::bail!("time_series returned HTTP {status}: {body}");
        }
        if body.get("status").and_then(|s| s.as_str()) == Some("error") {
            anyhow::bail!("provider error: {}", body["message"]);
        }

        let values = body["values"]
            .as_array()
            .context("missing field values")?;

        // The API delivers newest-first; the pipeline wants oldest-first.
        let mut candles = Vec::with_capacity(values.len());
        for v in values.iter().rev() {
            candles.push(parse_candle(v)?);
        }
        Ok(candles)
    }

    // -------------------------------------------------------------------------
    // Quotes
    // -------------------------------------------------------------------------

    /// Fetch the latest quote for `pair`. Same cache/fallback policy as
    /// candles.
    pub async fn fetch_quote(&self, pair: &str) -> Result<Quote> {
        if !is_known_pair(pair) {
            return Err(ProviderError::UnknownPair(pair.to_string()).into());
        }

        {
            let cache = self.quote_cache.read();
            if let Some(entry) = cache.get(pair) {
                if entry.fetched_at.elapsed() < CACHE_TTL {
                    return Ok(entry.quote.clone());
                }
            }
        }

        let quote = match &self.api_key {
            Some(api_key) => match self.fetch_quote_live(pair, api_key).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!(pair, error = %e, "live quote fetch failed — using synthetic data");
                    synthetic::generate_quote(pair)
                }
            },
            None => synthetic::generate_quote(pair),
        };

        self.quote_cache.write().insert(
            pair.to_string(),
            CachedQuote {
                fetched_at: Instant::now(),
                quote: quote.clone(),
            },
        );

        Ok(quote)
    }

    async fn fetch_quote_live(&self, pair: &str, api_key: &str) -> Result<Quote> {
        let symbol = format!("{}/{}", &pair[..3], &pair[3..]);
        let url = format!("{}/quote?symbol={}&apikey={}", self.base_url, symbol, api_key);

        let mut last_error = String::new();
        for attempt in 1..=FETCH_ATTEMPTS {
            match self.request_quote(&url).await {
                Ok(quote) => return Ok(quote),
                Err(e) => last_error = format!("{e:#}"),
            }
            if attempt < FETCH_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
        }

        Err(ProviderError::RetriesExhausted {
            attempts: FETCH_ATTEMPTS,
            last_error,
        }
        .into())
    }

    async fn request_quote(&self, url: &str) -> Result<Quote> {
        let resp = self.client.get(url).send().await.context("quote request failed")?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await.context("quote response was not JSON")?;

        if !status.is_success() {
            anyhow::bail!("quote returned HTTP {status}: {body}");
        }
        if body.get("status").and_then(|s| s.as_str()) == Some("error") {
            anyhow::bail!("provider error: {}", body["message"]);
        }

        let price = parse_field_f64(&body, "close")?;
        let change = parse_field_f64(&body, "change").unwrap_or(0.0);
        let change_percent = parse_field_f64(&body, "percent_change").unwrap_or(0.0);

        Ok(Quote {
            price,
            bid: price,
            ask: price,
            timestamp: chrono::Utc::now().timestamp_millis(),
            change,
            change_percent,
        })
    }
}

/// Parse one `values[]` element of a time_series response.
fn parse_candle(v: &serde_json::Value) -> Result<Candle> {
    let datetime = v["datetime"]
        .as_str()
        .context("missing field datetime")?;

    // Timestamps arrive as "YYYY-MM-DD HH:MM:SS" in UTC.
    let timestamp = chrono::NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| {
            chrono::NaiveDate::parse_from_str(datetime, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
        })
        .with_context(|| format!("failed to parse datetime {datetime}"))?
        .and_utc()
        .timestamp_millis();

    Ok(Candle {
        timestamp,
        open: parse_field_f64(v, "open")?,
        high: parse_field_f64(v, "high")?,
        low: parse_field_f64(v, "low")?,
        close: parse_field_f64(v, "close")?,
        volume: parse_field_f64(v, "volume").unwrap_or(0.0),
    })
}

/// The API sends numeric values as JSON strings.
fn parse_field_f64(v: &serde_json::Value, name: &str) -> Result<f64> {
    match &v[name] {
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("failed to parse {name} as f64: {s}")),
        serde_json::Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("field {name} is not a valid f64")),
        _ => anyhow::bail!("field {name} missing or has unexpected JSON type"),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_pair_fails_fast() {
        let provider = MarketDataProvider::new(None);
        let err = provider.fetch_candles("XAUUSD", "1min", false).await.unwrap_err();
        let provider_err = err.downcast_ref::<ProviderError>().expect("typed error");
        assert!(matches!(provider_err, ProviderError::UnknownPair(p) if p == "XAUUSD"));

        let err = provider.fetch_quote("XAUUSD").await.unwrap_err();
        assert!(err.downcast_ref::<ProviderError>().is_some());
    }

    #[tokio::test]
    async fn missing_key_falls_back_to_synthetic() {
        let provider = MarketDataProvider::new(None);
        let candles = provider.fetch_candles("EURUSD", "1min", false).await.unwrap();
        assert_eq!(candles.len(), synthetic::SYNTHETIC_CANDLES);

        let quote = provider.fetch_quote("EURUSD").await.unwrap();
        assert!(quote.price > 0.0);
    }

    #[tokio::test]
    async fn cache_returns_identical_series() {
        let provider = MarketDataProvider::new(None);
        let first = provider.fetch_candles("GBPUSD", "5min", false).await.unwrap();
        let second = provider.fetch_candles("GBPUSD", "5min", false).await.unwrap();
        // Within the TTL the cached series comes back byte-identical.
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].timestamp, second[0].timestamp);
        assert_eq!(first[0].close, second[0].close);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_cache() {
        let provider = MarketDataProvider::new(None);
        let first = provider.fetch_candles("GBPUSD", "5min", false).await.unwrap();
        let refreshed = provider.fetch_candles("GBPUSD", "5min", true).await.unwrap();
        // A fresh synthetic walk almost surely differs from the cached one.
        let same = first
            .iter()
            .zip(refreshed.iter())
            .all(|(a, b)| a.close == b.close);
        assert!(!same, "force_refresh must regenerate the series");
    }

    #[tokio::test]
    async fn empty_key_counts_as_missing() {
        let provider = MarketDataProvider::new(Some(String::new()));
        assert!(!provider.has_live_key());
        let candles = provider.fetch_candles("EURUSD", "1min", false).await.unwrap();
        assert!(!candles.is_empty());
    }

    #[test]
    fn parse_candle_from_string_fields() {
        let v = serde_json::json!({
            "datetime": "2026-08-28 14:05:00",
            "open": "1.0850",
            "high": "1.0862",
            "low": "1.0847",
            "close": "1.0858",
            "volume": "1200"
        });
        let c = parse_candle(&v).unwrap();
        assert!((c.open - 1.0850).abs() < 1e-9);
        assert!((c.close - 1.0858).abs() < 1e-9);
        assert!(c.timestamp > 0);
        assert!((c.volume - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn parse_candle_missing_field_errors() {
        let v = serde_json::json!({ "datetime": "2026-08-28 14:05:00", "open": "1.0" });
        assert!(parse_candle(&v).is_err());
    }
}
