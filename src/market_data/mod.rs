// =============================================================================
// Market Data Module
// =============================================================================
//
// Candle and quote acquisition for the signal pipeline: a live REST
// provider with a read-through TTL cache, retry-with-backoff, and a
// synthetic generator fallback so a missing key or a provider outage never
// hard-fails an analysis pass.

pub mod provider;
pub mod synthetic;

pub use provider::{MarketDataProvider, ProviderError};
