// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the signal
// pipeline consumes.  Every function is total over its input: short series
// never error, they fall back to a documented neutral/degenerate value so
// the analysis pass always completes.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod patterns;
pub mod rsi;
pub mod snapshot;
pub mod stochastic;
pub mod supertrend;

pub use snapshot::TechnicalSnapshot;
