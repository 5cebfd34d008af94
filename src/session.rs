// =============================================================================
// Session & Pair Classification
// =============================================================================
//
// Maps wall-clock time (UTC) to a trading session and pairs to their
// historical-accuracy tier. Both feed the filter stage (session/pair
// restrictions) and the scorer (strict mode, accuracy bonus).

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Trading session buckets.
///
/// Morning 06:00-11:59 UTC, Afternoon 12:00-17:59, Evening otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    Morning,
    Afternoon,
    Evening,
}

impl Session {
    /// Session for the current wall-clock time.
    pub fn current() -> Self {
        Self::at(Utc::now())
    }

    /// Session for an arbitrary instant.
    pub fn at(time: DateTime<Utc>) -> Self {
        match time.hour() {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Morning => write!(f, "MORNING"),
            Self::Afternoon => write!(f, "AFTERNOON"),
            Self::Evening => write!(f, "EVENING"),
        }
    }
}

/// Historical signal-accuracy tier of a currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairAccuracy {
    High,
    Medium,
    Low,
}

impl PairAccuracy {
    /// Classify a pair. Pairs outside the universe fall to Low.
    pub fn of(pair: &str) -> Self {
        match pair {
            "EURUSD" | "GBPUSD" | "USDJPY" | "AUDUSD" => Self::High,
            "USDCAD" | "USDCHF" | "EURJPY" | "EURGBP" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for PairAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}
