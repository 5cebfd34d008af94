// =============================================================================
// Synthetic Market Data — deterministic-shape random walk
// =============================================================================
//
// Fallback candle/quote source used whenever the live provider is
// unavailable or no API key is configured. Prices random-walk around the
// pair's fixed base price with pip-scaled noise, so every generated series
// has a realistic shape for the indicator battery while remaining cheap
// and offline.

use chrono::Utc;
use rand::Rng;

use crate::types::{base_price, pip_size, Candle, Quote};

/// Number of candles a synthetic series carries.
pub const SYNTHETIC_CANDLES: usize = 120;

/// Interval length in milliseconds for timestamp spacing.
fn interval_ms(interval: &str) -> i64 {
    match interval {
        "1min" => 60_000,
        "5min" => 300_000,
        "15min" => 900_000,
        "30min" => 1_800_000,
        "1h" => 3_600_000,
        "4h" => 14_400_000,
        _ => 60_000,
    }
}

/// Generate a synthetic candle series for `pair` at `interval`.
///
/// The walk is seeded from the pair's base-price table; unknown pairs walk
/// around 1.0. Candles honour the OHLC invariant and carry strictly
/// increasing timestamps ending at roughly the current wall clock.
pub fn generate_candles(pair: &str, interval: &str) -> Vec<Candle> {
    let mut rng = rand::thread_rng();
    let pip = pip_size(pair);
    let base = base_price(pair).unwrap_or(1.0);
    let step_ms = interval_ms(interval);

    // Longer intervals swing wider.
    let scale = (step_ms as f64 / 60_000.0).sqrt();
    let drift: f64 = rng.gen_range(-0.3..0.3);

    let now = Utc::now().timestamp_millis();
    let start = now - step_ms * SYNTHETIC_CANDLES as i64;

    let mut price = base;
    let mut candles = Vec::with_capacity(SYNTHETIC_CANDLES);

    for i in 0..SYNTHETIC_CANDLES {
        let open = price;
        let move_pips: f64 = rng.gen_range(-8.0..8.0) + drift;
        let close = open + move_pips * pip * scale;

        let wick_up: f64 = rng.gen_range(0.5..4.0) * pip * scale;
        let wick_down: f64 = rng.gen_range(0.5..4.0) * pip * scale;

        let high = open.max(close) + wick_up;
        let low = open.min(close) - wick_down;

        candles.push(Candle {
            timestamp: start + step_ms * i as i64,
            open,
            high,
            low,
            close,
            volume: rng.gen_range(800.0..5000.0),
        });

        price = close;
    }

    candles
}

/// Generate a synthetic quote for `pair`, consistent with the base table.
pub fn generate_quote(pair: &str) -> Quote {
    let mut rng = rand::thread_rng();
    let pip = pip_size(pair);
    let base = base_price(pair).unwrap_or(1.0);

    let offset: f64 = rng.gen_range(-20.0..20.0) * pip;
    let price = base + offset;
    let spread = rng.gen_range(0.5..2.0) * pip;

    let change: f64 = rng.gen_range(-15.0..15.0) * pip;
    let change_percent = if price != 0.0 {
        change / price * 100.0
    } else {
        0.0
    };

    Quote {
        price,
        bid: price - spread / 2.0,
        ask: price + spread / 2.0,
        timestamp: Utc::now().timestamp_millis(),
        change,
        change_percent,
    }
}
