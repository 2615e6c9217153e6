//! Synthetic series generator — bounded random walk for demo mode.
//!
//! One bar per business day. The walk drifts slightly upward with ~2%
//! daily volatility; high/low expand around the open/close envelope by a
//! random offset bounded by twice the day's move, so every bar satisfies
//! the OHLC invariants by construction. Prices are rounded to cents at
//! record creation while the walk itself carries the unrounded close.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;

use crate::domain::Bar;

/// Default starting price when the caller does not supply one.
pub const DEFAULT_BASE_PRICE: f64 = 150.0;

const DAILY_VOLATILITY: f64 = 0.02;
const MIN_VOLUME: u64 = 1_000_000;
const VOLUME_SPREAD: u64 = 5_000_000;

/// Generate one bar per business day in `[start, end]`, walking from
/// `base_price`. Series length depends only on the business-day count.
pub fn generate_bars<R: Rng + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    base_price: f64,
    rng: &mut R,
) -> Vec<Bar> {
    let mut bars = Vec::new();
    let mut price = base_price;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let drift = (rng.gen::<f64>() - 0.48) * 0.01;
        let open = price;
        let change = open * (drift + (rng.gen::<f64>() - 0.5) * DAILY_VOLATILITY);
        let close = open + change;

        let max_move = change.abs() * 2.0;
        let high = open.max(close) + rng.gen::<f64>() * max_move;
        let low = open.min(close) - rng.gen::<f64>() * max_move;
        let volume = MIN_VOLUME + rng.gen_range(0..VOLUME_SPREAD);

        bars.push(Bar {
            date: current,
            open: round_cents(open),
            high: round_cents(high),
            low: round_cents(low),
            close: round_cents(close),
            volume: Some(volume),
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
