//! Summary metrics — computed fresh from a bar series on every request.
//!
//! Return and drawdown are pure functions of the series. The trade figures
//! are a density heuristic, not a simulated strategy: one trade per five
//! observations, and a win rate made of a sign-of-return offset plus
//! uniform noise. Callers that need reproducible win rates inject a seeded
//! RNG.

use pricelab_core::domain::Bar;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One heuristic trade per this many observations.
const OBSERVATIONS_PER_TRADE: usize = 5;

/// Aggregate summary for one analyzed series.
///
/// Percentage fields are rounded to two decimals at this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestSummary {
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub trade_count: usize,
    pub profitable_trade_count: usize,
}

impl BacktestSummary {
    /// All-zero summary for an empty series; a defined, non-error case.
    pub fn zero() -> Self {
        Self {
            total_return_pct: 0.0,
            max_drawdown_pct: 0.0,
            win_rate_pct: 0.0,
            trade_count: 0,
            profitable_trade_count: 0,
        }
    }

    /// Compute the summary with the thread-local RNG.
    pub fn compute(bars: &[Bar]) -> Self {
        Self::compute_with_rng(bars, &mut rand::thread_rng())
    }

    /// Compute the summary, drawing the win-rate noise from `rng`.
    pub fn compute_with_rng<R: Rng + ?Sized>(bars: &[Bar], rng: &mut R) -> Self {
        if bars.is_empty() {
            return Self::zero();
        }

        let total_return = total_return_pct(bars);
        let max_drawdown = max_drawdown_pct(bars);

        let trade_count = bars.len() / OBSERVATIONS_PER_TRADE;
        let sign_offset = if total_return > 0.0 { 10.0 } else { -10.0 };
        // Uniform noise in [0, 10) on top of the offset; the raw value lies
        // in [40, 70), and the clamp holds the documented [0, 100] range.
        let win_rate = (50.0 + sign_offset + rng.gen::<f64>() * 10.0).clamp(0.0, 100.0);
        // Derived from the unrounded win rate.
        let profitable_trade_count = (trade_count as f64 * win_rate / 100.0).floor() as usize;

        Self {
            total_return_pct: round2(total_return),
            max_drawdown_pct: round2(max_drawdown),
            win_rate_pct: round2(win_rate),
            trade_count,
            profitable_trade_count,
        }
    }
}

/// Close-to-close return over the whole series, in percent.
pub fn total_return_pct(bars: &[Bar]) -> f64 {
    if bars.len() < 2 {
        return 0.0;
    }
    let initial = bars[0].close;
    if initial <= 0.0 {
        return 0.0;
    }
    let final_close = bars.last().unwrap().close;
    (final_close - initial) / initial * 100.0
}

/// Maximum peak-to-trough decline, in percent (≥ 0).
///
/// The running peak tracks intra-day highs and the trough uses the same
/// bar's low, so the figure is conservative relative to close-to-close.
pub fn max_drawdown_pct(bars: &[Bar]) -> f64 {
    let Some(first) = bars.first() else {
        return 0.0;
    };
    let mut peak = first.close;
    let mut max_dd = 0.0_f64;

    for bar in bars {
        if bar.high > peak {
            peak = bar.high;
        }
        if peak > 0.0 {
            let dd = (peak - bar.low) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
