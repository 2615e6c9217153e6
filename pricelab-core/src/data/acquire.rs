//! Acquisition chain — live vendors in priority order, synthetic fallback.
//!
//! The fallback order is data, not nested error handling: a pure
//! [`next_state`] function maps (state, attempt outcome) to the next state
//! and the chain walks it. Live failures are logged and recorded here; the
//! caller only ever sees a usable series or a terminal input error.

use chrono::NaiveDate;
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::alpha_vantage::AlphaVantageProvider;
use super::finnhub::FinnhubProvider;
use super::provider::{DataProvider, FetchError};
use super::synthetic;
use crate::config::{ProviderKind, SourceConfig};
use crate::domain::Bar;

/// Where a (series, metrics) pair ultimately came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// A live vendor delivered the series.
    Real,
    /// Every live attempt failed or was skipped; the series is synthetic.
    Demo,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Provenance::Real => "real",
            Provenance::Demo => "demo",
        })
    }
}

/// Terminal errors: structurally invalid input, detected before any vendor
/// is tried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcquireError {
    #[error("ticker must not be empty")]
    EmptyTicker,

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Chain state. `TryingProvider(i)` indexes into the configured priority
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireState {
    TryingProvider(usize),
    Fallback,
    Done(Provenance),
}

/// What one step of the chain produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The step produced a usable, non-empty series.
    Delivered,
    /// The step failed; the failure has been recorded.
    Failed,
}

/// Pure decision function for the chain.
///
/// The synthetic fallback cannot fail, so `(Fallback, Failed)` does not
/// occur at runtime; it maps to `Done(Demo)` for totality. `Done` absorbs.
pub fn next_state(state: AcquireState, outcome: AttemptOutcome, live_count: usize) -> AcquireState {
    match (state, outcome) {
        (AcquireState::TryingProvider(_), AttemptOutcome::Delivered) => {
            AcquireState::Done(Provenance::Real)
        }
        (AcquireState::TryingProvider(i), AttemptOutcome::Failed) => {
            if i + 1 < live_count {
                AcquireState::TryingProvider(i + 1)
            } else {
                AcquireState::Fallback
            }
        }
        (AcquireState::Fallback, _) => AcquireState::Done(Provenance::Demo),
        (AcquireState::Done(p), _) => AcquireState::Done(p),
    }
}

/// Result of one acquisition.
#[derive(Debug)]
pub struct Acquired {
    pub bars: Vec<Bar>,
    pub provenance: Provenance,
    /// Live attempts that did not deliver, in attempt order. Informational:
    /// these were consumed, not raised.
    pub failures: Vec<(&'static str, FetchError)>,
}

/// The acquisition chain: configured live vendors plus the synthetic
/// fallback.
pub struct Acquisition {
    providers: Vec<Box<dyn DataProvider>>,
    /// Vendors dropped at construction for lack of a credential, reported
    /// as skipped on every live acquisition.
    unavailable: Vec<&'static str>,
}

impl Acquisition {
    /// Build the chain from explicit configuration.
    ///
    /// Vendors without a credential are dropped from the live chain up
    /// front; each acquisition still reports them as skipped attempts.
    pub fn from_config(config: &SourceConfig) -> Self {
        let mut providers: Vec<Box<dyn DataProvider>> = Vec::new();
        let mut unavailable = Vec::new();
        for kind in &config.priority {
            let built: Result<Box<dyn DataProvider>, FetchError> = match kind {
                ProviderKind::AlphaVantage => AlphaVantageProvider::from_config(config)
                    .map(|p| Box::new(p) as Box<dyn DataProvider>),
                ProviderKind::Finnhub => FinnhubProvider::from_config(config)
                    .map(|p| Box::new(p) as Box<dyn DataProvider>),
            };
            match built {
                Ok(provider) => providers.push(provider),
                Err(e) => {
                    warn!("{kind} dropped from the live chain: {e}");
                    unavailable.push(kind.as_str());
                }
            }
        }
        Self {
            providers,
            unavailable,
        }
    }

    /// Build the chain from already-constructed vendors. Used by tests and
    /// by callers wiring custom sources.
    pub fn with_providers(providers: Vec<Box<dyn DataProvider>>) -> Self {
        Self {
            providers,
            unavailable: Vec::new(),
        }
    }

    /// Acquire a series for `ticker`, drawing a random demo base price if
    /// the fallback engages.
    pub async fn acquire(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        prefer_live: bool,
    ) -> Result<Acquired, AcquireError> {
        self.acquire_with_base_price(ticker, start, end, prefer_live, None)
            .await
    }

    /// Acquire a series, using `base_price` for the synthetic fallback when
    /// supplied.
    pub async fn acquire_with_base_price(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        prefer_live: bool,
        base_price: Option<f64>,
    ) -> Result<Acquired, AcquireError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(AcquireError::EmptyTicker);
        }
        if start > end {
            return Err(AcquireError::InvalidDateRange { start, end });
        }

        let live_count = if prefer_live { self.providers.len() } else { 0 };
        let mut failures: Vec<(&'static str, FetchError)> = if prefer_live {
            self.unavailable
                .iter()
                .map(|&name| (name, FetchError::MissingCredential { provider: name }))
                .collect()
        } else {
            Vec::new()
        };

        let mut state = if live_count > 0 {
            AcquireState::TryingProvider(0)
        } else {
            AcquireState::Fallback
        };
        let mut series: Vec<Bar> = Vec::new();

        loop {
            state = match state {
                AcquireState::TryingProvider(i) => {
                    let provider = &self.providers[i];
                    debug!("trying {} for {ticker} {start}..{end}", provider.name());
                    match provider.fetch(ticker, start, end).await {
                        Ok(bars) if !bars.is_empty() => {
                            series = bars;
                            next_state(state, AttemptOutcome::Delivered, live_count)
                        }
                        Ok(_) => {
                            warn!("{} returned an empty series for {ticker}", provider.name());
                            failures.push((
                                provider.name(),
                                FetchError::EmptyRange {
                                    symbol: ticker.to_string(),
                                    start,
                                    end,
                                },
                            ));
                            next_state(state, AttemptOutcome::Failed, live_count)
                        }
                        Err(e) => {
                            warn!("{} failed for {ticker}: {e}", provider.name());
                            failures.push((provider.name(), e));
                            next_state(state, AttemptOutcome::Failed, live_count)
                        }
                    }
                }
                AcquireState::Fallback => {
                    let mut rng = rand::thread_rng();
                    let base = base_price.unwrap_or_else(|| rng.gen_range(100.0..300.0));
                    debug!("falling back to synthetic series for {ticker} (base {base:.2})");
                    series = synthetic::generate_bars(start, end, base, &mut rng);
                    next_state(state, AttemptOutcome::Delivered, live_count)
                }
                AcquireState::Done(provenance) => {
                    return Ok(Acquired {
                        bars: series,
                        provenance,
                        failures,
                    });
                }
            };
        }
    }
}
