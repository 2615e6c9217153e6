//! Data provider trait and structured failure types.
//!
//! The `DataProvider` trait abstracts over live market data vendors so the
//! acquisition chain can try them in priority order and tests can script
//! them. Adapters normalize vendor payloads into canonical bars and nothing
//! else: no retries, no fallback — ordering is the chain's job.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Bar;

/// Structured failure types for fetch operations.
///
/// The acquisition chain inspects these to decide whether to try the next
/// vendor; none of them escape to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("missing API credential for {provider}")]
    MissingCredential { provider: &'static str },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rate limited by provider: {notice}")]
    RateLimited { notice: String },

    #[error("provider rejected symbol '{symbol}': {message}")]
    InvalidSymbol { symbol: String, message: String },

    #[error("no bars between {start} and {end} for '{symbol}'")]
    EmptyRange {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("response format changed: {0}")]
    Malformed(String),
}

/// Trait for live market data vendors.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Vendor name, used in logs and acquisition reports.
    fn name(&self) -> &'static str;

    /// Fetch daily bars for `symbol` over the closed range `[start, end]`,
    /// sorted ascending by date. One outbound call per invocation.
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError>;
}
