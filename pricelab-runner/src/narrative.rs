//! Narrative collaborator contract.
//!
//! The pipeline hands a ticker and recent headlines to an external
//! narrative service and gets back a sentiment read. The exchange runs
//! concurrently with acquisition and never gates the series/metrics
//! result; this module fixes the shapes that cross the boundary and the
//! headline plumbing, nothing more. The service implementation itself
//! lives outside this workspace.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricelab_core::data::finnhub::FinnhubProvider;
use pricelab_core::data::FetchError;

/// Headlines handed to the narrative collaborator per request.
pub const DEFAULT_MAX_HEADLINES: usize = 15;
/// How far back the headline window reaches, in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// One headline with its publication time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub text: String,
    pub published_at: NaiveDateTime,
}

/// Input contract: the pipeline fills this in and does not look back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub ticker: String,
    pub headlines: Vec<Headline>,
    pub max_headlines: usize,
    pub lookback_days: u32,
}

impl NarrativeRequest {
    /// Build a request, keeping only the newest [`DEFAULT_MAX_HEADLINES`]
    /// headlines.
    pub fn new(ticker: impl Into<String>, mut headlines: Vec<Headline>) -> Self {
        headlines.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        headlines.truncate(DEFAULT_MAX_HEADLINES);
        Self {
            ticker: ticker.into(),
            headlines,
            max_headlines: DEFAULT_MAX_HEADLINES,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

/// Sentiment read returned by the collaborator. Accepted as-is; the
/// pipeline does not validate it beyond deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeReport {
    /// 0 (bearish) to 100 (bullish).
    pub sentiment_score: u8,
    pub sentiment_summary: String,
    /// Extracted price-target range, or `"N/A"` when none was found.
    pub fair_value_estimate: String,
    pub leading_indicators: Vec<LeadingIndicator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadingIndicator {
    pub name: String,
    pub status: IndicatorStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorStatus {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("no headlines available for '{ticker}'")]
    NoHeadlines { ticker: String },

    #[error("narrative service failed: {0}")]
    Service(String),
}

/// External narrative collaborator.
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    async fn analyze(&self, request: NarrativeRequest) -> Result<NarrativeReport, NarrativeError>;
}

/// Source of recent headlines for a ticker.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn recent_headlines(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> Result<Vec<Headline>, FetchError>;
}

#[async_trait]
impl HeadlineSource for FinnhubProvider {
    async fn recent_headlines(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> Result<Vec<Headline>, FetchError> {
        let to = Utc::now().date_naive();
        let from = to - chrono::Duration::days(i64::from(lookback_days));
        let articles = self.company_news(ticker, from, to).await?;
        Ok(articles
            .into_iter()
            .filter_map(|article| {
                let published_at =
                    chrono::DateTime::from_timestamp(article.datetime, 0)?.naive_utc();
                Some(Headline {
                    text: article.headline,
                    published_at,
                })
            })
            .collect())
    }
}
