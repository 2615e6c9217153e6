//! Analysis runner — the request/response boundary over the pipeline.
//!
//! One request produces one series, one summary, and a provenance tag.
//! The optional narrative exchange is spawned alongside acquisition and
//! never gates the primary result.

use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;

use pricelab_core::config::SourceConfig;
use pricelab_core::data::{AcquireError, Acquired, Acquisition, Provenance};
use pricelab_core::domain::Bar;

use crate::metrics::BacktestSummary;
use crate::narrative::{
    HeadlineSource, NarrativeError, NarrativeProvider, NarrativeReport, NarrativeRequest,
    DEFAULT_LOOKBACK_DAYS,
};

/// One analysis request as it arrives from the UI boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub prefer_live: bool,
}

impl AnalysisRequest {
    /// Parse a request from the string form the UI sends (`YYYY-MM-DD`
    /// dates). A malformed date is a terminal boundary error.
    pub fn parse(
        ticker: impl Into<String>,
        start_date: &str,
        end_date: &str,
        prefer_live: bool,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            ticker: ticker.into(),
            start_date: parse_date(start_date)?,
            end_date: parse_date(end_date)?,
            prefer_live,
        })
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AnalysisError> {
    value.parse().map_err(|source| AnalysisError::BadDate {
        value: value.to_string(),
        source,
    })
}

/// The full answer for one request.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub series: Vec<Bar>,
    pub metrics: BacktestSummary,
    pub provenance: Provenance,
}

/// Terminal errors at the analysis boundary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed date '{value}'")]
    BadDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Acquire(#[from] AcquireError),
}

/// Runs requests against the acquisition chain.
pub struct Analyzer {
    acquisition: Acquisition,
}

impl Analyzer {
    pub fn new(acquisition: Acquisition) -> Self {
        Self { acquisition }
    }

    /// Build an analyzer straight from source configuration.
    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(Acquisition::from_config(config))
    }

    /// Acquire a series and compute its summary.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
        let Acquired {
            bars,
            provenance,
            failures,
        } = self
            .acquisition
            .acquire(
                &request.ticker,
                request.start_date,
                request.end_date,
                request.prefer_live,
            )
            .await?;

        if !failures.is_empty() {
            debug!(
                "{} live attempt(s) consumed before serving {provenance} for {}",
                failures.len(),
                request.ticker
            );
        }

        let metrics = BacktestSummary::compute(&bars);
        Ok(Analysis {
            series: bars,
            metrics,
            provenance,
        })
    }

    /// Like [`Analyzer::run`], with the narrative exchange spawned
    /// alongside.
    ///
    /// The returned handle resolves independently of the primary result; a
    /// narrative failure is the caller's to ignore, and awaiting the handle
    /// is optional.
    pub async fn run_with_narrative(
        &self,
        request: &AnalysisRequest,
        headlines: Arc<dyn HeadlineSource>,
        narrative: Arc<dyn NarrativeProvider>,
    ) -> Result<(Analysis, JoinHandle<Result<NarrativeReport, NarrativeError>>), AnalysisError>
    {
        let ticker = request.ticker.clone();
        let handle = tokio::spawn(async move {
            let found = headlines
                .recent_headlines(&ticker, DEFAULT_LOOKBACK_DAYS)
                .await
                .map_err(|e| NarrativeError::Service(e.to_string()))?;
            if found.is_empty() {
                return Err(NarrativeError::NoHeadlines { ticker });
            }
            narrative.analyze(NarrativeRequest::new(ticker, found)).await
        });

        let analysis = self.run(request).await?;
        Ok((analysis, handle))
    }
}
