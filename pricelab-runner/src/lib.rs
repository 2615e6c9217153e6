//! PriceLab Runner — analysis orchestration on top of `pricelab-core`.
//!
//! This crate builds on the acquisition chain to provide:
//! - Summary performance metrics over a bar series
//! - The request/response analysis boundary with provenance reporting
//! - The narrative collaborator contract and its concurrent spawn plumbing

pub mod metrics;
pub mod narrative;
pub mod runner;

pub use metrics::BacktestSummary;
pub use narrative::{
    Headline, HeadlineSource, IndicatorStatus, LeadingIndicator, NarrativeError,
    NarrativeProvider, NarrativeReport, NarrativeRequest,
};
pub use runner::{Analysis, AnalysisError, AnalysisRequest, Analyzer};
