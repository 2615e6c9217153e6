//! End-to-end analysis behavior: acquisition → metrics → boundary shape,
//! plus the concurrent narrative exchange.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use pricelab_core::data::{Acquisition, DataProvider, FetchError, Provenance};
use pricelab_core::domain::Bar;
use pricelab_runner::{
    Analysis, AnalysisRequest, Analyzer, Headline, HeadlineSource, IndicatorStatus,
    LeadingIndicator, NarrativeError, NarrativeProvider, NarrativeReport, NarrativeRequest,
};

struct FixedProvider {
    bars: Vec<Bar>,
}

#[async_trait]
impl DataProvider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch(
        &self,
        _symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        Ok(self.bars.clone())
    }
}

struct FailingProvider;

#[async_trait]
impl DataProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        Err(FetchError::InvalidSymbol {
            symbol: symbol.to_string(),
            message: "Invalid API call".into(),
        })
    }
}

fn flat_bar(day: u32, close: f64) -> Bar {
    Bar {
        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume: Some(1_200_000),
    }
}

fn request() -> AnalysisRequest {
    AnalysisRequest::parse("AAPL", "2024-01-01", "2024-01-31", true).unwrap()
}

#[tokio::test]
async fn live_series_flows_through_to_metrics() {
    let provider = FixedProvider {
        bars: vec![flat_bar(2, 100.0), flat_bar(3, 110.0)],
    };
    let analyzer = Analyzer::new(Acquisition::with_providers(vec![Box::new(provider)]));

    let analysis = analyzer.run(&request()).await.unwrap();
    assert_eq!(analysis.provenance, Provenance::Real);
    assert_eq!(analysis.series.len(), 2);
    assert_eq!(analysis.metrics.total_return_pct, 10.0);
    assert_eq!(analysis.metrics.max_drawdown_pct, 0.0);
}

#[tokio::test]
async fn live_failure_serves_a_demo_analysis() {
    let analyzer = Analyzer::new(Acquisition::with_providers(vec![Box::new(FailingProvider)]));

    let analysis = analyzer.run(&request()).await.unwrap();
    assert_eq!(analysis.provenance, Provenance::Demo);
    assert!(!analysis.series.is_empty());
    // The density heuristic holds on the synthetic series too.
    assert_eq!(analysis.metrics.trade_count, analysis.series.len() / 5);
    assert!(analysis.series.iter().all(Bar::is_sane));
}

#[tokio::test]
async fn analysis_serializes_the_boundary_shape() {
    let provider = FixedProvider {
        bars: vec![flat_bar(2, 100.0), flat_bar(3, 110.0)],
    };
    let analyzer = Analyzer::new(Acquisition::with_providers(vec![Box::new(provider)]));

    let analysis = analyzer.run(&request()).await.unwrap();
    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["provenance"], "real");
    assert_eq!(json["series"][0]["time"], "2024-01-02");
    assert!(json["metrics"].get("totalReturnPct").is_some());
}

// ── Narrative exchange ──────────────────────────────────────────────

struct CannedHeadlines {
    count: usize,
}

#[async_trait]
impl HeadlineSource for CannedHeadlines {
    async fn recent_headlines(
        &self,
        _ticker: &str,
        _lookback_days: u32,
    ) -> Result<Vec<Headline>, FetchError> {
        Ok((0..self.count)
            .map(|i| Headline {
                text: format!("story {i}"),
                published_at: NaiveDateTime::default() + chrono::Duration::hours(i as i64),
            })
            .collect())
    }
}

struct CountingNarrative {
    seen_headlines: Arc<AtomicUsize>,
}

#[async_trait]
impl NarrativeProvider for CountingNarrative {
    async fn analyze(&self, request: NarrativeRequest) -> Result<NarrativeReport, NarrativeError> {
        self.seen_headlines
            .store(request.headlines.len(), Ordering::SeqCst);
        Ok(NarrativeReport {
            sentiment_score: 64,
            sentiment_summary: "Coverage leans positive.".into(),
            fair_value_estimate: "N/A".into(),
            leading_indicators: vec![LeadingIndicator {
                name: "Revenue Growth".into(),
                status: IndicatorStatus::Bullish,
                reason: "Raised guidance".into(),
            }],
        })
    }
}

#[tokio::test]
async fn narrative_runs_alongside_and_gets_truncated_headlines() {
    let provider = FixedProvider {
        bars: vec![flat_bar(2, 100.0), flat_bar(3, 110.0)],
    };
    let analyzer = Analyzer::new(Acquisition::with_providers(vec![Box::new(provider)]));
    let seen = Arc::new(AtomicUsize::new(0));

    let (analysis, handle) = analyzer
        .run_with_narrative(
            &request(),
            Arc::new(CannedHeadlines { count: 40 }),
            Arc::new(CountingNarrative {
                seen_headlines: Arc::clone(&seen),
            }),
        )
        .await
        .unwrap();

    // Primary result is complete regardless of the narrative task.
    assert_eq!(analysis.provenance, Provenance::Real);

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.sentiment_score, 64);
    assert_eq!(seen.load(Ordering::SeqCst), 15);
}

#[tokio::test]
async fn narrative_failure_does_not_gate_the_analysis() {
    let provider = FixedProvider {
        bars: vec![flat_bar(2, 100.0), flat_bar(3, 110.0)],
    };
    let analyzer = Analyzer::new(Acquisition::with_providers(vec![Box::new(provider)]));

    let (analysis, handle) = analyzer
        .run_with_narrative(
            &request(),
            Arc::new(CannedHeadlines { count: 0 }),
            Arc::new(CountingNarrative {
                seen_headlines: Arc::new(AtomicUsize::new(0)),
            }),
        )
        .await
        .unwrap();

    assert_eq!(analysis.metrics.total_return_pct, 10.0);
    let narrative = handle.await.unwrap();
    assert!(matches!(
        narrative,
        Err(NarrativeError::NoHeadlines { ticker }) if ticker == "AAPL"
    ));
}

#[tokio::test]
async fn analysis_is_usable_without_ever_awaiting_the_narrative() {
    let provider = FixedProvider {
        bars: vec![flat_bar(2, 100.0), flat_bar(3, 110.0)],
    };
    let analyzer = Analyzer::new(Acquisition::with_providers(vec![Box::new(provider)]));

    let (analysis, handle) = analyzer
        .run_with_narrative(
            &request(),
            Arc::new(CannedHeadlines { count: 5 }),
            Arc::new(CountingNarrative {
                seen_headlines: Arc::new(AtomicUsize::new(0)),
            }),
        )
        .await
        .unwrap();

    drop(handle);
    let _: Analysis = analysis;
}
