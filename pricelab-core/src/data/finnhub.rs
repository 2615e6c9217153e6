//! Finnhub data provider.
//!
//! Daily candles come from the `/stock/candle` endpoint, which takes an
//! explicit from/to window and answers with columnar arrays plus a status
//! flag — only points inside the window come back, so no client-side
//! filtering is needed. The adapter also exposes the realtime quote and
//! company-news endpoints; the news feed supplies the narrative layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::provider::{DataProvider, FetchError};
use crate::config::SourceConfig;
use crate::domain::Bar;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "finnhub";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Candle response: columnar arrays keyed by single letters, plus a status
/// flag. Non-`ok` responses omit the arrays entirely.
#[derive(Debug, Deserialize)]
struct CandleResponse {
    s: String,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    o: Vec<f64>,
    #[serde(default)]
    h: Vec<f64>,
    #[serde(default)]
    l: Vec<f64>,
    #[serde(default)]
    c: Vec<f64>,
    #[serde(default)]
    v: Vec<u64>,
}

/// Realtime quote for a symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    #[serde(rename = "c")]
    pub current: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "pc")]
    pub previous_close: f64,
    #[serde(rename = "d")]
    pub change: f64,
    #[serde(rename = "dp")]
    pub change_percent: f64,
}

/// One company-news item. Only the fields the narrative layer consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    /// Publication time as a unix timestamp.
    pub datetime: i64,
}

/// Finnhub adapter. One windowed candle query per fetch.
#[derive(Debug)]
pub struct FinnhubProvider {
    client: reqwest::Client,
    token: SecretString,
}

impl FinnhubProvider {
    /// Build a Finnhub adapter from explicit configuration.
    ///
    /// Fails up front if no token is provisioned.
    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        let token = match &config.finnhub_key {
            Some(key) => SecretString::new(key.expose_secret().into()),
            None => return Err(FetchError::MissingCredential { provider: PROVIDER }),
        };
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, token })
    }

    /// Realtime quote for a symbol. Separate call from the candle fetch.
    pub async fn quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let resp = self
            .client
            .get(format!("{BASE_URL}/quote"))
            .query(&[("symbol", symbol), ("token", self.token.expose_secret())])
            .send()
            .await?;
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                notice: "finnhub returned HTTP 429".into(),
            });
        }
        let resp = resp.error_for_status()?;
        resp.json::<Quote>()
            .await
            .map_err(|e| FetchError::Malformed(format!("quote payload for {symbol}: {e}")))
    }

    /// Company news for `symbol` between `from` and `to`, most recent first.
    pub async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsArticle>, FetchError> {
        let from = from.to_string();
        let to = to.to_string();
        let resp = self
            .client
            .get(format!("{BASE_URL}/company-news"))
            .query(&[
                ("symbol", symbol),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("token", self.token.expose_secret()),
            ])
            .send()
            .await?;
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                notice: "finnhub returned HTTP 429".into(),
            });
        }
        let resp = resp.error_for_status()?;
        resp.json::<Vec<NewsArticle>>()
            .await
            .map_err(|e| FetchError::Malformed(format!("news payload for {symbol}: {e}")))
    }
}

/// Normalize a candle payload into canonical bars.
///
/// A non-`ok` status or empty close array is the defined "no data" failure
/// for this endpoint.
fn parse_candles(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    payload: CandleResponse,
) -> Result<Vec<Bar>, FetchError> {
    if payload.s != "ok" || payload.c.is_empty() {
        return Err(FetchError::EmptyRange {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }

    let n = payload.t.len();
    if payload.o.len() != n
        || payload.h.len() != n
        || payload.l.len() != n
        || payload.c.len() != n
        || payload.v.len() != n
    {
        return Err(FetchError::Malformed(
            "candle columnar arrays disagree on length".into(),
        ));
    }

    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let date = chrono::DateTime::from_timestamp(payload.t[i], 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| {
                FetchError::Malformed(format!("invalid timestamp: {}", payload.t[i]))
            })?;
        bars.push(Bar {
            date,
            open: payload.o[i],
            high: payload.h[i],
            low: payload.l[i],
            close: payload.c[i],
            volume: Some(payload.v[i]),
        });
    }
    Ok(bars)
}

#[async_trait]
impl DataProvider for FinnhubProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        let from = start
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
            .to_string();
        let to = end
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc()
            .timestamp()
            .to_string();

        let resp = self
            .client
            .get(format!("{BASE_URL}/stock/candle"))
            .query(&[
                ("symbol", symbol),
                ("resolution", "D"),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("token", self.token.expose_secret()),
            ])
            .send()
            .await?;
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                notice: "finnhub returned HTTP 429".into(),
            });
        }
        let resp = resp.error_for_status()?;
        let payload: CandleResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Malformed(format!("candle payload for {symbol}: {e}")))?;

        parse_candles(symbol, start, end, payload)
    }
}
