//! Alpha Vantage data provider.
//!
//! The daily endpoint has no native range filter: it always returns the
//! full history, keyed by date string, with ordinal-prefixed field names
//! and numbers encoded as strings. Range filtering and the ascending sort
//! happen client-side. The payload reports invalid symbols through an
//! `"Error Message"` field and throttling through a `"Note"` field, both of
//! which must be checked before touching the data field.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::provider::{DataProvider, FetchError};
use crate::config::SourceConfig;
use crate::domain::Bar;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "alpha_vantage";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Time Series (Daily)")]
    series: Option<HashMap<String, RawDailyBar>>,
}

#[derive(Debug, Deserialize)]
struct RawDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Alpha Vantage adapter. One full-history query per fetch.
#[derive(Debug)]
pub struct AlphaVantageProvider {
    client: reqwest::Client,
    key: SecretString,
}

impl AlphaVantageProvider {
    /// Build an Alpha Vantage adapter from explicit configuration.
    ///
    /// Fails up front if no key is provisioned.
    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        let key = match &config.alpha_vantage_key {
            Some(key) => SecretString::new(key.expose_secret().into()),
            None => return Err(FetchError::MissingCredential { provider: PROVIDER }),
        };
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, key })
    }
}

/// Filter the full-history payload to `[start, end]` inclusive and sort
/// ascending. The vendor's key order is unspecified, so the sort is not
/// optional.
fn bars_in_range(
    symbol: &str,
    payload: DailyResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Bar>, FetchError> {
    if let Some(message) = payload.error_message {
        return Err(FetchError::InvalidSymbol {
            symbol: symbol.to_string(),
            message,
        });
    }
    if let Some(notice) = payload.note {
        return Err(FetchError::RateLimited { notice });
    }
    let series = payload.series.ok_or_else(|| {
        FetchError::Malformed("daily time series field missing from payload".into())
    })?;

    let mut bars = Vec::new();
    for (date_str, raw) in series {
        let date = date_str
            .parse::<NaiveDate>()
            .map_err(|e| FetchError::Malformed(format!("bad date key '{date_str}': {e}")))?;
        if date < start || date > end {
            continue;
        }
        bars.push(Bar {
            date,
            open: parse_price(&raw.open, "open")?,
            high: parse_price(&raw.high, "high")?,
            low: parse_price(&raw.low, "low")?,
            close: parse_price(&raw.close, "close")?,
            volume: Some(parse_volume(&raw.volume)?),
        });
    }
    bars.sort_by_key(|bar| bar.date);

    if bars.is_empty() {
        return Err(FetchError::EmptyRange {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }
    Ok(bars)
}

fn parse_price(field: &str, name: &str) -> Result<f64, FetchError> {
    field
        .parse()
        .map_err(|_| FetchError::Malformed(format!("unparseable {name} value '{field}'")))
}

fn parse_volume(field: &str) -> Result<u64, FetchError> {
    field
        .parse()
        .map_err(|_| FetchError::Malformed(format!("unparseable volume value '{field}'")))
}

#[async_trait]
impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, FetchError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
                ("apikey", self.key.expose_secret()),
            ])
            .send()
            .await?;
        let resp = resp.error_for_status()?;
        let payload: DailyResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Malformed(format!("daily payload for {symbol}: {e}")))?;

        bars_in_range(symbol, payload, start, end)
    }
}
