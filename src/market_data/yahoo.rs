// =============================================================================
// Yahoo Finance chart API client — daily price history
// =============================================================================
//
// GET {base_url}/{ticker}?period1=<unix>&period2=<unix>&interval=1d
//
// Closes come from `adjclose` when Yahoo provides it (split/dividend
// adjusted), falling back to the raw `close`. Bars with a null close are
// dropped rather than filled, so the resulting series simply has a gap.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::market_data::PriceProvider;
use crate::types::{PricePoint, PriceSeries};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// -----------------------------------------------------------------------------
// Response shape (only the fields we read)
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

/// Yahoo Finance client. Cheap to clone; the inner `reqwest::Client` is
/// reference-counted.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_url(&self, ticker: &str, start: i64, end: i64) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url, ticker, start, end
        )
    }

    #[instrument(skip(self), name = "yahoo::fetch_history")]
    async fn fetch(&self, ticker: &str, lookback_days: u32) -> Result<PriceSeries> {
        let (start, end) = fetch_window(Utc::now(), lookback_days)?;
        let url = self.build_url(ticker, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart for {ticker} failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read chart response body")?;

        // Yahoo reports unknown symbols as 404 with a JSON error payload, so
        // try the payload first for a useful message.
        match parse_chart(&body) {
            Ok(series) => {
                debug!(ticker, count = series.len(), "price history fetched");
                Ok(series)
            }
            Err(e) if !status.is_success() => {
                warn!(ticker, %status, "chart request rejected");
                Err(e.context(format!("Yahoo chart API returned {status}")))
            }
            Err(e) => Err(e),
        }
    }
}

impl PriceProvider for YahooFinanceClient {
    async fn fetch_history(&self, ticker: &str, lookback_days: u32) -> Result<PriceSeries> {
        self.fetch(ticker, lookback_days).await
    }
}

/// `(period1, period2)` in epoch seconds for `lookback_days` ending at `end`.
fn fetch_window(end: DateTime<Utc>, lookback_days: u32) -> Result<(i64, i64)> {
    let start = end
        .checked_sub_signed(chrono::Duration::days(i64::from(lookback_days)))
        .with_context(|| format!("lookback of {lookback_days} days is out of range"))?;
    Ok((start.timestamp(), end.timestamp()))
}

/// Turn a chart API payload into a [`PriceSeries`].
///
/// An absent or empty result yields an empty series; an explicit API error
/// is returned as an error.
fn parse_chart(json: &str) -> Result<PriceSeries> {
    let response: ChartResponse =
        serde_json::from_str(json).context("failed to parse chart response")?;

    if let Some(err) = response.chart.error {
        anyhow::bail!("Yahoo API error [{}]: {}", err.code, err.description);
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::default());
    };

    let closes = data
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or_default();
    let adjusted = data
        .indicators
        .adjclose
        .as_ref()
        .and_then(|a| a.first())
        .map(|a| a.adjclose.as_slice())
        .unwrap_or_default();

    let mut points = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let close = adjusted
            .get(i)
            .copied()
            .flatten()
            .or_else(|| closes.get(i).copied().flatten());

        let Some(close) = close.filter(|c| c.is_finite()) else {
            continue;
        };
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(ts, 0) else {
            warn!(ts, "skipping bar with out-of-range timestamp");
            continue;
        };
        points.push(PricePoint::new(timestamp, close));
    }

    points.sort_by_key(|p| p.timestamp);
    points.dedup_by_key(|p| p.timestamp);

    PriceSeries::new(points)
}
