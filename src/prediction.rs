// =============================================================================
// Prediction Service — fetch, analyse, project, render
// =============================================================================
//
//   fetch -> non-empty check -> RSI -> pivot -> waves -> charts (x2) -> result
//
// Each stage returns `Result<_, PredictionError>` and stages are chained with
// `?`. `predict` is the outer boundary: it always produces a
// `PredictionOutcome`, turning any error into the single-field error object.
// Nothing is retried and nothing is cached between calls.
//
// The service is built once at startup and never mutated afterwards, so it
// can be shared across requests behind an `Arc`.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::chart::{ChartRenderer, IndicatorChart, PriceChart};
use crate::error::PredictionError;
use crate::indicators::rsi::{calculate_rsi, classify, DEFAULT_RSI_PERIOD};
use crate::market_data::PriceProvider;
use crate::pivot::locate_pivot;
use crate::types::{PivotPoint, PriceSeries};
use crate::waves::{project_waves, WaveSet};

/// One year of daily closes.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// A century of history; anything longer is rejected before fetching.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

// =============================================================================
// Request / response
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictionRequest {
    pub ticker: String,
    #[serde(default)]
    pub lookback_days: Option<u32>,
    #[serde(default)]
    pub rsi_period: Option<usize>,
}

impl PredictionRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            lookback_days: None,
            rsi_period: None,
        }
    }

    pub fn with_rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = Some(period);
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }
}

/// Successful prediction: two embedded charts and the wave 5 interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub price_chart: String,
    pub rsi_chart: String,
    pub prediction: String,
}

/// Either a result or an error message; serialised without a tag so the
/// JSON carries exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionOutcome {
    Success(PredictionResult),
    Failure { error: String },
}

impl PredictionOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<PredictionResult, PredictionError>> for PredictionOutcome {
    fn from(r: Result<PredictionResult, PredictionError>) -> Self {
        match r {
            Ok(result) => Self::Success(result),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

// =============================================================================
// Analysis (pure part of the pipeline)
// =============================================================================

/// Everything computed from a price series before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveAnalysis {
    pub pivot: PivotPoint,
    pub waves: WaveSet,
    pub price_chart: PriceChart,
    pub indicator_chart: IndicatorChart,
}

/// Run indicator, pivot and wave projection over `series`.
pub fn analyse(
    series: &PriceSeries,
    ticker: &str,
    period: usize,
) -> Result<WaveAnalysis, PredictionError> {
    if period == 0 {
        return Err(PredictionError::InvalidPeriod);
    }
    if series.is_empty() {
        return Err(PredictionError::EmptySeries {
            ticker: ticker.to_string(),
        });
    }

    let indicator = calculate_rsi(series, period);
    debug!(defined = indicator.defined_count(), total = indicator.len(), "RSI computed");

    let pivot = locate_pivot(&indicator)?;
    debug!(
        index = pivot.index,
        date = %pivot.timestamp.date_naive(),
        rsi = pivot.value,
        zone = %classify(pivot.value),
        "pivot located"
    );

    let waves = project_waves(series, &pivot)?;

    let available = series.len() - pivot.index;
    let price_chart = PriceChart::build(series, &pivot, &waves, ticker)
        .ok_or(PredictionError::InsufficientRange { available })?;
    let indicator_chart = IndicatorChart::build(&indicator, &pivot, ticker)
        .ok_or(PredictionError::InsufficientRange { available })?;

    Ok(WaveAnalysis {
        pivot,
        waves,
        price_chart,
        indicator_chart,
    })
}

// =============================================================================
// Service
// =============================================================================

pub struct PredictionService<P, R> {
    provider: P,
    renderer: R,
    default_lookback_days: u32,
    default_rsi_period: usize,
}

impl<P: PriceProvider, R: ChartRenderer> PredictionService<P, R> {
    pub fn new(provider: P, renderer: R) -> Self {
        Self {
            provider,
            renderer,
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
            default_rsi_period: DEFAULT_RSI_PERIOD,
        }
    }

    pub fn with_defaults(mut self, lookback_days: u32, rsi_period: usize) -> Self {
        self.default_lookback_days = lookback_days;
        self.default_rsi_period = rsi_period;
        self
    }

    /// Run the pipeline and fold any failure into the error object.
    pub async fn predict(&self, request: &PredictionRequest) -> PredictionOutcome {
        let span = info_span!(
            "predict",
            request_id = %Uuid::new_v4(),
            ticker = %request.ticker.trim(),
            rsi_period = request.rsi_period.unwrap_or(self.default_rsi_period),
            lookback_days = request.lookback_days.unwrap_or(self.default_lookback_days),
        );

        async {
            let outcome = PredictionOutcome::from(self.run(request).await);
            match &outcome {
                PredictionOutcome::Success(r) => info!(prediction = %r.prediction, "prediction ready"),
                PredictionOutcome::Failure { error } => warn!(%error, "prediction failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Run the pipeline, returning the first stage error.
    pub async fn run(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let ticker = request.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(PredictionError::InvalidTicker);
        }
        let period = request.rsi_period.unwrap_or(self.default_rsi_period);
        if period == 0 {
            return Err(PredictionError::InvalidPeriod);
        }
        let lookback = request.lookback_days.unwrap_or(self.default_lookback_days);
        if lookback == 0 || lookback > MAX_LOOKBACK_DAYS {
            return Err(PredictionError::InvalidLookback {
                days: lookback,
                max: MAX_LOOKBACK_DAYS,
            });
        }

        let series = self
            .provider
            .fetch_history(&ticker, lookback)
            .await
            .map_err(|e| PredictionError::ProviderFailure(format!("{e:#}")))?;
        debug!(count = series.len(), lookback, "history fetched");

        let analysis = analyse(&series, &ticker, period)?;

        let price_chart = self.renderer.render_price_chart(&analysis.price_chart)?;
        let rsi_chart = self
            .renderer
            .render_indicator_chart(&analysis.indicator_chart)?;

        Ok(PredictionResult {
            price_chart: price_chart.to_data_uri(),
            rsi_chart: rsi_chart.to_data_uri(),
            prediction: analysis.waves.prediction_range(),
        })
    }
}
