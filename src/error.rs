// =============================================================================
// Prediction pipeline errors
// =============================================================================
//
// Every stage of the pipeline returns `Result<_, PredictionError>`. The
// service boundary turns any of these into the `{ "error": ... }` object, so
// none of them is ever fatal to the process.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// The provider answered but had no closes for the ticker.
    #[error("No data found for ticker {ticker}")]
    EmptySeries { ticker: String },

    /// The indicator never produced a defined value.
    #[error("No pivot found: RSI is undefined for the entire series")]
    NoPivotFound,

    /// Fewer than two closes between the pivot and the end of the series.
    #[error("Insufficient range after pivot: {available} price(s), need at least 2")]
    InsufficientRange { available: usize },

    #[error("Price provider failure: {0}")]
    ProviderFailure(String),

    #[error("Chart rendering failure: {0}")]
    RenderFailure(String),

    #[error("Ticker must not be empty")]
    InvalidTicker,

    #[error("RSI period must be at least 1")]
    InvalidPeriod,

    #[error("Lookback must be between 1 and {max} days, got {days}")]
    InvalidLookback { days: u32, max: u32 },
}

impl From<crate::chart::RenderError> for PredictionError {
    fn from(e: crate::chart::RenderError) -> Self {
        Self::RenderFailure(e.to_string())
    }
}
