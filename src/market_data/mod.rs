pub mod yahoo;

use std::future::Future;

use anyhow::Result;

use crate::types::PriceSeries;

pub use yahoo::YahooFinanceClient;

/// Source of daily closing prices.
///
/// Implementations return the history for `ticker` covering the last
/// `lookback_days` calendar days, oldest first. An unknown ticker may either
/// fail or return an empty series; the prediction service treats both as
/// soft failures.
pub trait PriceProvider: Send + Sync {
    fn fetch_history(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> impl Future<Output = Result<PriceSeries>> + Send;
}
