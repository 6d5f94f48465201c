// =============================================================================
// Shared types used across the prediction pipeline
// =============================================================================
//
// Every entity here is derived fresh per request from the fetched price
// history; nothing outlives a single prediction call.
// =============================================================================

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Price series
// =============================================================================

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Ordered daily closes with strictly increasing timestamps.
///
/// Non-trading days are simply absent; the series never contains
/// placeholder entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting unordered or duplicate timestamps and
    /// non-finite closes.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() {
                bail!("close at {} is not finite: {}", p.timestamp, p.close);
            }
            if i > 0 && points[i - 1].timestamp >= p.timestamp {
                bail!(
                    "timestamps must be strictly increasing ({} followed by {})",
                    points[i - 1].timestamp,
                    p.timestamp
                );
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Closing prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

// =============================================================================
// Indicator series
// =============================================================================

/// One indicator reading. `value` is `None` where the indicator is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Indicator readings aligned 1:1 with the [`PriceSeries`] they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub period: usize,
    points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn new(period: usize, points: Vec<IndicatorPoint>) -> Self {
        Self { period, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    /// Number of entries that carry a defined value.
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

// =============================================================================
// Pivot
// =============================================================================

/// Origin of the wave projection: an index into both series.
///
/// Always refers to an index whose indicator value is defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PivotPoint {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

// =============================================================================
// Test helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Daily series starting 2024-01-01 with one close per calendar day.
    pub fn daily_series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
            .collect();
        PriceSeries::new(points).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn series_accepts_gaps() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(0), 10.0),
            PricePoint::new(day(3), 11.0),
            PricePoint::new(day(4), 12.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.last().unwrap().timestamp, day(4));
    }

    #[test]
    fn series_rejects_duplicate_timestamps() {
        let err = PriceSeries::new(vec![
            PricePoint::new(day(0), 10.0),
            PricePoint::new(day(0), 11.0),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn series_rejects_descending_timestamps() {
        let err = PriceSeries::new(vec![
            PricePoint::new(day(2), 10.0),
            PricePoint::new(day(1), 11.0),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn series_rejects_nan_close() {
        assert!(PriceSeries::new(vec![PricePoint::new(day(0), f64::NAN)]).is_err());
    }

    #[test]
    fn empty_series_is_valid() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }
}
