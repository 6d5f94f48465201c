// =============================================================================
// Chart annotations — what the renderer draws, resolved ahead of time
// =============================================================================
//
// Price chart:
//   - closes from the pivot to the last observation,
//   - five wave segments; boundary i sits at close index round(count * i / 5)
//     within that range (clamped to the last observation),
//   - a dashed segment carrying wave 5 from the last close to +80 days.
//
// Indicator chart:
//   - indicator readings from the pivot forward, split into runs wherever a
//     reading is undefined,
//   - horizontal reference lines at 30 and 70.
//
// The x axis is expressed in days since the pivot so the renderer can use a
// plain numeric axis and still place the future projection correctly.
// =============================================================================

use chrono::{DateTime, Duration, Utc};

use crate::indicators::rsi::{OVERBOUGHT_LEVEL, OVERSOLD_LEVEL};
use crate::types::{IndicatorSeries, PivotPoint, PricePoint, PriceSeries};
use crate::waves::{ProjectionSegment, WaveSet};

pub const PRICE_CHART_TITLE: &str = "Elliott Waves with Predicted Wave 5";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A (timestamp, value) coordinate.
pub type ChartPoint = (DateTime<Utc>, f64);

/// One drawn wave segment.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveLine {
    pub label: &'static str,
    pub from: ChartPoint,
    pub to: ChartPoint,
}

// =============================================================================
// Price chart
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PriceChart {
    pub title: String,
    pub ticker: String,
    pub origin: DateTime<Utc>,
    pub prices: Vec<PricePoint>,
    pub waves: Vec<WaveLine>,
    pub projection: ProjectionSegment,
}

impl PriceChart {
    /// Resolve the price chart for `series` from `pivot` onward.
    ///
    /// Returns `None` when the pivot leaves nothing to draw.
    pub fn build(
        series: &PriceSeries,
        pivot: &PivotPoint,
        waves: &WaveSet,
        ticker: &str,
    ) -> Option<Self> {
        let prices = series.points().get(pivot.index..)?.to_vec();
        let last = *prices.last()?;

        let lines = waves
            .waves
            .iter()
            .enumerate()
            .map(|(i, wave)| {
                let from = prices[boundary_index(prices.len(), i)].timestamp;
                let to = prices[boundary_index(prices.len(), i + 1)].timestamp;
                WaveLine {
                    label: wave.label,
                    from: (from, wave.start),
                    to: (to, wave.end),
                }
            })
            .collect();

        Some(Self {
            title: PRICE_CHART_TITLE.to_string(),
            ticker: ticker.to_string(),
            origin: prices[0].timestamp,
            prices,
            waves: lines,
            projection: waves.projection_from(last.timestamp),
        })
    }

    /// Days between the pivot and `ts`.
    pub fn x_of(&self, ts: DateTime<Utc>) -> f64 {
        days_between(self.origin, ts)
    }

    /// Right edge of the x axis: the end of the projection.
    pub fn x_extent(&self) -> f64 {
        self.x_of(self.projection.to).max(1.0)
    }

    /// Date label for an x position.
    pub fn date_label(&self, x: f64) -> String {
        date_label(self.origin, x)
    }

    /// Padded (low, high) covering closes, waves and projection.
    pub fn value_range(&self) -> (f64, f64) {
        let values = self
            .prices
            .iter()
            .map(|p| p.close)
            .chain(self.waves.iter().flat_map(|w| [w.from.1, w.to.1]))
            .chain([self.projection.start, self.projection.end]);
        padded_range(values)
    }
}

/// Close index of wave boundary `i` (0..=5) within a range of `count` closes.
pub fn boundary_index(count: usize, i: usize) -> usize {
    let idx = (count as f64 * i as f64 / 5.0).round_ties_even() as usize;
    idx.min(count.saturating_sub(1))
}

// =============================================================================
// Indicator chart
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorChart {
    pub title: String,
    pub series_label: String,
    pub origin: DateTime<Utc>,
    /// Contiguous runs of defined readings.
    pub runs: Vec<Vec<ChartPoint>>,
    pub reference_levels: [f64; 2],
    pub x_extent: f64,
}

impl IndicatorChart {
    /// Resolve the indicator chart from `pivot` onward.
    ///
    /// Returns `None` when the pivot leaves nothing to draw.
    pub fn build(indicator: &IndicatorSeries, pivot: &PivotPoint, ticker: &str) -> Option<Self> {
        let points = indicator.points().get(pivot.index..)?;
        let origin = points.first()?.timestamp;
        let last = points.last()?.timestamp;

        let mut runs: Vec<Vec<ChartPoint>> = Vec::new();
        let mut current = Vec::new();
        for p in points {
            match p.value {
                Some(v) => current.push((p.timestamp, v)),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }

        Some(Self {
            title: format!("{ticker} RSI (From Lowest RSI Date)"),
            series_label: format!("{ticker} RSI"),
            origin,
            runs,
            reference_levels: [OVERSOLD_LEVEL, OVERBOUGHT_LEVEL],
            x_extent: days_between(origin, last).max(1.0),
        })
    }

    pub fn x_of(&self, ts: DateTime<Utc>) -> f64 {
        days_between(self.origin, ts)
    }

    pub fn date_label(&self, x: f64) -> String {
        date_label(self.origin, x)
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn days_between(origin: DateTime<Utc>, ts: DateTime<Utc>) -> f64 {
    (ts - origin).num_seconds() as f64 / SECONDS_PER_DAY
}

fn date_label(origin: DateTime<Utc>, x: f64) -> String {
    let ts = origin + Duration::seconds((x * SECONDS_PER_DAY).round() as i64);
    ts.format("%Y-%m-%d").to_string()
}

/// Min/max of `values` widened by 5% (or by 1.0 for a flat range).
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}
