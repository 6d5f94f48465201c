// =============================================================================
// Wave Projector — fixed-ratio Elliott wave projection
// =============================================================================
//
// Starting at the pivot, two observed closes anchor the projection:
//
//   p0 = prices[0]                       (pivot close)
//   p1 = prices[round(L * 0.20)]         (end of wave 1)
//
// Every later boundary is derived from those two with fixed multipliers:
//
//   w2 = p0 + (p1 - p0) * 0.50
//   w3 = p1 + (p1 - p0) * 1.61
//   w4 = w3 - (w3 - p1) * 0.38
//   w5 = w3 + (w3 - p1) * 1.38
//
// Segments are (p0,p1) (p1,w2) (w2,w3) (w3,w4) (w4,w5). A segment's start is
// not necessarily the previous segment's end.
//
// The index uses round-half-to-even. For integer L, L * 0.2 never lands on a
// .5 tie, so any nearest-rounding mode selects the same close.
// =============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::PredictionError;
use crate::types::{PivotPoint, PriceSeries};

/// Position of the wave-1 end within the pivot-to-end range.
pub const WAVE1_SPAN: f64 = 0.20;
pub const WAVE2_RETRACE: f64 = 0.50;
pub const WAVE3_EXTENSION: f64 = 1.61;
pub const WAVE4_RETRACE: f64 = 0.38;
pub const WAVE5_EXTENSION: f64 = 1.38;

/// Calendar days between the last close and the projected wave-5 end.
pub const PROJECTION_HORIZON_DAYS: i64 = 80;

/// One named (start, end) price pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Wave {
    pub label: &'static str,
    pub start: f64,
    pub end: f64,
}

/// Wave 5 carried past the last observation, for the dashed chart overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionSegment {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub start: f64,
    pub end: f64,
}

/// Exactly five chained waves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveSet {
    pub waves: [Wave; 5],
}

impl WaveSet {
    /// Derive the five waves from the two anchor prices.
    pub fn from_anchors(p0: f64, p1: f64) -> Self {
        let w2 = p0 + (p1 - p0) * WAVE2_RETRACE;
        let w3 = p1 + (p1 - p0) * WAVE3_EXTENSION;
        let w4 = w3 - (w3 - p1) * WAVE4_RETRACE;
        let w5 = w3 + (w3 - p1) * WAVE5_EXTENSION;

        Self {
            waves: [
                Wave { label: "Wave 1", start: p0, end: p1 },
                Wave { label: "Wave 2", start: p1, end: w2 },
                Wave { label: "Wave 3", start: w2, end: w3 },
                Wave { label: "Wave 4", start: w3, end: w4 },
                Wave { label: "Wave 5", start: w4, end: w5 },
            ],
        }
    }

    #[cfg(test)]
    pub fn wave(&self, number: usize) -> Option<&Wave> {
        number.checked_sub(1).and_then(|i| self.waves.get(i))
    }

    pub fn wave5(&self) -> &Wave {
        &self.waves[4]
    }

    /// Predicted interval as "start to end" of wave 5, two decimals each.
    ///
    /// The order is kept as computed, so a falling projection reads high to
    /// low.
    pub fn prediction_range(&self) -> String {
        let w5 = self.wave5();
        format!("{:.2} to {:.2}", w5.start, w5.end)
    }

    /// Map wave 5 onto `[last, last + 80 days]`.
    pub fn projection_from(&self, last: DateTime<Utc>) -> ProjectionSegment {
        let w5 = self.wave5();
        ProjectionSegment {
            from: last,
            to: last + Duration::days(PROJECTION_HORIZON_DAYS),
            start: w5.start,
            end: w5.end,
        }
    }
}

/// Index of the wave-1 end within a range of `len` closes.
pub fn wave1_end_offset(len: usize) -> usize {
    let idx = (len as f64 * WAVE1_SPAN).round_ties_even() as usize;
    idx.min(len.saturating_sub(1))
}

/// Project waves from the closes between `pivot` and the end of `series`.
pub fn project_waves(series: &PriceSeries, pivot: &PivotPoint) -> Result<WaveSet, PredictionError> {
    let prices = series.points().get(pivot.index..).unwrap_or_default();
    if prices.len() < 2 {
        return Err(PredictionError::InsufficientRange {
            available: prices.len(),
        });
    }

    let p0 = prices[0].close;
    let p1 = prices[wave1_end_offset(prices.len())].close;
    Ok(WaveSet::from_anchors(p0, p1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::daily_series;
    use chrono::TimeZone;

    fn pivot_at(series: &PriceSeries, index: usize) -> PivotPoint {
        PivotPoint {
            index,
            timestamp: series.points()[index].timestamp,
            value: 10.0,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn anchors_100_120() {
        let set = WaveSet::from_anchors(100.0, 120.0);
        let [w1, w2, w3, w4, w5] = set.waves;

        assert_eq!((w1.start, w1.end), (100.0, 120.0));
        assert_eq!(w2.start, 120.0);
        assert_close(w2.end, 110.0);
        assert_close(w3.end, 152.2);
        assert_close(w4.end, 139.964);
        assert_close(w5.end, 196.636);

        // Chained starts.
        assert_eq!(w3.start, w2.end);
        assert_eq!(w4.start, w3.end);
        assert_eq!(w5.start, w4.end);
    }

    #[test]
    fn labels_are_in_order() {
        let set = WaveSet::from_anchors(1.0, 2.0);
        let labels: Vec<_> = set.waves.iter().map(|w| w.label).collect();
        assert_eq!(labels, ["Wave 1", "Wave 2", "Wave 3", "Wave 4", "Wave 5"]);
        assert_eq!(set.wave(1).unwrap().label, "Wave 1");
        assert_eq!(set.wave(5).unwrap().label, "Wave 5");
        assert!(set.wave(0).is_none());
        assert!(set.wave(6).is_none());
    }

    #[test]
    fn prediction_range_rising() {
        let set = WaveSet::from_anchors(100.0, 120.0);
        assert_eq!(set.prediction_range(), "139.96 to 196.64");
    }

    #[test]
    fn prediction_range_keeps_falling_order() {
        // A falling anchor pair projects downward: start > end is kept.
        let set = WaveSet::from_anchors(120.0, 100.0);
        let w5 = set.wave5();
        assert!(w5.start > w5.end);
        assert_eq!(set.prediction_range(), "80.04 to 23.36");
    }

    #[test]
    fn wave1_offset_rounding() {
        assert_eq!(wave1_end_offset(2), 0);
        assert_eq!(wave1_end_offset(3), 1);
        assert_eq!(wave1_end_offset(5), 1);
        assert_eq!(wave1_end_offset(7), 1);
        assert_eq!(wave1_end_offset(8), 2);
        assert_eq!(wave1_end_offset(15), 3);
        assert_eq!(wave1_end_offset(26), 5);
        assert_eq!(wave1_end_offset(250), 50);
    }

    #[test]
    fn project_from_pivot() {
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
        let series = daily_series(&closes);
        let set = project_waves(&series, &pivot_at(&series, 10)).unwrap();

        // L = 10, round(2.0) = 2 => p1 = close[12]
        assert_eq!(set.waves[0].start, 60.0);
        assert_eq!(set.waves[0].end, 62.0);
    }

    #[test]
    fn insufficient_range_at_last_index() {
        let series = daily_series(&[1.0, 2.0, 3.0]);
        assert_eq!(
            project_waves(&series, &pivot_at(&series, 2)),
            Err(PredictionError::InsufficientRange { available: 1 })
        );
    }

    #[test]
    fn insufficient_range_out_of_bounds() {
        let series = daily_series(&[1.0, 2.0, 3.0]);
        let pivot = PivotPoint {
            index: 7,
            timestamp: series.points()[0].timestamp,
            value: 0.0,
        };
        assert_eq!(
            project_waves(&series, &pivot),
            Err(PredictionError::InsufficientRange { available: 0 })
        );
    }

    #[test]
    fn projection_is_eighty_days_out() {
        let set = WaveSet::from_anchors(100.0, 120.0);
        let last = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let seg = set.projection_from(last);
        assert_eq!(seg.from, last);
        assert_eq!(seg.to, Utc.with_ymd_and_hms(2025, 3, 21, 0, 0, 0).unwrap());
        assert_eq!(seg.start, set.wave5().start);
        assert_eq!(seg.end, set.wave5().end);
    }

    #[test]
    fn projection_is_deterministic() {
        let a = WaveSet::from_anchors(37.41, 39.87);
        let b = WaveSet::from_anchors(37.41, 39.87);
        for (x, y) in a.waves.iter().zip(b.waves.iter()) {
            assert_eq!(x.start.to_bits(), y.start.to_bits());
            assert_eq!(x.end.to_bits(), y.end.to_bits());
        }
        assert_eq!(a.prediction_range(), b.prediction_range());
    }
}
