// =============================================================================
// Relative Strength Index (RSI) — Simple Moving Average variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
//          gain = max(delta, 0), loss = max(-delta, 0)
// Step 2 — For every index t >= period, average the `period` gains / losses
//          ending at t (plain arithmetic mean, no Wilder smoothing).
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The output is aligned 1:1 with the input closes. Entries that cannot be
// computed are `None`:
//   - the first `period` entries (not enough deltas yet),
//   - windows where both averages are zero (0/0).
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use crate::types::{IndicatorPoint, IndicatorSeries, PriceSeries};

/// Look-back used when the caller does not specify one.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Lower reference level drawn on the indicator chart.
pub const OVERSOLD_LEVEL: f64 = 30.0;

/// Upper reference level drawn on the indicator chart.
pub const OVERBOUGHT_LEVEL: f64 = 70.0;

/// Compute the RSI series for `series`, aligned with its timestamps.
pub fn calculate_rsi(series: &PriceSeries, period: usize) -> IndicatorSeries {
    let values = rsi_values(&series.closes(), period);
    let points = series
        .points()
        .iter()
        .zip(values)
        .map(|(p, value)| IndicatorPoint {
            timestamp: p.timestamp,
            value,
        })
        .collect();
    IndicatorSeries::new(period, points)
}

/// Compute one RSI value per close.
///
/// # Edge cases
/// - `period == 0` => every entry is `None`
/// - `closes.len() <= period` => every entry is `None`
/// - Average loss zero with positive average gain => 100.0
/// - Both averages zero => `None`
pub fn rsi_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return result;
    }

    // gains[i] / losses[i] describe the move from closes[i] to closes[i + 1].
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let period_f = period as f64;
    for t in period..closes.len() {
        // Deltas ending at close t are gains[t - period .. t].
        let window = t - period..t;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period_f;
        let avg_loss = losses[window].iter().sum::<f64>() / period_f;
        result[t] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

/// Zone classification for a single RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Overbought => write!(f, "OVERBOUGHT"),
        }
    }
}

/// Classify an RSI reading against the 30 / 70 reference levels.
pub fn classify(value: f64) -> RsiZone {
    if value >= OVERBOUGHT_LEVEL {
        RsiZone::Overbought
    } else if value <= OVERSOLD_LEVEL {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - Both averages zero: RS is 0/0, the reading is undefined.
/// - Average loss zero: RS is +inf, RSI saturates at 100.0.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::daily_series;

    // ---- rsi_values ------------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(rsi_values(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(rsi_values(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14: nothing defined, but still aligned.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        let series = rsi_values(&closes, 14);
        assert_eq!(series.len(), 14);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_first_period_entries_undefined() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = rsi_values(&closes, 14);
        assert_eq!(series.len(), 30);
        assert!(series[..14].iter().all(Option::is_none));
        assert!(series[14..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in rsi_values(&closes, 14).into_iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in rsi_values(&closes, 14).into_iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_undefined() {
        let closes = vec![100.0; 30];
        assert!(rsi_values(&closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_single_step_saturates_then_goes_undefined() {
        // One up-step from 10 to 11 between index 4 and 5, flat elsewhere.
        let mut closes = vec![10.0; 5];
        closes.extend(vec![11.0; 10]);
        let series = rsi_values(&closes, 3);

        // Windows containing the step (t = 5, 6, 7) have zero loss.
        assert_eq!(series[5], Some(100.0));
        assert_eq!(series[6], Some(100.0));
        assert_eq!(series[7], Some(100.0));
        // Before the step and after it leaves the window both averages are 0.
        assert_eq!(series[4], None);
        assert_eq!(series[8], None);
        assert_eq!(series[14], None);
    }

    #[test]
    fn rsi_simple_average_value() {
        // Deltas: +2, -1 => avg gain 1.0, avg loss 0.5, RS 2, RSI 66.67
        let series = rsi_values(&[10.0, 12.0, 11.0], 2);
        let v = series[2].unwrap();
        assert!((v - (100.0 - 100.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn rsi_uses_plain_window_not_smoothing() {
        // After the window slides past the initial drop the reading must
        // reflect only the last `period` deltas.
        let closes = vec![20.0, 10.0, 11.0, 12.0, 13.0];
        let series = rsi_values(&closes, 2);
        assert!(series[2].unwrap() < 50.0);
        assert_eq!(series[3], Some(100.0));
        assert_eq!(series[4], Some(100.0));
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in rsi_values(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn calculate_rsi_keeps_timestamps_aligned() {
        let series = daily_series(&[1.0, 2.0, 1.5, 3.0, 2.0, 2.5]);
        let rsi = calculate_rsi(&series, 2);
        assert_eq!(rsi.len(), series.len());
        assert_eq!(rsi.period, 2);
        for (p, r) in series.points().iter().zip(rsi.points()) {
            assert_eq!(p.timestamp, r.timestamp);
        }
        assert_eq!(rsi.defined_count(), 4);
    }

    // ---- classify --------------------------------------------------------

    #[test]
    fn classify_zones() {
        assert_eq!(classify(100.0), RsiZone::Overbought);
        assert_eq!(classify(70.0), RsiZone::Overbought);
        assert_eq!(classify(50.0), RsiZone::Neutral);
        assert_eq!(classify(30.0), RsiZone::Oversold);
        assert_eq!(classify(0.0), RsiZone::Oversold);
        assert_eq!(RsiZone::Oversold.to_string(), "OVERSOLD");
    }
}
