// =============================================================================
// Pivot Locator — earliest global minimum of the indicator
// =============================================================================
//
// The projection starts where momentum was weakest: the lowest defined RSI
// reading over the whole history. Undefined readings never take part in the
// comparison. When several readings share the minimum, the earliest wins.
// =============================================================================

use crate::error::PredictionError;
use crate::types::{IndicatorSeries, PivotPoint};

/// Locate the pivot in `indicator`.
///
/// Fails with [`PredictionError::NoPivotFound`] when no reading is defined,
/// e.g. when the history is shorter than `period + 1` closes.
pub fn locate_pivot(indicator: &IndicatorSeries) -> Result<PivotPoint, PredictionError> {
    let mut best: Option<PivotPoint> = None;

    for (index, point) in indicator.points().iter().enumerate() {
        let Some(value) = point.value else { continue };

        // Strict comparison keeps the earliest of equal minima.
        let better = match best {
            Some(b) => value < b.value,
            None => true,
        };
        if better {
            best = Some(PivotPoint {
                index,
                timestamp: point.timestamp,
                value,
            });
        }
    }

    best.ok_or(PredictionError::NoPivotFound)
}
