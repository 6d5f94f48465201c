// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator implementations. Outputs stay aligned with
// the input series; readings that cannot be computed are `None` rather than
// NaN so callers are forced to handle them.

pub mod rsi;
