// =============================================================================
// Chart rendering seam
// =============================================================================
//
// The pipeline hands the renderer fully-resolved annotations (which points to
// draw, where each wave boundary sits, where the dashed projection ends) and
// receives opaque PNG bytes back. Everything geometric lives in
// `annotations`, so a renderer only has to draw what it is given.
// =============================================================================

pub mod annotations;
pub mod plotters_renderer;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

pub use annotations::{IndicatorChart, PriceChart};
pub use plotters_renderer::PlottersRenderer;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("invalid chart size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("nothing to draw")]
    NoData,

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// An encoded PNG image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    png: Vec<u8>,
}

impl ChartImage {
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    /// `data:image/png;base64,<payload>`, ready to drop into an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Turns chart annotations into images.
pub trait ChartRenderer: Send + Sync {
    fn render_price_chart(&self, chart: &PriceChart) -> Result<ChartImage, RenderError>;

    fn render_indicator_chart(&self, chart: &IndicatorChart) -> Result<ChartImage, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_wraps_base64_payload() {
        let img = ChartImage::from_png(b"hello".to_vec());
        assert_eq!(img.to_data_uri(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(img.as_bytes(), b"hello");
    }

    #[test]
    fn empty_image_still_has_prefix() {
        let img = ChartImage::from_png(Vec::new());
        assert_eq!(img.to_data_uri(), "data:image/png;base64,");
    }
}
