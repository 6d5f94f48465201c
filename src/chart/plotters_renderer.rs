// =============================================================================
// Plotters renderer — in-memory bitmap, PNG encoded
// =============================================================================
//
// Draws into an RGB buffer via `BitMapBackend::with_buffer`, then encodes the
// buffer as PNG. No files are touched.
// =============================================================================

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::prelude::*;
use tracing::debug;

use crate::chart::annotations::{IndicatorChart, PriceChart};
use crate::chart::{ChartImage, ChartRenderer, RenderError};

pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Number of dash/gap pairs used for the projected wave 5.
const PROJECTION_DASHES: usize = 12;

const WAVE_COLORS: [RGBColor; 5] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

#[derive(Debug, Clone, Copy)]
pub struct PlottersRenderer {
    width: u32,
    height: u32,
}

impl PlottersRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn canvas(&self) -> Result<Vec<u8>, RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(vec![0u8; self.width as usize * self.height as usize * 3])
    }

    fn encode(&self, rgb: &[u8]) -> Result<ChartImage, RenderError> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(rgb, self.width, self.height, ColorType::Rgb8)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        debug!(bytes = png.len(), "chart encoded");
        Ok(ChartImage::from_png(png))
    }

    fn draw_price(&self, chart: &PriceChart, buf: &mut [u8]) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(buf, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (lo, hi) = chart.value_range();
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..chart.x_extent(), lo..hi)
            .map_err(draw_err)?;

        let x_label = |x: &f64| chart.date_label(*x);
        ctx.configure_mesh()
            .x_desc("Date")
            .y_desc("Price")
            .x_label_formatter(&x_label)
            .draw()
            .map_err(draw_err)?;

        ctx.draw_series(LineSeries::new(
            chart.prices.iter().map(|p| (chart.x_of(p.timestamp), p.close)),
            BLUE.stroke_width(2),
        ))
        .map_err(draw_err)?
        .label(format!("{} Price", chart.ticker))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

        for (wave, color) in chart.waves.iter().zip(WAVE_COLORS) {
            let from = (chart.x_of(wave.from.0), wave.from.1);
            let to = (chart.x_of(wave.to.0), wave.to.1);
            ctx.draw_series(std::iter::once(PathElement::new(
                vec![from, to],
                color.stroke_width(2),
            )))
            .map_err(draw_err)?
            .label(wave.label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
            ctx.draw_series([from, to].map(|p| Circle::new(p, 4, color.filled())))
                .map_err(draw_err)?;
        }

        let seg = &chart.projection;
        let from = (chart.x_of(seg.from), seg.start);
        let to = (chart.x_of(seg.to), seg.end);
        ctx.draw_series(dashes(from, to).map(|d| PathElement::new(d, RED.stroke_width(2))))
            .map_err(draw_err)?
            .label("Predicted Wave 5")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 8, y)], RED.stroke_width(2)));
        ctx.draw_series([from, to].map(|p| Circle::new(p, 4, RED.filled())))
            .map_err(draw_err)?;

        ctx.configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)
    }

    fn draw_indicator(&self, chart: &IndicatorChart, buf: &mut [u8]) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(buf, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..chart.x_extent, 0f64..100f64)
            .map_err(draw_err)?;

        let x_label = |x: &f64| chart.date_label(*x);
        ctx.configure_mesh()
            .x_desc("Date")
            .y_desc("RSI Value")
            .x_label_formatter(&x_label)
            .draw()
            .map_err(draw_err)?;

        let orange = RGBColor(255, 165, 0);
        for (i, run) in chart.runs.iter().enumerate() {
            let anno = ctx
                .draw_series(LineSeries::new(
                    run.iter().map(|&(ts, v)| (chart.x_of(ts), v)),
                    orange.stroke_width(2),
                ))
                .map_err(draw_err)?;
            if i == 0 {
                anno.label(chart.series_label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], orange.stroke_width(2))
                });
            }
        }

        let [oversold, overbought] = chart.reference_levels;
        for (level, color, label) in [
            (oversold, RED, format!("Oversold ({oversold})")),
            (overbought, GREEN, format!("Overbought ({overbought})")),
        ] {
            let start = (0.0, level);
            let end = (chart.x_extent, level);
            ctx.draw_series(dashes(start, end).map(|d| PathElement::new(d, color.stroke_width(1))))
                .map_err(draw_err)?
                .label(label)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 8, y)], color.stroke_width(1))
                });
        }

        ctx.configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render_price_chart(&self, chart: &PriceChart) -> Result<ChartImage, RenderError> {
        if chart.prices.is_empty() {
            return Err(RenderError::NoData);
        }
        let mut buf = self.canvas()?;
        self.draw_price(chart, &mut buf)?;
        self.encode(&buf)
    }

    fn render_indicator_chart(&self, chart: &IndicatorChart) -> Result<ChartImage, RenderError> {
        let mut buf = self.canvas()?;
        self.draw_indicator(chart, &mut buf)?;
        self.encode(&buf)
    }
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Split the segment `from -> to` into evenly spaced dashes.
fn dashes(from: (f64, f64), to: (f64, f64)) -> impl Iterator<Item = Vec<(f64, f64)>> {
    let steps = PROJECTION_DASHES * 2;
    let lerp = move |k: usize| {
        let t = k as f64 / steps as f64;
        (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
    };
    (0..steps).step_by(2).map(move |k| vec![lerp(k), lerp(k + 1)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::rsi::calculate_rsi;
    use crate::pivot::locate_pivot;
    use crate::types::fixtures::daily_series;
    use crate::waves::project_waves;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn sample() -> (PriceChart, IndicatorChart) {
        // Ten falling days, then a choppy recovery.
        let closes: Vec<f64> = (0..40)
            .map(|i| match i {
                0..=9 => 100.0 - i as f64 * 2.0,
                _ if i % 3 == 0 => 80.0 + (i - 10) as f64 - 0.5,
                _ => 80.0 + (i - 10) as f64,
            })
            .collect();
        let series = daily_series(&closes);
        let rsi = calculate_rsi(&series, 5);
        let pivot = locate_pivot(&rsi).unwrap();
        let waves = project_waves(&series, &pivot).unwrap();
        (
            PriceChart::build(&series, &pivot, &waves, "TEST").unwrap(),
            IndicatorChart::build(&rsi, &pivot, "TEST").unwrap(),
        )
    }

    #[test]
    fn renders_price_chart_png() {
        let (price, _) = sample();
        let img = PlottersRenderer::new(320, 200).render_price_chart(&price).unwrap();
        assert!(img.as_bytes().starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn renders_indicator_chart_png() {
        let (_, rsi) = sample();
        let img = PlottersRenderer::new(320, 200).render_indicator_chart(&rsi).unwrap();
        assert!(img.as_bytes().starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn rejects_zero_size() {
        let (price, _) = sample();
        assert_eq!(
            PlottersRenderer::new(0, 100).render_price_chart(&price),
            Err(RenderError::InvalidSize { width: 0, height: 100 })
        );
    }

    #[test]
    fn dashes_cover_segment() {
        let d: Vec<_> = dashes((0.0, 0.0), (24.0, 48.0)).collect();
        assert_eq!(d.len(), PROJECTION_DASHES);
        assert_eq!(d[0], vec![(0.0, 0.0), (1.0, 2.0)]);
        assert_eq!(d.last().unwrap()[1], (23.0, 46.0));
    }
}
