use crate::constants::{
    BLANK_BASEMAP_RGB, BOUNDING_BOX_STROKE_PX, MIN_VIEW_HALF_EXTENT_M, SAMPLE_MARKER_SIZE_PX,
    STOP_MARKER_SIZE_PX, VIEW_PADDING_FRACTION,
};
use crate::error::{AppError, Result};
use crate::models::Extent;
use image::{Rgb, RgbImage};
use plotters::prelude::*;
use plotters::style::register_font;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use std::sync::OnceLock;

const STOP_COLOR: RGBColor = RGBColor(31, 119, 180);
const BOUNDARY_COLOR: RGBColor = RED;
const BOUNDING_BOX_COLOR: RGBColor = RED;
const PICKUP_COLOR: RGBColor = RGBColor(0, 128, 0);
const DROPOFF_COLOR: RGBColor = RED;

const FONT_BYTES: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");
const TITLE_FONT_PX: f64 = 28.0;
const LEGEND_FONT_PX: f64 = 18.0;

pub const STOPS_LABEL: &str = "Stops";
pub const BOUNDING_BOX_LABEL: &str = "bbox";
pub const PICKUPS_LABEL: &str = "Pickup Requests";
pub const DROPOFFS_LABEL: &str = "Dropoff Requests";

/// Projected geometry for one raster figure. Layers left empty are skipped.
#[derive(Debug, Clone, Default)]
pub struct RasterLayers {
    pub stops: Vec<(f64, f64)>,
    /// Closed ring, first vertex repeated at the end.
    pub boundary: Vec<(f64, f64)>,
    pub bounding_box: Option<Extent>,
    pub pickups: Vec<(f64, f64)>,
    pub dropoffs: Vec<(f64, f64)>,
}

impl RasterLayers {
    /// Extent of every drawn layer, `None` when there is nothing to draw.
    pub fn data_extent(&self) -> Option<Extent> {
        let points = self
            .stops
            .iter()
            .chain(&self.boundary)
            .chain(&self.pickups)
            .chain(&self.dropoffs)
            .copied();
        let extent = Extent::from_points(points);
        match (extent, self.bounding_box) {
            (Some(e), Some(b)) => Some(e.union(&b)),
            (e, b) => e.or(b),
        }
    }

    /// Legend entries in drawing order. The outline is drawn but not listed.
    pub fn legend(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if !self.stops.is_empty() {
            labels.push(STOPS_LABEL);
        }
        if self.bounding_box.is_some() {
            labels.push(BOUNDING_BOX_LABEL);
        }
        if !self.pickups.is_empty() {
            labels.push(PICKUPS_LABEL);
        }
        if !self.dropoffs.is_empty() {
            labels.push(DROPOFFS_LABEL);
        }
        labels
    }
}

/// A figure ready to be drawn: title, geometry, view window and canvas size.
#[derive(Debug, Clone)]
pub struct RasterPlot {
    pub title: &'static str,
    pub layers: RasterLayers,
    pub view: Extent,
    pub canvas: (u32, u32),
}

impl RasterPlot {
    /// Frame `layers` on a canvas, falling back to `fallback_view` when the
    /// layers are empty.
    pub fn new(
        title: &'static str,
        layers: RasterLayers,
        fallback_view: Extent,
        canvas: (u32, u32),
    ) -> Self {
        let view = layers
            .data_extent()
            .unwrap_or(fallback_view)
            .padded(VIEW_PADDING_FRACTION, MIN_VIEW_HALF_EXTENT_M)
            .fit_aspect(canvas.0, canvas.1);
        RasterPlot {
            title,
            layers,
            view,
            canvas,
        }
    }

    /// Draw over `background` (or a blank canvas) and write a PNG to `path`.
    pub fn draw(&self, background: Option<RgbImage>, path: &Path) -> Result<()> {
        ensure_font()?;
        let (width, height) = self.canvas;
        let background = background
            .filter(|image| image.dimensions() == self.canvas)
            .unwrap_or_else(|| RgbImage::from_pixel(width, height, Rgb(BLANK_BASEMAP_RGB)));

        let mut buffer = background.into_raw();
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.draw_layers(&root).map_err(render_error)?;
            root.present().map_err(render_error)?;
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| AppError::Render("Canvas buffer has the wrong size".to_string()))?;
        image
            .save(path)
            .map_err(|e| AppError::Render(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn draw_layers(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let view = &self.view;
        let mut chart = ChartBuilder::on(root)
            .margin(0_i32)
            .build_cartesian_2d(view.min_x..view.max_x, view.min_y..view.max_y)?;

        let layers = &self.layers;

        if !layers.stops.is_empty() {
            chart
                .draw_series(
                    layers
                        .stops
                        .iter()
                        .map(|&p| Circle::new(p, STOP_MARKER_SIZE_PX, STOP_COLOR.filled())),
                )?
                .label(STOPS_LABEL)
                .legend(|(x, y)| Circle::new((x, y), 4, STOP_COLOR.filled()));
        }

        if layers.boundary.len() > 1 {
            chart.draw_series(std::iter::once(PathElement::new(
                layers.boundary.clone(),
                BOUNDARY_COLOR.stroke_width(2),
            )))?;
        }

        if let Some(b) = layers.bounding_box {
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(b.min_x, b.min_y), (b.max_x, b.max_y)],
                    BOUNDING_BOX_COLOR.stroke_width(BOUNDING_BOX_STROKE_PX),
                )))?
                .label(BOUNDING_BOX_LABEL)
                .legend(|(x, y)| {
                    PathElement::new(
                        vec![(x - 10, y), (x + 10, y)],
                        BOUNDING_BOX_COLOR.stroke_width(BOUNDING_BOX_STROKE_PX),
                    )
                });
        }

        let s = SAMPLE_MARKER_SIZE_PX;
        if !layers.pickups.is_empty() {
            chart
                .draw_series(
                    layers
                        .pickups
                        .iter()
                        .map(|&p| TriangleMarker::new(p, s, PICKUP_COLOR.filled())),
                )?
                .label(PICKUPS_LABEL)
                .legend(|(x, y)| TriangleMarker::new((x, y), 6, PICKUP_COLOR.filled()));
        }

        if !layers.dropoffs.is_empty() {
            chart
                .draw_series(layers.dropoffs.iter().map(|&p| {
                    EmptyElement::at(p)
                        + Polygon::new(vec![(-s, -s), (s, -s), (0, s)], DROPOFF_COLOR.filled())
                }))?
                .label(DROPOFFS_LABEL)
                .legend(|(x, y)| {
                    Polygon::new(
                        vec![(x - 6, y - 6), (x + 6, y - 6), (x, y + 6)],
                        DROPOFF_COLOR.filled(),
                    )
                });
        }

        if !layers.legend().is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .label_font(
                    FontDesc::new(FontFamily::SansSerif, LEGEND_FONT_PX, FontStyle::Normal)
                        .color(&BLACK),
                )
                .draw()?;
        }

        // Drawn on the root so the plot area keeps the basemap's geometry.
        let title_style = FontDesc::new(FontFamily::SansSerif, TITLE_FONT_PX, FontStyle::Normal)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            self.title,
            (self.canvas.0 as i32 / 2, 8),
            title_style,
        ))?;

        Ok(())
    }
}

/// Plot text uses the bundled DejaVu Sans, registered once per process.
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font("sans-serif", FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "Cannot load plot font: invalid font data".to_string())
        })
        .clone()
        .map_err(AppError::Render)
}

fn render_error(e: impl std::fmt::Display) -> AppError {
    AppError::Render(e.to_string())
}
