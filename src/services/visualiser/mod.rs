//! Renders the artifacts of one run: overview and close-up PNGs plus an
//! interactive Leaflet page.

mod interactive;
mod raster;

pub use interactive::map_page;
pub(crate) use interactive::escape_html;
pub use raster::{RasterLayers, RasterPlot};

use crate::constants::{CLOSEUP_CANVAS, DEFAULT_MAP_ZOOM, DEFAULT_TILE_URL_TEMPLATE, OVERVIEW_CANVAS};
use crate::error::{AppError, Result};
use crate::models::{BoundingBox, Crs, Extent, RunId, SimulationResult, StaticDataset, Stop};
use crate::services::tiles::BasemapProvider;
use std::path::PathBuf;

const OVERVIEW_TITLE: &str = "Overview plot";
const CLOSEUP_TITLE: &str = "Close up";

/// Knobs for the rendered artifacts that come from configuration.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Initial zoom of the interactive map.
    pub map_zoom: u8,
    /// Tile layer the interactive map loads in the browser.
    pub interactive_tile_url: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            map_zoom: DEFAULT_MAP_ZOOM,
            interactive_tile_url: DEFAULT_TILE_URL_TEMPLATE.to_string(),
        }
    }
}

/// Paths of the three artifacts written for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub overview: PathBuf,
    pub closeup: PathBuf,
    pub interactive_map: PathBuf,
}

pub struct Visualiser<'a> {
    bounding_box: BoundingBox,
    result: &'a SimulationResult,
    static_data: &'a StaticDataset,
    output_dir: PathBuf,
    run_id: RunId,
    basemap: &'a BasemapProvider,
    settings: RenderSettings,
    crs: Crs,
}

impl<'a> Visualiser<'a> {
    pub fn new(
        bounding_box: BoundingBox,
        result: &'a SimulationResult,
        static_data: &'a StaticDataset,
        output_dir: impl Into<PathBuf>,
        run_id: RunId,
        basemap: &'a BasemapProvider,
        settings: RenderSettings,
    ) -> Self {
        Visualiser {
            bounding_box,
            result,
            static_data,
            output_dir: output_dir.into(),
            run_id,
            basemap,
            settings,
            crs: Crs::WebMercator,
        }
    }

    pub async fn render_all(&self) -> Result<RenderedArtifacts> {
        Ok(RenderedArtifacts {
            overview: self.render_overview().await?,
            closeup: self.render_closeup().await?,
            interactive_map: self.render_interactive_map().await?,
        })
    }

    /// Whole dataset: stops, city outline, box and samples.
    pub async fn render_overview(&self) -> Result<PathBuf> {
        let plot = RasterPlot::new(
            OVERVIEW_TITLE,
            self.overview_layers()?,
            self.box_extent()?,
            OVERVIEW_CANVAS,
        );
        let path = self.output_dir.join(self.run_id.overview_file());
        self.draw(plot, path, "overview").await
    }

    /// Samples only, zoomed in on where they are.
    pub async fn render_closeup(&self) -> Result<PathBuf> {
        let layers = RasterLayers {
            pickups: self.project_stops(&self.result.pickup_points),
            dropoffs: self.project_stops(&self.result.dropoff_points),
            ..RasterLayers::default()
        };
        let plot = RasterPlot::new(CLOSEUP_TITLE, layers, self.box_extent()?, CLOSEUP_CANVAS);
        let path = self.output_dir.join(self.run_id.closeup_file());
        self.draw(plot, path, "closeup").await
    }

    pub async fn render_interactive_map(&self) -> Result<PathBuf> {
        let page = map_page(
            &format!("Simulation {}", self.run_id),
            &self.bounding_box,
            &self.result.pickup_points,
            &self.result.dropoff_points,
            self.settings.map_zoom,
            &self.settings.interactive_tile_url,
        )?;

        let path = self.output_dir.join(self.run_id.map_file());
        tokio::fs::write(&path, page).await?;
        tracing::info!(run_id = %self.run_id, "Wrote interactive map {}", path.display());
        Ok(path)
    }

    fn overview_layers(&self) -> Result<RasterLayers> {
        let boundary = match self.static_data.boundary_ring() {
            Some(ring) => ring
                .points()
                .filter_map(|p| self.project(p.x(), p.y()))
                .collect(),
            None => Vec::new(),
        };

        Ok(RasterLayers {
            stops: self.project_stops(self.static_data.stops()),
            boundary,
            bounding_box: Some(self.box_extent()?),
            pickups: self.project_stops(&self.result.pickup_points),
            dropoffs: self.project_stops(&self.result.dropoff_points),
        })
    }

    fn box_extent(&self) -> Result<Extent> {
        let (x1, y1, x2, y2) = self.bounding_box.to_projected(self.crs.epsg())?;
        Ok(Extent::new(x1, y1, x2, y2))
    }

    /// Points the map projection cannot represent are left off the plot.
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match self.crs.project(lon, lat) {
            Ok(xy) => Some(xy),
            Err(e) => {
                tracing::debug!(lon, lat, "Skipping point: {}", e);
                None
            }
        }
    }

    fn project_stops(&self, stops: &[Stop]) -> Vec<(f64, f64)> {
        stops
            .iter()
            .filter_map(|s| self.project(s.lon(), s.lat()))
            .collect()
    }

    async fn draw(&self, plot: RasterPlot, path: PathBuf, figure: &'static str) -> Result<PathBuf> {
        let background = self.basemap.basemap(&plot.view, plot.canvas).await;
        tracing::debug!(
            run_id = %self.run_id,
            figure,
            stops = plot.layers.stops.len(),
            pickups = plot.layers.pickups.len(),
            dropoffs = plot.layers.dropoffs.len(),
            basemap = background.is_some(),
            "Drawing {} plot",
            figure
        );

        let target = path.clone();
        tokio::task::spawn_blocking(move || plot.draw(background, &target))
            .await
            .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))??;

        tracing::info!(run_id = %self.run_id, "Wrote {} plot {}", figure, path.display());
        Ok(path)
    }
}
