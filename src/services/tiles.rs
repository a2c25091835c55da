use crate::cache::{TileCache, TileKey};
use crate::constants::{
    BLANK_BASEMAP_RGB, MAX_TILE_ZOOM, TILE_SIZE_PX, TILE_USER_AGENT, WEB_MERCATOR_RADIUS_M,
};
use crate::error::{AppError, Result};
use crate::models::Extent;
use futures::stream::{self, StreamExt};
use image::{Rgb, RgbImage};
use reqwest::Client;
use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;

/// Concurrent downloads per basemap; tile servers throttle aggressive clients.
const MAX_CONCURRENT_TILE_FETCHES: usize = 6;

/// Half the width of the Web Mercator world in metres.
fn world_half_extent() -> f64 {
    PI * WEB_MERCATOR_RADIUS_M
}

/// Edge length of one tile in metres at `zoom`.
pub fn tile_span_m(zoom: u8) -> f64 {
    2.0 * world_half_extent() / f64::from(1u32 << zoom)
}

/// Zoom level whose native resolution is closest to `canvas_width_px` pixels
/// across `extent`.
pub fn zoom_for_extent(extent: &Extent, canvas_width_px: u32) -> u8 {
    let width = extent.width();
    if width.is_nan() || width <= 0.0 {
        return MAX_TILE_ZOOM;
    }
    let ratio = 2.0 * world_half_extent() * f64::from(canvas_width_px)
        / (f64::from(TILE_SIZE_PX) * width);
    ratio.log2().round().clamp(0.0, f64::from(MAX_TILE_ZOOM)) as u8
}

/// Inclusive block of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Tiles intersecting a Web Mercator extent, clamped to the world.
    pub fn covering(extent: &Extent, zoom: u8) -> Self {
        let span = tile_span_m(zoom);
        let last = (1u32 << zoom) - 1;
        let origin = world_half_extent();
        let index = |v: f64| (v / span).floor().clamp(0.0, f64::from(last)) as u32;

        TileRange {
            zoom,
            min_x: index(extent.min_x + origin),
            max_x: index(extent.max_x + origin),
            // Tile rows count down from the top of the world.
            min_y: index(origin - extent.max_y),
            max_y: index(origin - extent.min_y),
        }
    }

    pub fn columns(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn rows(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn keys(&self) -> Vec<TileKey> {
        (self.min_y..=self.max_y)
            .flat_map(|y| (self.min_x..=self.max_x).map(move |x| TileKey::new(self.zoom, x, y)))
            .collect()
    }
}

/// Downloads XYZ tiles from a `{z}/{x}/{y}` URL template.
#[derive(Clone)]
pub struct TileFetcher {
    client: Client,
    url_template: String,
}

impl TileFetcher {
    pub fn new(url_template: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(TILE_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Tile(format!("Failed to build HTTP client: {}", e)))?;

        Ok(TileFetcher {
            client,
            url_template,
        })
    }

    pub fn tile_url(&self, key: &TileKey) -> String {
        self.url_template
            .replace("{z}", &key.z.to_string())
            .replace("{x}", &key.x.to_string())
            .replace("{y}", &key.y.to_string())
    }

    pub async fn fetch(&self, key: &TileKey) -> Result<Vec<u8>> {
        let url = self.tile_url(key);
        tracing::debug!("Fetching tile {} from {}", key, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Tile(format!("Request for {} failed: {}", key, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Tile(format!(
                "HTTP {} for tile {}",
                response.status(),
                key
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Tile(format!("Failed to read tile {}: {}", key, e)))?;
        Ok(bytes.to_vec())
    }
}

/// Produces background rasters from cached or freshly downloaded tiles.
pub struct BasemapProvider {
    fetcher: Option<TileFetcher>,
    cache: Arc<dyn TileCache>,
}

impl BasemapProvider {
    pub fn new(fetcher: Option<TileFetcher>, cache: Arc<dyn TileCache>) -> Self {
        BasemapProvider { fetcher, cache }
    }

    pub fn is_enabled(&self) -> bool {
        self.fetcher.is_some()
    }

    pub fn cache(&self) -> &Arc<dyn TileCache> {
        &self.cache
    }

    /// A `canvas`-sized image of the tiles under `extent` (Web Mercator).
    ///
    /// Returns `None` when tiles are disabled or none could be loaded. Tiles
    /// that fail individually leave a blank patch.
    pub async fn basemap(&self, extent: &Extent, canvas: (u32, u32)) -> Option<RgbImage> {
        let fetcher = self.fetcher.as_ref()?;
        let range = TileRange::covering(extent, zoom_for_extent(extent, canvas.0));

        tracing::debug!(
            zoom = range.zoom,
            tiles = range.columns() * range.rows(),
            "Loading basemap tiles"
        );

        let loaded: Vec<(TileKey, Result<RgbImage>)> = stream::iter(range.keys())
            .map(|key| async move {
                let tile = self.load_tile(fetcher, &key).await;
                (key, tile)
            })
            .buffer_unordered(MAX_CONCURRENT_TILE_FETCHES)
            .collect()
            .await;

        let mut grid: Vec<Option<RgbImage>> = vec![None; (range.columns() * range.rows()) as usize];
        let mut failures = 0;
        for (key, tile) in loaded {
            match tile {
                Ok(image) => {
                    let slot = (key.y - range.min_y) * range.columns() + (key.x - range.min_x);
                    grid[slot as usize] = Some(image);
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!("{}", e);
                }
            }
        }

        if failures == grid.len() {
            tracing::warn!("No basemap tiles available, rendering without background");
            return None;
        }

        Some(compose(&grid, &range, extent, canvas))
    }

    async fn load_tile(&self, fetcher: &TileFetcher, key: &TileKey) -> Result<RgbImage> {
        if let Some(bytes) = self.cache.get_tile(key).await {
            match decode(key, &bytes) {
                Ok(image) => return Ok(image),
                Err(e) => tracing::warn!("Discarding cached tile: {}", e),
            }
        }

        let bytes = fetcher.fetch(key).await?;
        let image = decode(key, &bytes)?;
        self.cache.store_tile(key, &bytes).await;
        Ok(image)
    }
}

fn decode(key: &TileKey, bytes: &[u8]) -> Result<RgbImage> {
    image::load_from_memory(bytes)
        .map(|image| image.to_rgb8())
        .map_err(|e| AppError::Tile(format!("Failed to decode tile {}: {}", key, e)))
}

/// Nearest-neighbour resample of the tile grid onto the canvas.
fn compose(grid: &[Option<RgbImage>], range: &TileRange, extent: &Extent, canvas: (u32, u32)) -> RgbImage {
    let (width, height) = canvas;
    let span = tile_span_m(range.zoom);
    let origin = world_half_extent();

    // (grid column or row, fraction within the tile) per output column / row
    let locate = |global: f64, first: u32, count: u32| -> Option<(u32, f64)> {
        let index = global.floor();
        if index < f64::from(first) || index >= f64::from(first + count) {
            return None;
        }
        Some((index as u32 - first, global - index))
    };

    let columns: Vec<Option<(u32, f64)>> = (0..width)
        .map(|px| {
            let mx = extent.min_x + (f64::from(px) + 0.5) * extent.width() / f64::from(width);
            locate((mx + origin) / span, range.min_x, range.columns())
        })
        .collect();
    let rows: Vec<Option<(u32, f64)>> = (0..height)
        .map(|py| {
            let my = extent.max_y - (f64::from(py) + 0.5) * extent.height() / f64::from(height);
            locate((origin - my) / span, range.min_y, range.rows())
        })
        .collect();

    let blank = Rgb(BLANK_BASEMAP_RGB);
    let mut canvas_image = RgbImage::from_pixel(width, height, blank);
    for (py, row) in rows.iter().enumerate() {
        let Some((grid_row, fy)) = row else { continue };
        for (px, column) in columns.iter().enumerate() {
            let Some((grid_col, fx)) = column else { continue };
            let slot = (grid_row * range.columns() + grid_col) as usize;
            if let Some(tile) = &grid[slot] {
                let tx = ((fx * f64::from(tile.width())) as u32).min(tile.width() - 1);
                let ty = ((fy * f64::from(tile.height())) as u32).min(tile.height() - 1);
                canvas_image.put_pixel(px as u32, py as u32, *tile.get_pixel(tx, ty));
            }
        }
    }
    canvas_image
}
