//! Stable application-wide constants.
//!
//! Values here are structural invariants, rendering styles, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! Deployment-specific values (paths, tile source, timeouts) live in
//! [`Config`](crate::config::Config) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- File locations (relative to the working directory) ---

/// Directory generated artifacts are written to and served from.
pub const DEFAULT_STATIC_DIR: &str = "webapp/static";
/// GeoJSON point file with the stop locations.
pub const DEFAULT_STOPS_FILE: &str = "data/berlin_stops.geojson";
/// Two-column text file tracing the city boundary.
pub const DEFAULT_BOUNDS_FILE: &str = "data/berlin_bounds.poly";
/// Process-wide basemap tile cache directory. Never invalidated.
pub const DEFAULT_TILE_CACHE_DIR: &str = "data/tile_cache";

// --- Basemap tiles ---

/// OpenStreetMap standard tile layer.
pub const DEFAULT_TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
/// Per-tile download timeout. Overridden by `TILE_FETCH_TIMEOUT_SECS`.
pub const DEFAULT_TILE_FETCH_TIMEOUT_SECS: u64 = 10;
/// Capacity of the in-memory tile cache fallback.
pub const DEFAULT_TILE_MEMORY_CACHE_MAX_ENTRIES: u64 = 512;
/// Edge length of a slippy-map tile in pixels.
pub const TILE_SIZE_PX: u32 = 256;
/// Highest zoom level requested from the tile server.
pub const MAX_TILE_ZOOM: u8 = 19;
/// Tile servers reject anonymous clients; identify ourselves.
pub const TILE_USER_AGENT: &str = concat!("stopviz/", env!("CARGO_PKG_VERSION"));

// --- Simulation ---

/// Share of requests per distance bin, `From 0->1km` .. `From 3->4km`.
pub const BOOKING_DISTANCE_DISTRIBUTION: [f64; 4] = [0.2, 0.1, 0.3, 0.4];
/// Upper bound on sampled pickup / dropoff points per simulation.
pub const MAX_SAMPLE_CAP: usize = 10;

// --- Projection ---

/// WGS84 geographic coordinates (degrees).
pub const EPSG_WGS84: u32 = 4326;
/// Spherical Web Mercator (metres), the CRS of slippy-map tiles.
pub const EPSG_WEB_MERCATOR: u32 = 3857;
/// Legacy unofficial code for Web Mercator.
pub const EPSG_WEB_MERCATOR_LEGACY: u32 = 900_913;
/// Semi-major axis of WGS84, used as the sphere radius by Web Mercator.
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;
/// Latitude at which Web Mercator becomes square; beyond it the transform is undefined.
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

// --- Rendering ---

/// Overview canvas size in pixels (width, height).
pub const OVERVIEW_CANVAS: (u32, u32) = (1500, 1200);
/// Close-up canvas size in pixels (width, height).
pub const CLOSEUP_CANVAS: (u32, u32) = (1500, 700);
/// Fraction of the data extent added on every side of a raster view.
pub const VIEW_PADDING_FRACTION: f64 = 0.05;
/// Minimum half-extent (metres) of a view, so a single point still gets a map around it.
pub const MIN_VIEW_HALF_EXTENT_M: f64 = 500.0;
/// Pixel radius of the pickup / dropoff triangle markers.
pub const SAMPLE_MARKER_SIZE_PX: i32 = 10;
/// Pixel radius of the stop dots on the overview.
pub const STOP_MARKER_SIZE_PX: i32 = 2;
/// Stroke width of the bounding-box rectangle.
pub const BOUNDING_BOX_STROKE_PX: u32 = 3;
/// Canvas colour used when no basemap is available.
pub const BLANK_BASEMAP_RGB: [u8; 3] = [236, 236, 236];

/// Default zoom of the interactive map. Overridden by `MAP_ZOOM`.
pub const DEFAULT_MAP_ZOOM: u8 = 13;

// --- Artifacts ---

/// Extensions of generated artifacts, removed by the cleaner before each run.
pub const ARTIFACT_EXTENSIONS: [&str; 2] = ["png", "html"];
