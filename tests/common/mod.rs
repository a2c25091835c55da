use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stopviz::cache::MemoryTileCache;
use stopviz::config::{Config, TileConfig};
use stopviz::models::BoundingBox;
use stopviz::services::pipeline::SimulationPipeline;
use stopviz::services::static_data::StaticDataReader;
use stopviz::services::tiles::BasemapProvider;
use stopviz::services::visualiser::RenderSettings;
use stopviz::AppState;
use tempfile::TempDir;

/// Number of fixture stops strictly inside [`fixture_box`].
#[allow(dead_code)]
pub const STOPS_IN_FIXTURE_BOX: usize = 20;

/// Path of a file in the repository's `data/` directory
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

/// The Berlin example box
#[allow(dead_code)]
pub fn fixture_box() -> BoundingBox {
    BoundingBox::new(
        13.34014892578125,
        52.52791908000258,
        13.506317138671875,
        52.562995039558004,
    )
}

/// Get test configuration: fixture data, output in `static_dir`, no basemap
#[allow(dead_code)]
pub fn get_test_config(static_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        static_dir: static_dir.to_path_buf(),
        stops_file: fixture_path("berlin_stops.geojson"),
        bounds_file: fixture_path("berlin_bounds.poly"),
        tiles: TileConfig {
            url_template: None,
            cache_dir: static_dir.join("tile_cache"),
            fetch_timeout: Duration::from_secs(1),
            memory_cache_max_entries: 16,
        },
        map_zoom: 13,
    }
}

/// Pipeline over the test configuration; tiles stay offline
#[allow(dead_code)]
pub fn create_test_pipeline(config: &Config) -> SimulationPipeline {
    SimulationPipeline::new(
        StaticDataReader::new(&config.stops_file, &config.bounds_file),
        BasemapProvider::new(
            None,
            Arc::new(MemoryTileCache::new(config.tiles.memory_cache_max_entries)),
        ),
        config.static_dir.clone(),
        RenderSettings {
            map_zoom: config.map_zoom,
            ..RenderSettings::default()
        },
    )
}

/// Router plus the temporary output directory it writes to
#[allow(dead_code)]
pub fn setup_test_app() -> (axum::Router, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = get_test_config(dir.path());
    let pipeline = create_test_pipeline(&config);
    let state = Arc::new(AppState { config, pipeline });
    (stopviz::routes::create_router(state), dir)
}

/// Names of the files directly in `dir`, sorted
#[allow(dead_code)]
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
