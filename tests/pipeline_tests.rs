use std::sync::Arc;
use std::time::Duration;
use stopviz::cache::MemoryTileCache;
use stopviz::models::BoundingBox;
use stopviz::services::cleaner::Cleaner;
use stopviz::services::pipeline::SimulationPipeline;
use stopviz::services::simulator::{stops_within, Simulator};
use stopviz::services::static_data::StaticDataReader;
use stopviz::services::tiles::{BasemapProvider, TileFetcher};
use stopviz::services::visualiser::RenderSettings;
use stopviz::AppError;

mod common;

#[test]
fn test_fixture_data_loads() {
    let reader = StaticDataReader::new(
        common::fixture_path("berlin_stops.geojson"),
        common::fixture_path("berlin_bounds.poly"),
    );
    let data = reader.load().unwrap();

    assert_eq!(data.stops().len(), 30);
    assert_eq!(data.bounds().len(), 19);
    assert_eq!(data.stops()[0].id, "900100001");
    assert!(data.boundary_ring().unwrap().is_closed());

    let inside = stops_within(data.stops(), &common::fixture_box()).unwrap();
    assert_eq!(inside.len(), common::STOPS_IN_FIXTURE_BOX);
}

#[test]
fn test_fixture_simulation_properties() {
    let reader = StaticDataReader::new(
        common::fixture_path("berlin_stops.geojson"),
        common::fixture_path("berlin_bounds.poly"),
    );
    let data = reader.load().unwrap();
    let bbox = common::fixture_box();

    for seed in 0..5 {
        let result = Simulator::new(data.stops(), seed).simulate(&bbox, 6).unwrap();
        let counts: Vec<u64> = result.distance_bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 2, 2]);
        assert_eq!(result.pickup_points.len(), 6);
        assert_eq!(result.dropoff_points.len(), 6);

        let mut ids: Vec<&str> = result.pickup_points.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6, "no stop sampled twice");
    }

    // Capped at ten samples
    let result = Simulator::new(data.stops(), 9).simulate(&bbox, 1000).unwrap();
    assert_eq!(result.pickup_points.len(), 10);
    assert_eq!(result.total_binned(), 1000);
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::get_test_config(dir.path());
    let pipeline = common::create_test_pipeline(&config);

    let run_id = pipeline.run(common::fixture_box(), 6).await.unwrap();

    assert_eq!(
        common::file_names(dir.path()),
        vec![run_id.closeup_file(), run_id.map_file(), run_id.overview_file()]
    );

    let overview = image::open(dir.path().join(run_id.overview_file())).unwrap();
    assert_eq!((overview.width(), overview.height()), (1500, 1200));
    let closeup = image::open(dir.path().join(run_id.closeup_file())).unwrap();
    assert_eq!((closeup.width(), closeup.height()), (1500, 700));

    let html = std::fs::read_to_string(dir.path().join(run_id.map_file())).unwrap();
    assert!(html.contains("\"zoom\":13"));
    assert!(html.contains("900100"));

    // Unrelated files survive, artifacts of the previous run do not
    std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();
    let next = pipeline.run(common::fixture_box(), 3).await.unwrap();
    assert!(next > run_id);
    assert_eq!(
        common::file_names(dir.path()),
        vec![
            next.closeup_file(),
            next.map_file(),
            next.overview_file(),
            "notes.txt".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_pipeline_runs_without_static_files() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = SimulationPipeline::new(
        StaticDataReader::new(dir.path().join("absent.geojson"), dir.path().join("absent.poly")),
        BasemapProvider::new(None, Arc::new(MemoryTileCache::new(4))),
        dir.path().join("out"),
        RenderSettings::default(),
    );

    let run_id = pipeline.run(common::fixture_box(), 6).await.unwrap();
    assert_eq!(common::file_names(&dir.path().join("out")).len(), 3);

    let result = pipeline.simulate(&common::fixture_box(), 6).await.unwrap();
    assert!(result.pickup_points.is_empty());
    assert!(result.dropoff_points.is_empty());
    assert!(dir.path().join("out").join(run_id.map_file()).is_file());
}

#[tokio::test]
async fn test_unreachable_tile_server_degrades_to_blank_basemap() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::get_test_config(dir.path());
    let fetcher = TileFetcher::new(
        "http://127.0.0.1:9/{z}/{x}/{y}.png".to_string(),
        Duration::from_millis(200),
    )
    .unwrap();
    let pipeline = SimulationPipeline::new(
        StaticDataReader::new(&config.stops_file, &config.bounds_file),
        BasemapProvider::new(Some(fetcher), Arc::new(MemoryTileCache::new(16))),
        dir.path(),
        RenderSettings::default(),
    );

    let run_id = pipeline.run(common::fixture_box(), 6).await.unwrap();
    assert!(dir.path().join(run_id.overview_file()).is_file());
    assert!(dir.path().join(run_id.closeup_file()).is_file());
}

#[tokio::test]
async fn test_invalid_box_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::get_test_config(dir.path());
    let pipeline = common::create_test_pipeline(&config);

    let bbox = BoundingBox::parse(["13.34", "52.52", "east", "52.56"]);
    let err = pipeline.run(bbox, 6).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidBoundingBox(_)));
    assert!(common::file_names(dir.path()).is_empty());
}

#[test]
fn test_cleaner_on_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let removed = Cleaner::remove_previous_outputs(&dir.path().join("nope")).unwrap();
    assert_eq!(removed, 0);
}
