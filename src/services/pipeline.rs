use crate::error::{AppError, Result};
use crate::models::{BoundingBox, RunId, RunIdGenerator, SimulationResult, StaticDataset};
use crate::services::cleaner::Cleaner;
use crate::services::simulator::Simulator;
use crate::services::static_data::StaticDataReader;
use crate::services::tiles::BasemapProvider;
use crate::services::visualiser::{RenderSettings, RenderedArtifacts, Visualiser};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Runs one form submission end to end: clean, load, simulate, render.
///
/// Runs are serialised so a new run's cleanup cannot delete files another run
/// is still writing. Artifacts of a finished run are still removed by the
/// next one.
pub struct SimulationPipeline {
    reader: StaticDataReader,
    basemap: BasemapProvider,
    output_dir: PathBuf,
    settings: RenderSettings,
    run_ids: RunIdGenerator,
    lock: Mutex<()>,
}

impl SimulationPipeline {
    pub fn new(
        reader: StaticDataReader,
        basemap: BasemapProvider,
        output_dir: impl Into<PathBuf>,
        settings: RenderSettings,
    ) -> Self {
        SimulationPipeline {
            reader,
            basemap,
            output_dir: output_dir.into(),
            settings,
            run_ids: RunIdGenerator::new(),
            lock: Mutex::new(()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn basemap(&self) -> &BasemapProvider {
        &self.basemap
    }

    pub async fn load_static_data(&self) -> Result<StaticDataset> {
        let reader = self.reader.clone();
        tokio::task::spawn_blocking(move || reader.load())
            .await
            .map_err(|e| AppError::Internal(format!("Static data task failed: {}", e)))?
    }

    /// Simulation only, nothing written to disk.
    pub async fn simulate(
        &self,
        bounding_box: &BoundingBox,
        number_of_requests: u32,
    ) -> Result<SimulationResult> {
        bounding_box.validate()?;
        let dataset = self.load_static_data().await?;
        Simulator::new(dataset.stops(), seed_from_clock()).simulate(bounding_box, number_of_requests)
    }

    /// Full run. Returns the id tagging the written artifacts.
    pub async fn run(&self, bounding_box: BoundingBox, number_of_requests: u32) -> Result<RunId> {
        bounding_box.validate()?;

        let _guard = self.lock.lock().await;
        let run_id = self.run_ids.next_id();
        tracing::info!(
            run_id = %run_id,
            requests = number_of_requests,
            "Starting run {}",
            run_id
        );

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let output_dir = self.output_dir.clone();
        let removed = tokio::task::spawn_blocking(move || Cleaner::remove_previous_outputs(&output_dir))
            .await
            .map_err(|e| AppError::Internal(format!("Cleanup task failed: {}", e)))??;
        tracing::debug!(run_id = %run_id, removed, "Removed previous artifacts");

        let dataset = self.load_static_data().await?;
        let result = Simulator::new(dataset.stops(), run_id.0).simulate(&bounding_box, number_of_requests)?;

        let artifacts = self.render(bounding_box, &result, &dataset, run_id).await?;
        tracing::info!(
            run_id = %run_id,
            overview = %artifacts.overview.display(),
            closeup = %artifacts.closeup.display(),
            map = %artifacts.interactive_map.display(),
            "Run {} finished",
            run_id
        );

        Ok(run_id)
    }

    async fn render(
        &self,
        bounding_box: BoundingBox,
        result: &SimulationResult,
        dataset: &StaticDataset,
        run_id: RunId,
    ) -> Result<RenderedArtifacts> {
        Visualiser::new(
            bounding_box,
            result,
            dataset,
            &self.output_dir,
            run_id,
            &self.basemap,
            self.settings.clone(),
        )
        .render_all()
        .await
    }
}

fn seed_from_clock() -> u64 {
    let now = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    now as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryTileCache;
    use std::sync::Arc;

    fn pipeline(dir: &Path) -> SimulationPipeline {
        let stops = dir.join("stops.geojson");
        std::fs::write(
            &stops,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","id":"a","geometry":{"type":"Point","coordinates":[13.40,52.54]},"properties":{}},
                {"type":"Feature","id":"b","geometry":{"type":"Point","coordinates":[13.45,52.55]},"properties":{}},
                {"type":"Feature","id":"far","geometry":{"type":"Point","coordinates":[13.10,52.40]},"properties":{}}
            ]}"#,
        )
        .unwrap();

        SimulationPipeline::new(
            StaticDataReader::new(stops, dir.join("missing.poly")),
            BasemapProvider::new(None, Arc::new(MemoryTileCache::new(4))),
            dir.join("out"),
            RenderSettings::default(),
        )
    }

    fn fixture_box() -> BoundingBox {
        BoundingBox::new(
            13.34014892578125,
            52.52791908000258,
            13.506317138671875,
            52.562995039558004,
        )
    }

    #[tokio::test]
    async fn run_writes_artifacts_and_replaces_previous_ones() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let first = pipeline.run(fixture_box(), 6).await.unwrap();
        let second = pipeline.run(fixture_box(), 6).await.unwrap();
        assert!(second > first);

        let out = dir.path().join("out");
        assert!(out.join(second.overview_file()).is_file());
        assert!(out.join(second.closeup_file()).is_file());
        assert!(out.join(second.map_file()).is_file());
        assert!(!out.join(first.overview_file()).exists());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn invalid_box_is_rejected_before_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("old.png"), b"x").unwrap();

        let bbox = BoundingBox::parse(["13.3", "oops", "13.5", "52.6"]);
        let err = pipeline.run(bbox, 6).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidBoundingBox(_)));
        assert!(out.join("old.png").exists());
    }

    #[tokio::test]
    async fn simulate_only_samples_inside_the_box() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let result = pipeline.simulate(&fixture_box(), 6).await.unwrap();
        assert_eq!(result.pickup_points.len(), 2);
        assert!(result.dropoff_points.iter().all(|s| s.id != "far"));
        assert!(!dir.path().join("out").exists());
    }
}
