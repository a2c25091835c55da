use crate::error::{AppError, Result};
use crate::models::{BoundaryVertex, Crs, StaticDataset, Stop};
use geo::Point;
use geojson::{Feature, GeoJson};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the stop and boundary files from disk.
///
/// Nothing is cached: every [`load`](Self::load) re-reads both files. A
/// missing file yields `None` for its table instead of an error.
#[derive(Debug, Clone)]
pub struct StaticDataReader {
    stops_file: PathBuf,
    bounds_file: PathBuf,
}

impl StaticDataReader {
    pub fn new(stops_file: impl Into<PathBuf>, bounds_file: impl Into<PathBuf>) -> Self {
        StaticDataReader {
            stops_file: stops_file.into(),
            bounds_file: bounds_file.into(),
        }
    }

    pub fn load(&self) -> Result<StaticDataset> {
        let stops = load_points(&self.stops_file)?;
        let bounds = load_bounds(&self.bounds_file)?;

        tracing::debug!(
            stops = stops.as_ref().map(Vec::len),
            bounds = bounds.as_ref().map(Vec::len),
            "Static data loaded"
        );

        Ok(StaticDataset {
            stops,
            bounds,
            crs: Crs::Wgs84,
        })
    }
}

impl fmt::Display for StaticDataReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "static data files {} and {}",
            self.bounds_file.display(),
            self.stops_file.display()
        )
    }
}

/// Read WGS84 point features from a GeoJSON file.
pub fn load_points(path: &Path) -> Result<Option<Vec<Stop>>> {
    if !path.is_file() {
        tracing::warn!("Stops file {} not found, continuing without stops", path.display());
        return Ok(None);
    }

    let text = fs::read_to_string(path)?;
    let geojson: GeoJson = text.parse().map_err(|e| {
        AppError::StaticData(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    let features: Vec<Feature> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let total = features.len();
    let stops: Vec<Stop> = features
        .into_iter()
        .enumerate()
        .filter_map(|(i, feature)| Stop::from_feature(feature, i))
        .collect();

    if stops.len() < total {
        tracing::debug!(
            "Skipped {} non-point features in {}",
            total - stops.len(),
            path.display()
        );
    }

    Ok(Some(stops))
}

/// Read the outline from a whitespace-separated two-column text file.
///
/// The first column becomes the point's x ordinate and the second its y.
/// Lines that are not exactly two numbers (blank lines, osmosis-style section
/// headers and `END` markers) are skipped.
pub fn load_bounds(path: &Path) -> Result<Option<Vec<BoundaryVertex>>> {
    if !path.is_file() {
        tracing::warn!("Bounds file {} not found, continuing without bounds", path.display());
        return Ok(None);
    }

    let text = fs::read_to_string(path)?;
    Ok(Some(parse_bounds(&text)))
}

fn parse_bounds(text: &str) -> Vec<BoundaryVertex> {
    text.lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let first = columns.next()?.parse::<f64>().ok()?;
            let second = columns.next()?.parse::<f64>().ok()?;
            if columns.next().is_some() {
                return None;
            }
            Some(Point::new(first, second))
        })
        .collect()
}
