use crate::models::crs::Crs;
use geo::{LineString, Point};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};

/// A stop from the static dataset: a point of interest with its source attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    /// `x` = longitude, `y` = latitude (WGS84).
    pub position: Point<f64>,
    pub properties: JsonObject,
}

impl Stop {
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Stop {
            id: id.into(),
            position: Point::new(lon, lat),
            properties: JsonObject::new(),
        }
    }

    pub fn lon(&self) -> f64 {
        self.position.x()
    }

    pub fn lat(&self) -> f64 {
        self.position.y()
    }

    /// Build a stop from a GeoJSON feature. Returns `None` for anything that
    /// is not a 2D point.
    ///
    /// The identifier is taken from the feature `id`, then the `id` property,
    /// then `fallback_index`.
    pub fn from_feature(feature: Feature, fallback_index: usize) -> Option<Self> {
        let (lon, lat) = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(coords)) if coords.len() >= 2 => (coords[0], coords[1]),
            _ => return None,
        };

        let properties = feature.properties.unwrap_or_default();
        let id = match feature.id {
            Some(Id::String(s)) => s,
            Some(Id::Number(n)) => n.to_string(),
            None => match properties.get("id") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => fallback_index.to_string(),
            },
        };

        Some(Stop {
            id,
            position: Point::new(lon, lat),
            properties,
        })
    }

    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![self.lon(), self.lat()]))),
            id: Some(Id::String(self.id.clone())),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

/// Serialise a stop table as a GeoJSON FeatureCollection.
pub fn to_feature_collection(stops: &[Stop]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: stops.iter().map(Stop::to_feature).collect(),
        foreign_members: None,
    }
}

/// One vertex of the city outline, in file order.
pub type BoundaryVertex = Point<f64>;

/// The two static tables, each `None` when its source file was missing.
///
/// `None` and `Some(vec![])` are kept apart so callers can tell "no file" from
/// "file without rows"; both mean nothing to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticDataset {
    pub stops: Option<Vec<Stop>>,
    pub bounds: Option<Vec<BoundaryVertex>>,
    pub crs: Crs,
}

impl StaticDataset {
    pub fn empty() -> Self {
        StaticDataset {
            stops: None,
            bounds: None,
            crs: Crs::Wgs84,
        }
    }

    pub fn stops(&self) -> &[Stop] {
        self.stops.as_deref().unwrap_or(&[])
    }

    pub fn bounds(&self) -> &[BoundaryVertex] {
        self.bounds.as_deref().unwrap_or(&[])
    }

    /// The outline as a closed ring, or `None` with fewer than three vertices.
    pub fn boundary_ring(&self) -> Option<LineString<f64>> {
        let bounds = self.bounds();
        if bounds.len() < 3 {
            return None;
        }
        let mut ring: LineString<f64> = bounds.iter().map(|p| p.0).collect();
        ring.close();
        Some(ring)
    }
}
