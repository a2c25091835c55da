use crate::models::crs::{Crs, ProjectionError};
use geo::{coord, Polygon, Rect};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundingBoxError {
    #[error("ordinate {index} is not a finite number")]
    NonFinite { index: usize },

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Axis-aligned bounding box in WGS84 degrees, stored as `(x1, y1, x2, y2)`
/// = `(lon, lat, lon, lat)`.
///
/// The corners are kept exactly as submitted: they need not be ordered, and a
/// box built from unparseable input holds NaN sentinels. Every
/// coordinate-dependent accessor validates first and refuses to compute on
/// such a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        BoundingBox { x1, y1, x2, y2 }
    }

    /// Build a box from raw text ordinates. Anything that is not a number
    /// becomes NaN and is rejected later by the accessors.
    pub fn parse(raw: [&str; 4]) -> Self {
        let [x1, y1, x2, y2] = raw.map(|s| s.trim().parse::<f64>().unwrap_or(f64::NAN));
        BoundingBox { x1, y1, x2, y2 }
    }

    pub fn ordinates(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Fail on the first ordinate that is NaN or infinite.
    pub fn validate(&self) -> Result<(), BoundingBoxError> {
        match self.ordinates().iter().position(|v| !v.is_finite()) {
            Some(index) => Err(BoundingBoxError::NonFinite { index }),
            None => Ok(()),
        }
    }

    /// Corner latitudes in closed-ring order, clockwise from bottom-left.
    pub fn lats(&self) -> Result<[f64; 4], BoundingBoxError> {
        self.validate()?;
        Ok([self.y1, self.y2, self.y2, self.y1])
    }

    /// Corner longitudes matching [`lats`](Self::lats).
    pub fn lons(&self) -> Result<[f64; 4], BoundingBoxError> {
        self.validate()?;
        Ok([self.x1, self.x1, self.x2, self.x2])
    }

    /// Centre as `(lat, lon)`.
    pub fn center(&self) -> Result<(f64, f64), BoundingBoxError> {
        self.validate()?;
        Ok(((self.y1 + self.y2) / 2.0, (self.x1 + self.x2) / 2.0))
    }

    /// Reproject both corners into `target_epsg`, keeping `(x1, y1, x2, y2)` order.
    pub fn to_projected(&self, target_epsg: u32) -> Result<(f64, f64, f64, f64), BoundingBoxError> {
        self.validate()?;
        let crs = Crs::from_epsg(target_epsg)?;
        let (px1, py1) = crs.project(self.x1, self.y1)?;
        let (px2, py2) = crs.project(self.x2, self.y2)?;
        Ok((px1, py1, px2, py2))
    }

    /// Geographic rectangle with normalised min/max corners.
    pub fn to_rect(&self) -> Result<Rect<f64>, BoundingBoxError> {
        self.validate()?;
        Ok(Rect::new(
            coord! { x: self.x1, y: self.y1 },
            coord! { x: self.x2, y: self.y2 },
        ))
    }

    pub fn to_polygon(&self) -> Result<Polygon<f64>, BoundingBoxError> {
        Ok(self.to_rect()?.to_polygon())
    }
}
