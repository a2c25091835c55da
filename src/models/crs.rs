use crate::constants::{
    EPSG_WEB_MERCATOR, EPSG_WEB_MERCATOR_LEGACY, EPSG_WGS84, WEB_MERCATOR_MAX_LAT,
    WEB_MERCATOR_RADIUS_M,
};
use serde::Serialize;
use std::f64::consts::FRAC_PI_4;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("unsupported coordinate reference system EPSG:{0}")]
    UnsupportedCrs(u32),

    #[error("latitude {0} is outside the Web Mercator domain")]
    OutOfDomain(f64),
}

/// The two coordinate reference systems the service works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Crs {
    /// Geographic longitude / latitude in degrees.
    Wgs84,
    /// Spherical Web Mercator in metres.
    WebMercator,
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self, ProjectionError> {
        match code {
            EPSG_WGS84 => Ok(Crs::Wgs84),
            EPSG_WEB_MERCATOR | EPSG_WEB_MERCATOR_LEGACY => Ok(Crs::WebMercator),
            other => Err(ProjectionError::UnsupportedCrs(other)),
        }
    }

    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => EPSG_WGS84,
            Crs::WebMercator => EPSG_WEB_MERCATOR,
        }
    }

    /// Project a WGS84 `(lon, lat)` pair into this system.
    pub fn project(self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        match self {
            Crs::Wgs84 => Ok((lon, lat)),
            Crs::WebMercator => {
                if lat.abs() > WEB_MERCATOR_MAX_LAT {
                    return Err(ProjectionError::OutOfDomain(lat));
                }
                let x = WEB_MERCATOR_RADIUS_M * lon.to_radians();
                let y = WEB_MERCATOR_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
                Ok((x, y))
            }
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}
