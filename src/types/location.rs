//! Where a request points: a WGS84 coordinate pair or a numbered station.

use crate::error::{GlmMetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographical coordinate, longitude first as the providers expect it.
///
/// # Examples
///
/// ```
/// use glm_met::LonLat;
///
/// let albany = LonLat::new(116.69, -34.23).unwrap();
/// assert_eq!(albany.longitude(), 116.69);
/// assert!(LonLat::new(200.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    longitude: f64,
    latitude: f64,
}

impl LonLat {
    /// Creates a coordinate, rejecting values outside [-180, 180] x [-90, 90].
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        let valid = (-180.0..=180.0).contains(&longitude) && (-90.0..=90.0).contains(&latitude);
        if !valid {
            return Err(GlmMetError::InvalidLocation {
                longitude,
                latitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

/// A request location. Grid-style APIs take [`Location::Coordinates`],
/// station APIs take [`Location::Station`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    Coordinates(LonLat),
    Station(u32),
}

impl Location {
    pub fn as_coordinates(&self) -> Option<LonLat> {
        match self {
            Location::Coordinates(lon_lat) => Some(*lon_lat),
            Location::Station(_) => None,
        }
    }

    pub fn as_station(&self) -> Option<u32> {
        match self {
            Location::Station(id) => Some(*id),
            Location::Coordinates(_) => None,
        }
    }
}

impl From<LonLat> for Location {
    fn from(value: LonLat) -> Self {
        Location::Coordinates(value)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Coordinates(c) => write!(f, "({}, {})", c.longitude, c.latitude),
            Location::Station(id) => write!(f, "station {id}"),
        }
    }
}
