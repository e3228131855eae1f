use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::{Result, WeatherError};
use crate::utils::constants::{DEFAULT_COUNTRY, DEFAULT_REGION};

/// A named location to look up. Names are unique within a batch.
pub type Place = String;

/// Deserializing goes through [`Coordinate::new`], so cached or received
/// coordinates are range-checked like fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(WeatherError::InvalidFormat(format!(
                "Non-finite coordinate ({}, {})",
                latitude, longitude
            )));
        }

        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = WeatherError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Country and first-level administrative region a geocoding candidate must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RegionFilter {
    #[validate(length(min = 1))]
    pub country: String,

    #[validate(length(min = 1))]
    pub region: String,
}

impl RegionFilter {
    pub fn new(country: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: region.into(),
        }
    }

    pub fn matches(&self, country: &str, region: &str) -> bool {
        self.country == country && self.region == region
    }
}

impl Default for RegionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY, DEFAULT_REGION)
    }
}
