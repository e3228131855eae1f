use crate::models::{Coordinate, RegionFilter};
use crate::utils::constants::{GEO_COUNTRY, GEO_LATITUDE, GEO_LONGITUDE, GEO_REGION, GEO_RESULTS};
use serde_json::Value;

/// Picks the first geocoding candidate inside the configured region.
#[derive(Debug, Clone, Default)]
pub struct CoordinateExtractor {
    filter: RegionFilter,
}

impl CoordinateExtractor {
    pub fn new(filter: RegionFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &RegionFilter {
        &self.filter
    }

    /// Scan candidates in response order and return the coordinate of the
    /// first one whose country and region match. A response without a
    /// `results` list, or candidates missing fields, count as no match.
    pub fn extract(&self, raw: &Value) -> Option<Coordinate> {
        raw.get(GEO_RESULTS)?
            .as_array()?
            .iter()
            .find_map(|candidate| self.match_candidate(candidate))
    }

    fn match_candidate(&self, candidate: &Value) -> Option<Coordinate> {
        let country = candidate.get(GEO_COUNTRY)?.as_str()?;
        let region = candidate.get(GEO_REGION)?.as_str()?;
        if !self.filter.matches(country, region) {
            return None;
        }

        let latitude = candidate.get(GEO_LATITUDE)?.as_f64()?;
        let longitude = candidate.get(GEO_LONGITUDE)?.as_f64()?;
        Coordinate::new(latitude, longitude).ok()
    }
}
