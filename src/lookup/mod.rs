//! Access to the geocoding and forecast services.
//!
//! The engine only depends on [`LookupClient`]; [`HttpLookupClient`] is the
//! production implementation.

pub mod http_client;
pub mod tasks;

use crate::error::Result;
use crate::models::Coordinate;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use http_client::HttpLookupClient;
pub use tasks::{fetch_forecast, locate_place, ForecastTask, GeolocationTask, WorkerJob};

/// Fetches raw, unparsed responses. Implementations hold no per-request state.
pub trait LookupClient: Send + Sync {
    /// Candidate locations for a place name.
    fn geocode(&self, place: &str) -> Result<Value>;

    /// Daily forecast for a coordinate over the query's date range.
    fn forecast(&self, query: &ForecastQuery) -> Result<Value>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub coordinate: Coordinate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub temperature_unit: String,
    pub wind_speed_unit: String,
}

impl ForecastQuery {
    /// Query covering `start_date` plus `days` following days.
    pub fn new(coordinate: Coordinate, start_date: NaiveDate, days: u32) -> Self {
        Self {
            coordinate,
            start_date,
            end_date: start_date + Duration::days(i64::from(days)),
            temperature_unit: crate::utils::constants::DEFAULT_TEMPERATURE_UNIT.to_string(),
            wind_speed_unit: crate::utils::constants::DEFAULT_WIND_SPEED_UNIT.to_string(),
        }
    }

    pub fn with_units(mut self, temperature_unit: &str, wind_speed_unit: &str) -> Self {
        self.temperature_unit = temperature_unit.to_string();
        self.wind_speed_unit = wind_speed_unit.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_covers_horizon() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let query = ForecastQuery::new(Coordinate::new(38.3, -122.3).unwrap(), start, 4);

        assert_eq!(query.end_date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
        assert_eq!(query.temperature_unit, "fahrenheit");
        assert_eq!(query.wind_speed_unit, "mph");
    }
}
