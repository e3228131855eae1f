use super::{ForecastQuery, LookupClient};
use crate::config::UnitsConfig;
use crate::error::{Result, WeatherError};
use crate::execution::BatchTask;
use crate::models::{Coordinate, Forecast, Place, RegionFilter};
use crate::processors::CoordinateExtractor;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Geocode a place and keep the first candidate inside the region.
pub fn locate_place(
    client: &dyn LookupClient,
    extractor: &CoordinateExtractor,
    place: &str,
) -> Result<Option<Coordinate>> {
    let raw = client.geocode(place)?;
    let coordinate = extractor.extract(&raw);
    if coordinate.is_none() {
        tracing::debug!(
            "No {} / {} match for {}",
            extractor.filter().country,
            extractor.filter().region,
            place
        );
    }
    Ok(coordinate)
}

/// Fetch and parse a forecast.
pub fn fetch_forecast(client: &dyn LookupClient, query: &ForecastQuery) -> Result<Forecast> {
    let raw = client.forecast(query)?;
    Forecast::from_response(&raw)
}

/// Self-contained description of one lookup, as sent to worker processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerJob {
    Geolocate { place: Place, filter: RegionFilter },
    Forecast { query: ForecastQuery },
}

impl WorkerJob {
    /// Run the lookup and return its parsed result as JSON.
    pub fn execute(&self, client: &dyn LookupClient) -> Result<Value> {
        match self {
            WorkerJob::Geolocate { place, filter } => {
                let extractor = CoordinateExtractor::new(filter.clone());
                let coordinate = locate_place(client, &extractor, place)?;
                Ok(serde_json::to_value(coordinate)?)
            }
            WorkerJob::Forecast { query } => {
                let forecast = fetch_forecast(client, query)?;
                Ok(serde_json::to_value(forecast)?)
            }
        }
    }
}

/// Place → coordinate-or-absence.
pub struct GeolocationTask<'a> {
    client: &'a dyn LookupClient,
    extractor: CoordinateExtractor,
}

impl<'a> GeolocationTask<'a> {
    pub fn new(client: &'a dyn LookupClient, filter: RegionFilter) -> Self {
        Self {
            client,
            extractor: CoordinateExtractor::new(filter),
        }
    }
}

impl BatchTask for GeolocationTask<'_> {
    type Key = Place;
    type Output = Option<Coordinate>;

    fn run(&self, place: &Place) -> Result<Option<Coordinate>> {
        locate_place(self.client, &self.extractor, place)
    }

    fn job(&self, place: &Place) -> Result<WorkerJob> {
        Ok(WorkerJob::Geolocate {
            place: place.clone(),
            filter: self.extractor.filter().clone(),
        })
    }
}

/// Place → forecast, for places with a known coordinate.
pub struct ForecastTask<'a> {
    client: &'a dyn LookupClient,
    coordinates: &'a BTreeMap<Place, Coordinate>,
    start_date: NaiveDate,
    days: u32,
    units: UnitsConfig,
}

impl<'a> ForecastTask<'a> {
    pub fn new(
        client: &'a dyn LookupClient,
        coordinates: &'a BTreeMap<Place, Coordinate>,
        start_date: NaiveDate,
        days: u32,
    ) -> Self {
        Self {
            client,
            coordinates,
            start_date,
            days,
            units: UnitsConfig::default(),
        }
    }

    pub fn with_units(mut self, units: UnitsConfig) -> Self {
        self.units = units;
        self
    }

    fn query(&self, place: &Place) -> Result<ForecastQuery> {
        let coordinate = self
            .coordinates
            .get(place)
            .ok_or_else(|| WeatherError::MissingData(format!("no coordinate for {}", place)))?;

        Ok(ForecastQuery::new(*coordinate, self.start_date, self.days)
            .with_units(&self.units.temperature, &self.units.wind_speed))
    }
}

impl BatchTask for ForecastTask<'_> {
    type Key = Place;
    type Output = Forecast;

    fn run(&self, place: &Place) -> Result<Forecast> {
        let query = self.query(place)?;
        fetch_forecast(self.client, &query)
    }

    fn job(&self, place: &Place) -> Result<WorkerJob> {
        Ok(WorkerJob::Forecast {
            query: self.query(place)?,
        })
    }
}
