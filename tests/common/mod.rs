#![allow(dead_code)]

use chrono::Duration;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use travel_weather::config::AppConfig;
use travel_weather::error::{Result, WeatherError};
use travel_weather::lookup::{ForecastQuery, LookupClient};

/// In-memory lookup client that counts calls.
#[derive(Default)]
pub struct MockClient {
    candidates: HashMap<String, Vec<Value>>,
    failing_forecasts: HashSet<String>,
    pub geocode_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geocoding candidates for `place`. Unknown places get no results.
    pub fn with_candidates(mut self, place: &str, candidates: Vec<Value>) -> Self {
        self.candidates.insert(place.to_string(), candidates);
        self
    }

    /// Place located at `latitude` inside California.
    pub fn in_california(self, place: &str, latitude: f64, longitude: f64) -> Self {
        self.with_candidates(
            place,
            vec![candidate(place, "United States", "California", latitude, longitude)],
        )
    }

    /// Forecasts for the coordinate with this latitude fail.
    pub fn failing_forecast_at(mut self, latitude: f64) -> Self {
        self.failing_forecasts.insert(latitude.to_string());
        self
    }

    pub fn geocode_count(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_count(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }
}

impl LookupClient for MockClient {
    fn geocode(&self, place: &str) -> Result<Value> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        match self.candidates.get(place) {
            Some(results) => Ok(json!({ "results": results })),
            None => Ok(json!({ "generationtime_ms": 0.2 })),
        }
    }

    fn forecast(&self, query: &ForecastQuery) -> Result<Value> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_forecasts
            .contains(&query.coordinate.latitude.to_string())
        {
            return Err(WeatherError::HttpStatus {
                status: 503,
                url: "mock://forecast".to_string(),
            });
        }

        let days = (query.end_date - query.start_date).num_days() + 1;
        Ok(daily_response(query.start_date, days as usize, query.coordinate.latitude))
    }
}

pub fn candidate(name: &str, country: &str, admin1: &str, latitude: f64, longitude: f64) -> Value {
    json!({
        "name": name,
        "country": country,
        "admin1": admin1,
        "latitude": latitude,
        "longitude": longitude
    })
}

/// Forecast response with `days` dates from `start`; highs derive from `base`.
pub fn daily_response(start: chrono::NaiveDate, days: usize, base: f64) -> Value {
    let dates: Vec<String> = (0..days)
        .map(|offset| (start + Duration::days(offset as i64)).to_string())
        .collect();
    let highs: Vec<f64> = (0..days).map(|offset| base + offset as f64).collect();
    let lows: Vec<f64> = highs.iter().map(|high| high - 20.0).collect();
    json!({
        "latitude": base,
        "daily": {
            "time": dates,
            "temperature_2m_max": highs,
            "temperature_2m_min": lows,
            "windspeed_10m_max": vec![8.5; days],
            "uv_index_max": vec![6.1; days]
        }
    })
}

/// Default configuration with the given catalog and caches under `dir`.
pub fn test_config(dir: &Path, catalog: &[&str]) -> AppConfig {
    let mut config = AppConfig::default();
    config.catalog = catalog.iter().map(|s| s.to_string()).collect();
    config.cache.geolocation_file = dir.join("geolocations.json");
    config.cache.forecast_file = dir.join("weather_data.json");
    config.execution.pool_size = 2;
    config
}
