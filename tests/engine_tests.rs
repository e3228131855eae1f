mod common;

use chrono::{Duration, Local};
use common::{candidate, test_config, MockClient};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use travel_weather::execution::Strategy;
use travel_weather::models::{Coordinate, DailyForecast, Forecast};
use travel_weather::processors::AggregationEngine;
use travel_weather::writers::{CacheStore, ForecastCache, GeolocationCache};

fn engine(config: &travel_weather::config::AppConfig, client: &Arc<MockClient>) -> AggregationEngine {
    AggregationEngine::new(config, client.clone())
}

#[test]
fn test_only_located_places_are_forecast() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &["Napa", "Sonoma"]);
    let client = Arc::new(
        MockClient::new()
            .in_california("Napa", 38.3, -122.3)
            .with_candidates(
                "Sonoma",
                vec![candidate("Sonoma", "United States", "Texas", 30.1, -97.3)],
            ),
    );

    let report = engine(&config, &client)
        .run(&config.catalog, None)
        .unwrap();

    assert_eq!(report.valid_places, vec!["Napa".to_string()]);
    assert_eq!(report.unlocated, vec!["Sonoma".to_string()]);
    assert!(report.failures.is_empty());
    assert_eq!(client.geocode_count(), 2);
    assert_eq!(client.forecast_count(), 1);

    assert_eq!(report.forecasts.len(), 1);
    let napa = &report.forecasts["Napa"];
    assert_eq!(napa.len(), 5);
    let today = Local::now().date_naive();
    assert_eq!(napa.first_date(), Some(today));
    assert_eq!(napa.days[4].date, today + Duration::days(4));
}

#[test]
fn test_geolocations_are_cached_for_later_runs() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &["Napa", "Sonoma"]);
    let client = Arc::new(MockClient::new().in_california("Napa", 38.3, -122.3));

    engine(&config, &client).run(&config.catalog, None).unwrap();

    let saved: GeolocationCache = CacheStore::new(&config.cache.geolocation_file)
        .load()
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved["Napa"], Some(Coordinate::new(38.3, -122.3).unwrap()));
    assert_eq!(saved["Sonoma"], None);

    let second = Arc::new(MockClient::new());
    let report = engine(&config, &second).run(&config.catalog, None).unwrap();

    assert_eq!(second.geocode_count(), 0);
    assert_eq!(second.forecast_count(), 1);
    assert_eq!(report.valid_places, vec!["Napa".to_string()]);
}

#[test]
fn test_prepopulated_geolocation_cache_skips_geocoding() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &["Napa", "Monterey"]);

    let mut cached = GeolocationCache::new();
    cached.insert("Napa".to_string(), Some(Coordinate::new(38.3, -122.3).unwrap()));
    cached.insert("Monterey".to_string(), Some(Coordinate::new(36.6, -121.9).unwrap()));
    CacheStore::new(&config.cache.geolocation_file)
        .save(&cached)
        .unwrap();

    let client = Arc::new(MockClient::new());
    let stage = engine(&config, &client).resolve_coordinates().unwrap();

    assert!(stage.from_cache);
    assert_eq!(stage.coordinates().len(), 2);
    assert_eq!(client.geocode_count(), 0);
}

#[test]
fn test_forecast_failure_is_reported_per_place() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &["Napa", "Berkeley"]);
    let client = Arc::new(
        MockClient::new()
            .in_california("Napa", 38.3, -122.3)
            .in_california("Berkeley", 37.9, -122.3)
            .failing_forecast_at(37.9),
    );

    let report = engine(&config, &client).run(&config.catalog, None).unwrap();

    assert_eq!(client.forecast_count(), 2);
    assert_eq!(report.forecasts.len(), 1);
    assert!(report.forecasts.contains_key("Napa"));
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures["Berkeley"].message.contains("503"));

    let saved: ForecastCache = CacheStore::new(&config.cache.forecast_file)
        .load()
        .unwrap();
    assert!(saved.contains_key("Napa"));
    assert!(!saved.contains_key("Berkeley"));
}

#[test]
fn test_merge_keeps_previously_cached_places() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &["Napa", "Sonoma"]);

    let old_day = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let stale = Forecast {
        days: vec![DailyForecast {
            date: old_day,
            high_temp: Some(70.0),
            low_temp: Some(50.0),
            max_wind: None,
            max_uv: None,
        }],
    };
    let mut existing = ForecastCache::new();
    existing.insert("Sonoma".to_string(), stale.clone());
    existing.insert("Napa".to_string(), stale.clone());
    CacheStore::new(&config.cache.forecast_file)
        .save(&existing)
        .unwrap();

    let client = Arc::new(
        MockClient::new()
            .in_california("Napa", 38.3, -122.3)
            .in_california("Sonoma", 38.2, -122.4),
    );
    let report = engine(&config, &client)
        .run(&["Napa".to_string()], None)
        .unwrap();

    assert_eq!(client.forecast_count(), 1);
    assert_eq!(report.forecasts.len(), 1);

    let saved: ForecastCache = CacheStore::new(&config.cache.forecast_file)
        .load()
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved["Sonoma"], stale);
    assert_ne!(saved["Napa"], stale);
    assert_eq!(saved["Napa"].first_date(), Some(Local::now().date_naive()));
}

#[test]
fn test_empty_selection_fetches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &["Napa"]);
    let client = Arc::new(MockClient::new().in_california("Napa", 38.3, -122.3));

    let report = engine(&config, &client).run(&[], None).unwrap();

    assert_eq!(report.valid_places, vec!["Napa".to_string()]);
    assert!(report.forecasts.is_empty());
    assert_eq!(client.forecast_count(), 0);
}

#[test]
fn test_serial_and_threaded_agree() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &["Napa", "Sonoma", "Berkeley"]);
    let client = Arc::new(
        MockClient::new()
            .in_california("Napa", 38.3, -122.3)
            .in_california("Sonoma", 38.2, -122.4)
            .in_california("Berkeley", 37.9, -122.3),
    );
    let engine = engine(&config, &client);

    let serial = engine
        .locate_places(&engine.executor_for(Strategy::Serial), engine.catalog())
        .unwrap();
    let threaded = engine
        .locate_places(&engine.executor_for(Strategy::Thread), engine.catalog())
        .unwrap();
    assert_eq!(serial, threaded);

    let coordinates: BTreeMap<String, Coordinate> = serial
        .into_iter()
        .filter_map(|(place, outcome)| outcome.ok().flatten().map(|c| (place, c)))
        .collect();
    let places: Vec<String> = coordinates.keys().cloned().collect();

    let serial = engine
        .forecast_places(&engine.executor_for(Strategy::Serial), &coordinates, &places)
        .unwrap();
    let threaded = engine
        .forecast_places(&engine.executor_for(Strategy::Thread), &coordinates, &places)
        .unwrap();
    assert_eq!(serial.len(), 3);
    assert_eq!(serial, threaded);
}
