use chrono::NaiveDate;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use travel_weather::models::{Coordinate, DailyForecast, Forecast};
use travel_weather::writers::{CacheStore, ForecastCache, GeolocationCache};

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("travel-weather.toml");
    let contents = format!(
        "catalog = [\"Napa\", \"Sonoma\"]\n\n[cache]\ngeolocation_file = {:?}\nforecast_file = {:?}\n",
        dir.join("geolocations.json"),
        dir.join("weather_data.json"),
    );
    std::fs::write(&path, contents).unwrap();
    path
}

fn travel_weather(config: &Path, args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_travel-weather"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("Failed to run binary");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

#[test]
fn test_export_writes_saved_forecasts() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = write_config(temp_dir.path());

    let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
    let mut cache = ForecastCache::new();
    cache.insert(
        "Napa".to_string(),
        Forecast {
            days: vec![DailyForecast {
                date,
                high_temp: Some(88.0),
                low_temp: Some(54.5),
                max_wind: Some(9.2),
                max_uv: None,
            }],
        },
    );
    CacheStore::new(temp_dir.path().join("weather_data.json"))
        .save(&cache)
        .unwrap();

    let out_dir = temp_dir.path().join("out");
    let (ok, stdout) = travel_weather(&config, &["export", "-o", out_dir.to_str().unwrap()]);

    assert!(ok);
    assert!(stdout.contains("weather.txt"));
    let report = std::fs::read_to_string(out_dir.join("weather.txt")).unwrap();
    assert_eq!(
        report,
        "Napa:\n2024-07-15\n88.0\n54.5\n9.2\n-\n\n"
    );
}

#[test]
fn test_export_without_cache_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = write_config(temp_dir.path());

    let out_dir = temp_dir.path().join("out");
    let (ok, stdout) = travel_weather(&config, &["export", "-o", out_dir.to_str().unwrap()]);

    assert!(ok);
    assert!(stdout.contains("No saved forecasts"));
    assert!(!out_dir.join("weather.txt").exists());
}

#[test]
fn test_places_shows_cached_coordinates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = write_config(temp_dir.path());

    let mut geolocations = GeolocationCache::new();
    geolocations.insert("Napa".to_string(), Some(Coordinate::new(38.3, -122.3).unwrap()));
    geolocations.insert("Sonoma".to_string(), None);
    CacheStore::new(temp_dir.path().join("geolocations.json"))
        .save(&geolocations)
        .unwrap();

    let (ok, stdout) = travel_weather(&config, &["places"]);

    assert!(ok);
    assert!(stdout.contains("Catalog (2 places)"));
    assert!(stdout.contains("38.3"));
    assert!(stdout.contains("outside California"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = temp_dir.path().join("bad.toml");
    std::fs::write(&config, "forecast_days = 40\n").unwrap();

    let (ok, _) = travel_weather(&config, &["places"]);

    assert!(!ok);
}
