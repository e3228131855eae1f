/// Default place catalog, in display order
pub const DEFAULT_CATALOG: [&str; 10] = [
    "Napa",
    "Sonoma",
    "Santa Cruz",
    "Monterey",
    "Berkeley",
    "Livermore",
    "San Francisco",
    "San Mateo",
    "San Jose",
    "Los Gatos",
];

/// Default region filter
pub const DEFAULT_COUNTRY: &str = "United States";
pub const DEFAULT_REGION: &str = "California";

/// Upstream endpoints
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const GEOCODING_RESULT_COUNT: u32 = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const USER_AGENT: &str = concat!("travel-weather/", env!("CARGO_PKG_VERSION"));

/// Geocoding response fields
pub const GEO_RESULTS: &str = "results";
pub const GEO_COUNTRY: &str = "country";
pub const GEO_REGION: &str = "admin1";
pub const GEO_LATITUDE: &str = "latitude";
pub const GEO_LONGITUDE: &str = "longitude";

/// Forecast response fields
pub const DAILY_BLOCK: &str = "daily";
pub const DAILY_DATES: &str = "time";
pub const DAILY_TEMP_MAX: &str = "temperature_2m_max";
pub const DAILY_TEMP_MIN: &str = "temperature_2m_min";
pub const DAILY_WIND_MAX: &str = "windspeed_10m_max";
pub const DAILY_UV_MAX: &str = "uv_index_max";

/// Forecast horizon: today plus this many days
pub const DEFAULT_FORECAST_DAYS: u32 = 4;
pub const MAX_FORECAST_DAYS: u32 = 15;

/// Units requested from the forecast service
pub const DEFAULT_TEMPERATURE_UNIT: &str = "fahrenheit";
pub const DEFAULT_WIND_SPEED_UNIT: &str = "mph";

/// Cache file names
pub const GEOLOCATION_CACHE_FILE: &str = "geolocations.json";
pub const FORECAST_CACHE_FILE: &str = "weather_data.json";

/// Export file name
pub const EXPORT_FILE: &str = "weather.txt";

/// Configuration sources
pub const CONFIG_FILE: &str = "travel-weather";
pub const ENV_PREFIX: &str = "TRAVEL_WEATHER";

/// Hidden subcommand that turns the binary into a process-pool worker
pub const WORKER_SUBCOMMAND: &str = "worker";
