use crate::error::Result;
use crate::execution::Strategy;
use crate::models::RegionFilter;
use crate::utils::constants::{
    CONFIG_FILE, DEFAULT_CATALOG, DEFAULT_FORECAST_DAYS, DEFAULT_TEMPERATURE_UNIT,
    DEFAULT_WIND_SPEED_UNIT, ENV_PREFIX, FORECAST_CACHE_FILE, FORECAST_URL, GEOCODING_RESULT_COUNT,
    GEOCODING_URL, GEOLOCATION_CACHE_FILE, MAX_FORECAST_DAYS, REQUEST_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Places offered for lookup, in display order
    #[validate(length(min = 1))]
    pub catalog: Vec<String>,

    #[validate(nested)]
    pub region: RegionFilter,

    #[validate(nested)]
    pub endpoints: EndpointConfig,

    pub units: UnitsConfig,

    pub cache: CacheConfig,

    #[validate(nested)]
    pub execution: ExecutionConfig,

    /// Days past today to forecast
    #[validate(range(max = MAX_FORECAST_DAYS))]
    pub forecast_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EndpointConfig {
    #[validate(length(min = 1))]
    pub geocoding_url: String,

    #[validate(length(min = 1))]
    pub forecast_url: String,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    #[validate(range(min = 1, max = 100))]
    pub result_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsConfig {
    pub temperature: String,
    pub wind_speed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub geolocation_file: PathBuf,
    pub forecast_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExecutionConfig {
    pub geolocation: Strategy,
    pub forecast: Strategy,

    /// Worker processes for the process strategy
    #[validate(range(min = 1))]
    pub pool_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
            region: RegionFilter::default(),
            endpoints: EndpointConfig::default(),
            units: UnitsConfig::default(),
            cache: CacheConfig::default(),
            execution: ExecutionConfig::default(),
            forecast_days: DEFAULT_FORECAST_DAYS,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
            result_count: GEOCODING_RESULT_COUNT,
        }
    }
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE_UNIT.to_string(),
            wind_speed: DEFAULT_WIND_SPEED_UNIT.to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            geolocation_file: PathBuf::from(GEOLOCATION_CACHE_FILE),
            forecast_file: PathBuf::from(FORECAST_CACHE_FILE),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            geolocation: Strategy::default(),
            forecast: Strategy::default(),
            pool_size: num_cpus::get(),
        }
    }
}

impl AppConfig {
    /// Layer built-in defaults, an optional config file and
    /// `TRAVEL_WEATHER__SECTION__KEY` environment variables.
    ///
    /// Without an explicit path, `travel-weather.{toml,json,yaml}` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("catalog"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        tracing::debug!(
            "Loaded configuration: {} places, geolocation={}, forecast={}",
            app_config.catalog.len(),
            app_config.execution.geolocation,
            app_config.execution.forecast
        );
        Ok(app_config)
    }
}
