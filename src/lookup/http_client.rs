use super::{ForecastQuery, LookupClient};
use crate::config::EndpointConfig;
use crate::error::{Result, WeatherError};
use crate::utils::constants::{
    DAILY_TEMP_MAX, DAILY_TEMP_MIN, DAILY_UV_MAX, DAILY_WIND_MAX, USER_AGENT,
};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

/// Blocking client for the open-meteo geocoding and forecast endpoints.
///
/// Must be created and used outside of an async runtime thread.
#[derive(Debug, Clone)]
pub struct HttpLookupClient {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
    result_count: u32,
}

impl HttpLookupClient {
    pub fn new(endpoints: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoints.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            geocoding_url: endpoints.geocoding_url.clone(),
            forecast_url: endpoints.forecast_url.clone(),
            result_count: endpoints.result_count,
        })
    }

    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self.client.get(url).query(query).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json()?)
    }
}

impl LookupClient for HttpLookupClient {
    fn geocode(&self, place: &str) -> Result<Value> {
        tracing::debug!("Geocoding {}", place);
        self.get_json(
            &self.geocoding_url,
            &[
                ("name", place.to_string()),
                ("count", self.result_count.to_string()),
                ("language", "en".to_string()),
                ("format", "json".to_string()),
            ],
        )
    }

    fn forecast(&self, query: &ForecastQuery) -> Result<Value> {
        tracing::debug!(
            "Fetching forecast for {} from {} to {}",
            query.coordinate,
            query.start_date,
            query.end_date
        );
        let daily = [DAILY_TEMP_MAX, DAILY_TEMP_MIN, DAILY_WIND_MAX, DAILY_UV_MAX].join(",");
        self.get_json(
            &self.forecast_url,
            &[
                ("latitude", query.coordinate.latitude.to_string()),
                ("longitude", query.coordinate.longitude.to_string()),
                ("daily", daily),
                ("temperature_unit", query.temperature_unit.clone()),
                ("wind_speed_unit", query.wind_speed_unit.clone()),
                ("timezone", "auto".to_string()),
                ("start_date", query.start_date.format("%Y-%m-%d").to_string()),
                ("end_date", query.end_date.format("%Y-%m-%d").to_string()),
            ],
        )
    }
}
