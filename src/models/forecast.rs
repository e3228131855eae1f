use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WeatherError};
use crate::utils::constants::{
    DAILY_BLOCK, DAILY_DATES, DAILY_TEMP_MAX, DAILY_TEMP_MIN, DAILY_UV_MAX, DAILY_WIND_MAX,
};

/// One day of a forecast. Measures are optional because the upstream
/// service reports `null` for days it has no model output for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub high_temp: Option<f64>,
    pub low_temp: Option<f64>,
    pub max_wind: Option<f64>,
    pub max_uv: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub days: Vec<DailyForecast>,
}

/// The five per-day columns of a forecast, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastField {
    Date,
    HighTemp,
    LowTemp,
    MaxWind,
    MaxUv,
}

impl ForecastField {
    pub const ALL: [ForecastField; 5] = [
        ForecastField::Date,
        ForecastField::HighTemp,
        ForecastField::LowTemp,
        ForecastField::MaxWind,
        ForecastField::MaxUv,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            ForecastField::Date => "Dates",
            ForecastField::HighTemp => "High Temp",
            ForecastField::LowTemp => "Low Temp",
            ForecastField::MaxWind => "Wind Speed",
            ForecastField::MaxUv => "UV",
        }
    }
}

/// Shape of the `daily` block returned by the forecast service.
#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(rename = "time")]
    dates: Vec<NaiveDate>,
    #[serde(rename = "temperature_2m_max")]
    high_temps: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min")]
    low_temps: Vec<Option<f64>>,
    #[serde(rename = "windspeed_10m_max")]
    max_winds: Vec<Option<f64>>,
    #[serde(rename = "uv_index_max")]
    max_uvs: Vec<Option<f64>>,
}

impl Forecast {
    /// Parse a raw forecast response. The five daily sequences must be
    /// present and of equal length.
    pub fn from_response(raw: &Value) -> Result<Self> {
        let daily = raw.get(DAILY_BLOCK).ok_or_else(|| {
            WeatherError::MissingData(format!("forecast response has no '{}' block", DAILY_BLOCK))
        })?;
        let block: DailyBlock = serde_json::from_value(daily.clone())?;

        let expected = block.dates.len();
        let lengths = [
            (DAILY_TEMP_MAX, block.high_temps.len()),
            (DAILY_TEMP_MIN, block.low_temps.len()),
            (DAILY_WIND_MAX, block.max_winds.len()),
            (DAILY_UV_MAX, block.max_uvs.len()),
        ];
        for (name, len) in lengths {
            if len != expected {
                return Err(WeatherError::InvalidFormat(format!(
                    "'{}' has {} entries but '{}' has {}",
                    name, len, DAILY_DATES, expected
                )));
            }
        }

        let days = block
            .dates
            .into_iter()
            .zip(block.high_temps)
            .zip(block.low_temps)
            .zip(block.max_winds)
            .zip(block.max_uvs)
            .map(
                |((((date, high_temp), low_temp), max_wind), max_uv)| DailyForecast {
                    date,
                    high_temp,
                    low_temp,
                    max_wind,
                    max_uv,
                },
            )
            .collect();

        Ok(Self { days })
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    /// Render one column of the forecast, one string per day.
    pub fn column(&self, field: ForecastField) -> Vec<String> {
        self.days
            .iter()
            .map(|day| match field {
                ForecastField::Date => day.date.format("%Y-%m-%d").to_string(),
                ForecastField::HighTemp => format_measure(day.high_temp),
                ForecastField::LowTemp => format_measure(day.low_temp),
                ForecastField::MaxWind => format_measure(day.max_wind),
                ForecastField::MaxUv => format_measure(day.max_uv),
            })
            .collect()
    }
}

fn format_measure(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}
