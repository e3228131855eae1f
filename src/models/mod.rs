pub mod forecast;
pub mod place;

pub use forecast::{DailyForecast, Forecast, ForecastField};
pub use place::{Coordinate, Place, RegionFilter};
