pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod lookup;
pub mod models;
pub mod processors;
pub mod utils;
pub mod writers;

pub use error::{Result, WeatherError};
