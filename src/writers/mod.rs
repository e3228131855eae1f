pub mod cache_store;
pub mod report_writer;

pub use cache_store::{CacheStore, ForecastCache, GeolocationCache};
pub use report_writer::ReportWriter;
