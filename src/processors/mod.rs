pub mod aggregation_engine;
pub mod coordinate_extractor;
pub mod forecast_merger;
pub mod strategy_benchmark;

pub use aggregation_engine::{AggregationEngine, FetchReport, GeolocationStage};
pub use coordinate_extractor::CoordinateExtractor;
pub use forecast_merger::{merge_forecasts, ForecastBatch};
pub use strategy_benchmark::{benchmark_strategies, BenchmarkReport, StrategyTiming};
