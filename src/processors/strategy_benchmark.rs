use crate::error::Result;
use crate::execution::Strategy;
use crate::models::{Coordinate, Place};
use crate::processors::AggregationEngine;
use crate::utils::progress::ProgressReporter;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyTiming {
    pub strategy: Strategy,
    pub geocoding: Duration,
    pub forecast: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct BenchmarkReport {
    pub timings: Vec<StrategyTiming>,
    pub located: usize,
}

impl BenchmarkReport {
    /// Elapsed seconds per stage (rows) and strategy (columns).
    pub fn table(&self) -> String {
        let mut table = format!("{:<20}", "");
        for timing in &self.timings {
            table.push_str(&format!("{:<20}", timing.strategy.label()));
        }
        table.push('\n');

        table.push_str(&format!("{:<20}", "geocoding data"));
        for timing in &self.timings {
            table.push_str(&format!("{:<20.2}", timing.geocoding.as_secs_f64()));
        }
        table.push('\n');

        table.push_str(&format!("{:<20}", "weather data"));
        for timing in &self.timings {
            table.push_str(&format!("{:<20.2}", timing.forecast.as_secs_f64()));
        }
        table.push('\n');
        table
    }

    /// Strategies from slowest to fastest by total time.
    pub fn ranking(&self) -> Vec<Strategy> {
        let mut timings = self.timings.clone();
        timings.sort_by(|a, b| (b.geocoding + b.forecast).cmp(&(a.geocoding + a.forecast)));
        timings.into_iter().map(|t| t.strategy).collect()
    }
}

/// Time each strategy on both stages over the whole catalog, ignoring the
/// caches. Forecast runs use the coordinates found by the first strategy.
pub fn benchmark_strategies(
    engine: &AggregationEngine,
    strategies: &[Strategy],
    progress: Option<&ProgressReporter>,
) -> Result<BenchmarkReport> {
    let mut report = BenchmarkReport::default();
    let mut coordinates: Option<BTreeMap<Place, Coordinate>> = None;

    for &strategy in strategies {
        let executor = engine.executor_for(strategy);

        if let Some(p) = progress {
            p.set_message(&format!("Geocoding ({})...", strategy));
        }
        let started = Instant::now();
        let located = engine.locate_places(&executor, engine.catalog())?;
        let geocoding = started.elapsed();

        let coordinates = coordinates.get_or_insert_with(|| {
            located
                .into_iter()
                .filter_map(|(place, outcome)| match outcome {
                    Ok(Some(coordinate)) => Some((place, coordinate)),
                    _ => None,
                })
                .collect()
        });
        let places: Vec<Place> = coordinates.keys().cloned().collect();

        if let Some(p) = progress {
            p.set_message(&format!("Fetching forecasts ({})...", strategy));
        }
        let started = Instant::now();
        engine.forecast_places(&executor, coordinates, &places)?;
        let forecast = started.elapsed();

        tracing::info!(
            "{}: geocoding {:.2?}, forecasts {:.2?}",
            strategy,
            geocoding,
            forecast
        );
        report.timings.push(StrategyTiming {
            strategy,
            geocoding,
            forecast,
        });
        if let Some(p) = progress {
            p.increment(1);
        }
    }

    report.located = coordinates.map(|c| c.len()).unwrap_or(0);
    Ok(report)
}
