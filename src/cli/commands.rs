use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{Result, WeatherError};
use crate::execution::{worker, Strategy, WorkerCommand};
use crate::lookup::HttpLookupClient;
use crate::models::{Forecast, ForecastField, Place};
use crate::processors::{benchmark_strategies, AggregationEngine, FetchReport};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CacheStore, ForecastCache, GeolocationCache, ReportWriter};
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::Level;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    let config_path = cli.config;
    let verbose = cli.verbose;

    match cli.command {
        Commands::Fetch {
            places,
            geo_strategy,
            forecast_strategy,
            max_workers,
            quiet,
        } => {
            if let Some(strategy) = geo_strategy {
                config.execution.geolocation = strategy;
            }
            if let Some(strategy) = forecast_strategy {
                config.execution.forecast = strategy;
            }
            if let Some(workers) = max_workers {
                config.execution.pool_size = workers.max(1);
            }

            let selection = if places.is_empty() {
                config.catalog.clone()
            } else {
                for place in &places {
                    if !config.catalog.contains(place) {
                        println!("⚠️  {} is not in the catalog", place);
                    }
                }
                places
            };

            println!(
                "Looking up {} places (geocoding: {}, forecasts: {})",
                selection.len(),
                config.execution.geolocation,
                config.execution.forecast
            );

            let worker = worker_command(config_path.as_deref(), verbose)?;
            let catalog = config.catalog.clone();
            let report = tokio::task::spawn_blocking(move || -> Result<FetchReport> {
                let client = Arc::new(HttpLookupClient::new(&config.endpoints)?);
                let engine = AggregationEngine::new(&config, client).with_worker_command(worker);
                let progress = ProgressReporter::new_spinner("Fetching...", quiet);
                engine.run(&selection, Some(&progress))
            })
            .await??;

            print_report(&report, &catalog);
        }

        Commands::Benchmark { max_workers } => {
            if let Some(workers) = max_workers {
                config.execution.pool_size = workers.max(1);
            }
            println!(
                "Benchmarking {} places with {} worker processes...",
                config.catalog.len(),
                config.execution.pool_size
            );

            let worker = worker_command(config_path.as_deref(), verbose)?;
            let report = tokio::task::spawn_blocking(move || {
                let client = Arc::new(HttpLookupClient::new(&config.endpoints)?);
                let engine = AggregationEngine::new(&config, client).with_worker_command(worker);
                let progress =
                    ProgressReporter::new(Strategy::ALL.len() as u64, "Benchmarking...", false);
                let report = benchmark_strategies(&engine, &Strategy::ALL, Some(&progress))?;
                progress.finish_with_message("Benchmark complete");
                Ok::<_, WeatherError>(report)
            })
            .await??;

            println!("\n{}", report.table());
            println!("{} of the catalog places were located", report.located);
            println!("\nThe ranking from slowest to fastest is:");
            for (rank, strategy) in report.ranking().iter().enumerate() {
                println!("{}) {}", rank + 1, strategy.label());
            }
        }

        Commands::Export { output_dir } => {
            let cache: ForecastCache = CacheStore::new(&config.cache.forecast_file)
                .load()
                .unwrap_or_default();
            if cache.is_empty() {
                println!("No saved forecasts to export");
                return Ok(());
            }

            let ordered = catalog_order(&cache, &config.catalog);
            let path = ReportWriter::new().write_report(ordered, &output_dir)?;
            println!("Weather data saved to {}", path.display());
        }

        Commands::Places => {
            let geolocations: Option<GeolocationCache> =
                CacheStore::new(&config.cache.geolocation_file).load();

            println!("Catalog ({} places):", config.catalog.len());
            for place in &config.catalog {
                let status = match geolocations.as_ref().map(|g| g.get(place)) {
                    None | Some(None) => "not cached".to_string(),
                    Some(Some(None)) => format!("outside {}", config.region.region),
                    Some(Some(Some(coordinate))) => coordinate.to_string(),
                };
                println!("  • {:<16} {}", place, status);
            }
        }

        Commands::Worker => {
            let served = tokio::task::spawn_blocking(move || {
                let client = HttpLookupClient::new(&config.endpoints)?;
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                worker::serve(stdin.lock(), stdout.lock(), &client)
            })
            .await??;
            tracing::debug!("Worker exiting after {} requests", served);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let initialised = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    initialised.map_err(|e| WeatherError::Config(format!("Failed to initialise logging: {}", e)))
}

/// Workers re-run this binary with the same configuration file and verbosity.
fn worker_command(config_path: Option<&Path>, verbose: bool) -> Result<WorkerCommand> {
    let mut command = WorkerCommand::current_exe()?;
    if let Some(path) = config_path {
        command = command.arg("--config").arg(path);
    }
    if verbose {
        command = command.arg("--verbose");
    }
    Ok(command)
}

fn catalog_order<'a>(
    forecasts: &'a ForecastCache,
    catalog: &'a [Place],
) -> Vec<(&'a Place, &'a Forecast)> {
    let mut ordered: Vec<(&Place, &Forecast)> = catalog
        .iter()
        .filter_map(|place| forecasts.get_key_value(place))
        .collect();
    ordered.extend(
        forecasts
            .iter()
            .filter(|(place, _)| !catalog.contains(place)),
    );
    ordered
}

fn print_report(report: &FetchReport, catalog: &[Place]) {
    println!("\nLocated places: {}", report.valid_places.join(", "));

    for (place, forecast) in catalog_order(&report.forecasts, catalog) {
        println!("\nWeather for {}:", place);
        print_forecast(forecast);
    }

    if !report.unlocated.is_empty() {
        println!(
            "\n⚠️  No coordinates for: {}",
            report.unlocated.join(", ")
        );
    }
    for (place, failure) in &report.failures {
        println!("⚠️  Lookup failed for {}: {}", place, failure);
    }
    if report.forecasts.is_empty() {
        println!("\nNo forecasts to display");
    }
}

fn print_forecast(forecast: &Forecast) {
    let header: Vec<String> = ForecastField::ALL
        .iter()
        .map(|field| format!("{:<12}", field.header()))
        .collect();
    println!("  {}", header.join(""));

    let columns: Vec<Vec<String>> = ForecastField::ALL
        .iter()
        .map(|field| forecast.column(*field))
        .collect();
    for day in 0..forecast.len() {
        let row: Vec<String> = columns
            .iter()
            .map(|column| format!("{:<12}", column[day]))
            .collect();
        println!("  {}", row.join(""));
    }
}
