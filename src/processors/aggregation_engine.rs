use crate::config::{AppConfig, ExecutionConfig, UnitsConfig};
use crate::error::Result;
use crate::execution::{BatchResults, Executor, Strategy, TaskFailure, WorkerCommand};
use crate::lookup::{ForecastTask, GeolocationTask, LookupClient};
use crate::models::{Coordinate, Forecast, Place, RegionFilter};
use crate::processors::forecast_merger::{merge_forecasts, ForecastBatch};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CacheStore, ForecastCache, GeolocationCache};
use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Outcome of one run of the two-stage pipeline.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Places with a coordinate, in catalog order
    pub valid_places: Vec<Place>,
    /// Selected places without a coordinate in the region
    pub unlocated: Vec<Place>,
    /// Forecasts for the selected places, taken from the merged cache
    pub forecasts: BTreeMap<Place, Forecast>,
    /// Selected places whose lookup failed in this run
    pub failures: BTreeMap<Place, TaskFailure>,
}

/// Coordinates for the catalog and where they came from.
#[derive(Debug, Clone, Default)]
pub struct GeolocationStage {
    pub geolocations: GeolocationCache,
    pub failures: BTreeMap<Place, TaskFailure>,
    pub from_cache: bool,
}

impl GeolocationStage {
    /// Places whose coordinate is present.
    pub fn coordinates(&self) -> BTreeMap<Place, Coordinate> {
        self.geolocations
            .iter()
            .filter_map(|(place, coordinate)| coordinate.map(|c| (place.clone(), c)))
            .collect()
    }
}

/// Cache-or-fetch coordinates, then fetch and merge forecasts.
pub struct AggregationEngine {
    catalog: Vec<Place>,
    region: RegionFilter,
    units: UnitsConfig,
    forecast_days: u32,
    execution: ExecutionConfig,
    worker: Option<WorkerCommand>,
    client: Arc<dyn LookupClient>,
    geolocation_cache: CacheStore,
    forecast_cache: CacheStore,
}

impl AggregationEngine {
    pub fn new(config: &AppConfig, client: Arc<dyn LookupClient>) -> Self {
        Self {
            catalog: config.catalog.clone(),
            region: config.region.clone(),
            units: config.units.clone(),
            forecast_days: config.forecast_days,
            execution: config.execution.clone(),
            worker: None,
            client,
            geolocation_cache: CacheStore::new(&config.cache.geolocation_file),
            forecast_cache: CacheStore::new(&config.cache.forecast_file),
        }
    }

    /// Command used to start workers for the process strategy. Defaults to
    /// the current executable's `worker` subcommand.
    pub fn with_worker_command(mut self, worker: WorkerCommand) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn catalog(&self) -> &[Place] {
        &self.catalog
    }

    pub fn executor_for(&self, strategy: Strategy) -> Executor {
        let executor = Executor::new(strategy).with_pool_size(self.execution.pool_size);
        match &self.worker {
            Some(worker) => executor.with_worker_command(worker.clone()),
            None => executor,
        }
    }

    /// Geolocations from the cache, if any were saved.
    pub fn cached_geolocations(&self) -> Option<GeolocationCache> {
        self.geolocation_cache.load()
    }

    /// All forecasts saved so far.
    pub fn cached_forecasts(&self) -> ForecastCache {
        self.forecast_cache.load().unwrap_or_default()
    }

    /// Geocode `places` with the given executor, bypassing the cache.
    pub fn locate_places(
        &self,
        executor: &Executor,
        places: &[Place],
    ) -> Result<BatchResults<Place, Option<Coordinate>>> {
        let task = GeolocationTask::new(self.client.as_ref(), self.region.clone());
        executor.run_batch(places, &task)
    }

    /// Fetch forecasts for `places` starting today, bypassing the cache.
    pub fn forecast_places(
        &self,
        executor: &Executor,
        coordinates: &BTreeMap<Place, Coordinate>,
        places: &[Place],
    ) -> Result<BatchResults<Place, Forecast>> {
        let task = ForecastTask::new(
            self.client.as_ref(),
            coordinates,
            today(),
            self.forecast_days,
        )
        .with_units(self.units.clone());
        executor.run_batch(places, &task)
    }

    /// Stage A. A saved, non-empty geolocation cache is used as-is;
    /// otherwise the whole catalog is geocoded and, when every lookup
    /// succeeded, saved.
    pub fn resolve_coordinates(&self) -> Result<GeolocationStage> {
        if let Some(geolocations) = self.cached_geolocations() {
            if !geolocations.is_empty() {
                tracing::info!(
                    "Using {} cached geolocations from {}",
                    geolocations.len(),
                    self.geolocation_cache.path().display()
                );
                return Ok(GeolocationStage {
                    geolocations,
                    failures: BTreeMap::new(),
                    from_cache: true,
                });
            }
        }

        let executor = self.executor_for(self.execution.geolocation);
        tracing::info!(
            "Geocoding {} places with the {} strategy",
            self.catalog.len(),
            executor.strategy()
        );
        let results = self.locate_places(&executor, &self.catalog)?;

        let mut stage = GeolocationStage::default();
        for (place, outcome) in results {
            match outcome {
                Ok(coordinate) => {
                    stage.geolocations.insert(place, coordinate);
                }
                Err(failure) => {
                    stage.failures.insert(place, failure);
                }
            }
        }

        if stage.failures.is_empty() {
            if let Err(e) = self.geolocation_cache.save(&stage.geolocations) {
                tracing::warn!("Could not save geolocation cache: {}", e);
            }
        } else {
            tracing::warn!(
                "Not caching geolocations: {} lookups failed",
                stage.failures.len()
            );
        }

        Ok(stage)
    }

    /// Run both stages for the selected places. Stage A always covers the
    /// whole catalog; stage B only the selected places that have a
    /// coordinate.
    pub fn run(
        &self,
        selection: &[Place],
        progress: Option<&ProgressReporter>,
    ) -> Result<FetchReport> {
        if let Some(p) = progress {
            p.set_message("Resolving coordinates...");
        }
        let stage = self.resolve_coordinates()?;
        let coordinates = stage.coordinates();

        let mut report = FetchReport {
            valid_places: self.in_catalog_order(coordinates.keys()),
            ..FetchReport::default()
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for place in selection {
            if !seen.insert(place) {
                continue;
            }
            if coordinates.contains_key(place) {
                targets.push(place.clone());
            } else if let Some(failure) = stage.failures.get(place) {
                report.failures.insert(place.clone(), failure.clone());
            } else {
                tracing::warn!("No {} coordinate for {}; skipping", self.region.region, place);
                report.unlocated.push(place.clone());
            }
        }

        if let Some(p) = progress {
            p.set_message(&format!("Fetching forecasts for {} places...", targets.len()));
        }
        let executor = self.executor_for(self.execution.forecast);
        let results = self.forecast_places(&executor, &coordinates, &targets)?;
        let batch = ForecastBatch::from_results(results);

        let mut merged = self.cached_forecasts();
        let fetched = batch.fetched.len();
        let replaced = merge_forecasts(&mut merged, batch.fetched);
        tracing::info!(
            "Merged {} forecasts ({} replaced) into {} cached places",
            fetched,
            replaced,
            merged.len()
        );
        if let Err(e) = self.forecast_cache.save(&merged) {
            tracing::warn!("Could not save forecast cache: {}", e);
        }

        report.failures.extend(batch.failed);
        for place in &targets {
            if let Some(forecast) = merged.get(place) {
                report.forecasts.insert(place.clone(), forecast.clone());
            }
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!("Fetched {} forecasts", fetched));
        }

        Ok(report)
    }

    /// Catalog places first, in catalog order, then any others by name.
    fn in_catalog_order<'a>(&self, places: impl Iterator<Item = &'a Place>) -> Vec<Place> {
        let mut places: Vec<Place> = places.cloned().collect();
        places.sort_by_key(|place| {
            let position = self
                .catalog
                .iter()
                .position(|p| p == place)
                .unwrap_or(usize::MAX);
            (position, place.clone())
        });
        places
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
