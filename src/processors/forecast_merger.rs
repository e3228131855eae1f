use crate::execution::{BatchResults, TaskFailure};
use crate::models::{Forecast, Place};
use crate::writers::ForecastCache;
use std::collections::BTreeMap;

/// Fresh forecasts split from the places whose fetch failed.
#[derive(Debug, Default)]
pub struct ForecastBatch {
    pub fetched: BTreeMap<Place, Forecast>,
    pub failed: BTreeMap<Place, TaskFailure>,
}

impl ForecastBatch {
    pub fn from_results(results: BatchResults<Place, Forecast>) -> Self {
        let mut batch = Self::default();
        for (place, outcome) in results {
            match outcome {
                Ok(forecast) => {
                    batch.fetched.insert(place, forecast);
                }
                Err(failure) => {
                    batch.failed.insert(place, failure);
                }
            }
        }
        batch
    }
}

/// Fold fresh forecasts into the cached ones. Fresh entries replace cached
/// entries for the same place; every other cached place is kept.
pub fn merge_forecasts(cache: &mut ForecastCache, fresh: BTreeMap<Place, Forecast>) -> usize {
    let mut replaced = 0;
    for (place, forecast) in fresh {
        if cache.insert(place, forecast).is_some() {
            replaced += 1;
        }
    }
    replaced
}
