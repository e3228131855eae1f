use super::{BatchResults, BatchTask, TaskFailure};
use crate::error::{Result, WeatherError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::io;

/// Run one scoped thread per key. Workers share a single result map whose
/// lock is taken only for the insert, never across the task itself.
pub fn run<T: BatchTask>(keys: &[T::Key], task: &T) -> Result<BatchResults<T::Key, T::Output>> {
    let results = Mutex::new(HashMap::with_capacity(keys.len()));

    let mut spawned = 0;
    let mut unspawned = Vec::new();

    let joined = crossbeam::scope(|scope| {
        for (index, key) in keys.iter().enumerate() {
            let results = &results;
            let started = scope
                .builder()
                .name(format!("lookup-{}", index))
                .spawn(move |_| {
                    tracing::debug!("Running task for {}", key);
                    let outcome = task.run(key).map_err(TaskFailure::from);
                    if let Err(failure) = &outcome {
                        tracing::warn!("Task for {} failed: {}", key, failure);
                    }
                    results.lock().insert(key.clone(), outcome);
                });
            match started {
                Ok(_) => spawned += 1,
                Err(e) => unspawned.push((key.clone(), e)),
            }
        }
    });

    if joined.is_err() {
        tracing::warn!("A lookup thread panicked before recording its result");
    }

    fill_unspawned(results.into_inner(), unspawned, spawned)
}

/// Keys whose thread could not be started fail in place, unless no thread
/// started at all, which fails the batch.
fn fill_unspawned<K, R>(
    mut results: BatchResults<K, R>,
    unspawned: Vec<(K, io::Error)>,
    spawned: usize,
) -> Result<BatchResults<K, R>>
where
    K: Eq + Hash + std::fmt::Display,
{
    if spawned == 0 {
        if let Some((_, error)) = unspawned.into_iter().next() {
            return Err(WeatherError::Io(error));
        }
        return Ok(results);
    }

    for (key, error) in unspawned {
        tracing::warn!("Could not start a thread for {}: {}", key, error);
        results.insert(
            key,
            Err(TaskFailure::new(format!("could not start thread: {}", error))),
        );
    }
    Ok(results)
}
