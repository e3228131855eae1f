use super::{BatchResults, BatchTask, TaskFailure};
use std::collections::HashMap;

/// Run each task in key order on the calling thread.
pub fn run<T: BatchTask>(keys: &[T::Key], task: &T) -> BatchResults<T::Key, T::Output> {
    let mut results = HashMap::with_capacity(keys.len());
    for key in keys {
        tracing::debug!("Running task for {}", key);
        let outcome = task.run(key).map_err(TaskFailure::from);
        if let Err(failure) = &outcome {
            tracing::warn!("Task for {} failed: {}", key, failure);
        }
        results.insert(key.clone(), outcome);
    }
    results
}
