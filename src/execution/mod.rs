//! Interchangeable ways of running one independent task per key.
//!
//! Every strategy returns exactly one entry per distinct input key: either
//! the task's output or a [`TaskFailure`]. A failing task never aborts the
//! batch; only failing to start the execution substrate does.

pub mod process_pool;
pub mod protocol;
pub mod serial;
pub mod threaded;
pub mod worker;

use crate::error::{Result, WeatherError};
use crate::lookup::WorkerJob;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::time::Instant;

pub use process_pool::WorkerCommand;

/// Per-key failure marker. Plain data so it can cross a process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct TaskFailure {
    pub message: String,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<WeatherError> for TaskFailure {
    fn from(error: WeatherError) -> Self {
        Self::new(error.to_string())
    }
}

pub type TaskOutcome<R> = std::result::Result<R, TaskFailure>;
pub type BatchResults<K, R> = HashMap<K, TaskOutcome<R>>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One task after another on the calling thread
    Serial,
    /// One thread per key inside this process
    #[default]
    Thread,
    /// A fixed pool of worker processes
    Process,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Serial, Strategy::Thread, Strategy::Process];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Serial => "serial",
            Strategy::Thread => "multithreading",
            Strategy::Process => "multiprocessing",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Serial => "serial",
            Strategy::Thread => "thread",
            Strategy::Process => "process",
        };
        f.write_str(name)
    }
}

/// A unit of work that can run for any key of a batch.
pub trait BatchTask: Sync {
    type Key: Clone + Eq + Hash + Send + Sync + fmt::Display;
    type Output: Send + DeserializeOwned;

    /// Run the task in this process.
    fn run(&self, key: &Self::Key) -> Result<Self::Output>;

    /// Describe the task for `key` so a worker process can run it without
    /// any state from this process.
    fn job(&self, key: &Self::Key) -> Result<WorkerJob>;
}

#[derive(Debug, Clone)]
pub struct Executor {
    strategy: Strategy,
    pool_size: usize,
    worker: Option<WorkerCommand>,
}

impl Executor {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            pool_size: num_cpus::get(),
            worker: None,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn with_worker_command(mut self, worker: WorkerCommand) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Run `task` for every distinct key and block until all have finished.
    pub fn run_batch<T: BatchTask>(
        &self,
        keys: &[T::Key],
        task: &T,
    ) -> Result<BatchResults<T::Key, T::Output>> {
        let keys = distinct(keys);
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let started = Instant::now();
        let mut results = match self.strategy {
            Strategy::Serial => serial::run(&keys, task),
            Strategy::Thread => threaded::run(&keys, task)?,
            Strategy::Process => {
                let worker = match &self.worker {
                    Some(worker) => worker.clone(),
                    None => WorkerCommand::current_exe()?,
                };
                process_pool::run(&keys, task, &worker, self.pool_size)?
            }
        };

        for key in &keys {
            results.entry(key.clone()).or_insert_with(|| {
                tracing::warn!("No result reported for {}", key);
                Err(TaskFailure::new("worker finished without reporting a result"))
            });
        }

        let failed = results.values().filter(|outcome| outcome.is_err()).count();
        tracing::info!(
            "{} batch of {} finished in {:.2?} ({} failed)",
            self.strategy,
            keys.len(),
            started.elapsed(),
            failed
        );

        Ok(results)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

/// Drop repeated keys, keeping first-seen order.
fn distinct<K: Clone + Eq + Hash>(keys: &[K]) -> Vec<K> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .filter(|key| seen.insert(*key))
        .cloned()
        .collect()
}
