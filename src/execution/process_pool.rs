use super::protocol::{read_line, write_message, WorkerRequest, WorkerResponse};
use super::{BatchResults, BatchTask, TaskFailure};
use crate::error::{Result, WeatherError};
use crate::utils::constants::WORKER_SUBCOMMAND;
use crossbeam::channel::{self, Sender};
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

/// How to start one worker process.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Re-run the current executable as a worker.
    pub fn current_exe() -> Result<Self> {
        let program = std::env::current_exe()?;
        Ok(Self::new(program).arg(WORKER_SUBCOMMAND))
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| WeatherError::WorkerSpawn(format!("{}: {}", self.program.display(), e)))
    }
}

/// Spread the batch over up to `pool_size` worker processes.
///
/// Each worker gets its share of requests on stdin. One reader thread per
/// worker forwards responses into a shared channel, which is drained only
/// after every worker has exited and every reader has been joined.
pub fn run<T: BatchTask>(
    keys: &[T::Key],
    task: &T,
    worker: &WorkerCommand,
    pool_size: usize,
) -> Result<BatchResults<T::Key, T::Output>> {
    let mut results = HashMap::with_capacity(keys.len());

    let mut requests = Vec::with_capacity(keys.len());
    for (id, key) in keys.iter().enumerate() {
        match task.job(key) {
            Ok(job) => requests.push(WorkerRequest { id, job }),
            Err(e) => {
                tracing::warn!("Cannot hand {} to a worker: {}", key, e);
                results.insert(key.clone(), Err(TaskFailure::from(e)));
            }
        }
    }
    if requests.is_empty() {
        return Ok(results);
    }

    let pool_size = pool_size.clamp(1, requests.len());
    let mut children = start_pool(pool_size, || worker.spawn())?;

    let mut shards: Vec<Vec<WorkerRequest>> = (0..children.len()).map(|_| Vec::new()).collect();
    for (index, request) in requests.into_iter().enumerate() {
        shards[index % children.len()].push(request);
    }

    let (sender, receiver) = channel::unbounded::<WorkerResponse>();

    let joined = crossbeam::scope(|scope| {
        for (index, child) in children.iter_mut().enumerate() {
            if let Some(stdout) = child.stdout.take() {
                let sender = sender.clone();
                scope.spawn(move |_| forward_responses(index, stdout, &sender));
            }
        }

        for (index, (child, shard)) in children.iter_mut().zip(&shards).enumerate() {
            if let Some(stdin) = child.stdin.take() {
                scope.spawn(move |_| feed_requests(index, stdin, shard));
            }
        }

        for (index, child) in children.iter_mut().enumerate() {
            match child.wait() {
                Ok(status) if !status.success() => {
                    tracing::warn!("Worker {} exited with {}", index, status)
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Could not wait for worker {}: {}", index, e),
            }
        }
    });
    if joined.is_err() {
        tracing::warn!("A worker reader thread panicked");
    }

    drop(sender);
    for response in receiver.iter() {
        let Some(key) = keys.get(response.id) else {
            tracing::warn!("Worker answered unknown request {}", response.id);
            continue;
        };

        let outcome = response.outcome.and_then(|value| {
            serde_json::from_value::<T::Output>(value)
                .map_err(|e| TaskFailure::new(format!("undecodable worker result: {}", e)))
        });
        if let Err(failure) = &outcome {
            tracing::warn!("Task for {} failed: {}", key, failure);
        }
        results.entry(key.clone()).or_insert(outcome);
    }

    Ok(results)
}

/// Start up to `pool_size` workers. Only failing to start any worker is an
/// error; the batch is spread over whichever workers did start.
fn start_pool(pool_size: usize, mut spawn: impl FnMut() -> Result<Child>) -> Result<Vec<Child>> {
    let mut children = Vec::with_capacity(pool_size);
    for _ in 0..pool_size {
        match spawn() {
            Ok(child) => children.push(child),
            Err(e) if children.is_empty() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Continuing with {} of {} workers: {}",
                    children.len(),
                    pool_size,
                    e
                );
                break;
            }
        }
    }
    tracing::debug!("Started {} worker processes", children.len());
    Ok(children)
}

/// Write a worker's share of requests, then close its stdin.
fn feed_requests(index: usize, mut stdin: ChildStdin, shard: &[WorkerRequest]) {
    for request in shard {
        if let Err(e) = write_message(&mut stdin, request) {
            tracing::warn!("Worker {} stopped accepting requests: {}", index, e);
            break;
        }
    }
}

fn forward_responses<R: Read>(index: usize, stdout: R, sender: &Sender<WorkerResponse>) {
    let mut reader = BufReader::new(stdout);
    loop {
        match read_line(&mut reader) {
            Ok(Some(line)) => match serde_json::from_str::<WorkerResponse>(&line) {
                Ok(response) => {
                    if sender.send(response).is_err() {
                        return;
                    }
                }
                Err(e) => tracing::warn!("Worker {} sent an unreadable line: {}", index, e),
            },
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Lost output from worker {}: {}", index, e);
                return;
            }
        }
    }
}
