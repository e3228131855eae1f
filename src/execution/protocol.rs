//! Line-delimited JSON spoken between the process pool and its workers.
//!
//! The parent writes one [`WorkerRequest`] per line to a worker's stdin and
//! closes it; the worker answers each with one [`WorkerResponse`] line on
//! stdout, in any order, and exits at end of input.

use super::{TaskFailure, TaskOutcome};
use crate::error::Result;
use crate::lookup::WorkerJob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    /// Position of the key in the batch
    pub id: usize,
    pub job: WorkerJob,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub id: usize,
    pub outcome: TaskOutcome<Value>,
}

impl WorkerResponse {
    pub fn failed(id: usize, failure: TaskFailure) -> Self {
        Self {
            id,
            outcome: Err(failure),
        }
    }
}

/// Write one message as a single line and flush it.
pub fn write_message<W: Write, M: Serialize>(writer: &mut W, message: &M) -> Result<()> {
    serde_json::to_writer(&mut *writer, message)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read the next non-empty line, or `None` at end of input.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            return Ok(Some(line.trim_end().to_string()));
        }
    }
}
