use super::protocol::{read_line, write_message, WorkerRequest, WorkerResponse};
use super::TaskFailure;
use crate::error::Result;
use crate::lookup::LookupClient;
use std::io::{BufRead, Write};

/// Answer requests from `input` until it closes. Returns how many were served.
///
/// A request that fails produces a failure response; a line that cannot be
/// parsed at all is skipped, and the parent reports its key as missing.
pub fn serve<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    client: &dyn LookupClient,
) -> Result<usize> {
    let mut served = 0;

    while let Some(line) = read_line(&mut input)? {
        let request: WorkerRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Skipping malformed worker request: {}", e);
                continue;
            }
        };

        let outcome = request.job.execute(client).map_err(TaskFailure::from);
        if let Err(failure) = &outcome {
            tracing::debug!("Request {} failed: {}", request.id, failure);
        }

        write_message(
            &mut output,
            &WorkerResponse {
                id: request.id,
                outcome,
            },
        )?;
        served += 1;
    }

    tracing::debug!("Worker {} served {} requests", std::process::id(), served);
    Ok(served)
}
