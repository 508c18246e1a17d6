//! Bounded worker pool for probe batches.
//!
//! # Responsibilities
//! - Fan descriptors out across at most `concurrency_limit` workers
//! - Stream completions to the progress hook in completion order
//! - Guarantee exactly one outcome per descriptor, whatever fails
//! - Enforce the optional global batch timeout

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::probe::runner::Prober;
use crate::probe::types::{EndpointDescriptor, ErrorKind, ProbeOutcome, ProbeSettings};
use crate::report::{aggregate, BatchReport};

/// Upper bound on the configurable concurrency limit.
pub const MAX_CONCURRENCY: usize = 10;

/// Hook invoked once per completed probe with `(completed, total)`.
/// Purely observational; the batch runs identically without it.
pub type ProgressHook = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Options for one probe batch.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum number of probes in flight at once.
    pub concurrency_limit: usize,
    /// Cap on total wall-clock time for the whole batch.
    pub batch_timeout: Option<Duration>,
    pub probe: ProbeSettings,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: 5,
            batch_timeout: None,
            probe: ProbeSettings::default(),
        }
    }
}

/// Contract violations reported before any probing begins. A batch that
/// starts always produces a complete report.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no endpoints to probe")]
    EmptyBatch,
    #[error("duplicate endpoint name: {0}")]
    DuplicateName(String),
    #[error("concurrency limit must be between 1 and {MAX_CONCURRENCY}, got {0}")]
    InvalidConcurrency(usize),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Probe every descriptor and return the report in input order.
pub async fn run_batch(
    descriptors: Vec<EndpointDescriptor>,
    options: RunOptions,
    progress: Option<ProgressHook>,
) -> Result<BatchReport, BatchError> {
    validate(&descriptors, &options)?;

    let started_at = SystemTime::now();
    let total = descriptors.len();
    let prober = Arc::new(Prober::new(options.probe.clone())?);
    let semaphore = Arc::new(Semaphore::new(options.concurrency_limit));
    let (tx, mut rx) = mpsc::unbounded_channel::<(usize, ProbeOutcome)>();

    tracing::debug!(
        total,
        concurrency = options.concurrency_limit,
        batch_timeout = ?options.batch_timeout,
        "Starting probe batch"
    );

    let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(total);
    for (index, descriptor) in descriptors.iter().cloned().enumerate() {
        let prober = prober.clone();
        let semaphore = semaphore.clone();
        let tx = tx.clone();
        handles.push(tokio::spawn(async move {
            // The semaphore is closed when the batch deadline fires; queued
            // work bails out and the collector synthesizes its outcome.
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let name = descriptor.name.clone();
            // Nested spawn isolates a panicking probe to its own descriptor.
            let outcome =
                match tokio::spawn(async move { prober.probe(&descriptor).await }).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        tracing::error!(name = %name, error = %err, "Probe task failed");
                        ProbeOutcome::failed(name, ErrorKind::Internal, err.to_string())
                    }
                };
            let _ = tx.send((index, outcome));
        }));
    }
    drop(tx);

    let deadline = options.batch_timeout.map(|t| Instant::now() + t);
    let mut collected: Vec<(usize, ProbeOutcome)> = Vec::with_capacity(total);
    let mut batch_timed_out = false;

    while collected.len() < total {
        let received = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(message) => message,
                Err(_) => {
                    batch_timed_out = true;
                    break;
                }
            },
            None => rx.recv().await,
        };
        let Some((index, outcome)) = received else {
            break;
        };
        collected.push((index, outcome));
        if let Some(hook) = &progress {
            hook(collected.len(), total);
        }
    }

    if collected.len() < total {
        // Abandon in-flight probes; completed results are preserved.
        semaphore.close();
        for handle in &handles {
            handle.abort();
        }
        tracing::warn!(
            completed = collected.len(),
            total,
            "Batch ended early, abandoning remaining probes"
        );
    }

    let done: HashSet<usize> = collected.iter().map(|(index, _)| *index).collect();
    for (index, descriptor) in descriptors.iter().enumerate() {
        if done.contains(&index) {
            continue;
        }
        let kind = if batch_timed_out {
            ErrorKind::BatchTimeout
        } else {
            ErrorKind::Internal
        };
        collected.push((
            index,
            ProbeOutcome::failed(
                descriptor.name.clone(),
                kind,
                format!("probe did not complete ({kind})"),
            ),
        ));
    }

    Ok(aggregate(descriptors, collected, started_at))
}

fn validate(descriptors: &[EndpointDescriptor], options: &RunOptions) -> Result<(), BatchError> {
    if descriptors.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    let mut seen = HashSet::new();
    for descriptor in descriptors {
        if !seen.insert(descriptor.name.as_str()) {
            return Err(BatchError::DuplicateName(descriptor.name.clone()));
        }
    }
    if options.concurrency_limit == 0 || options.concurrency_limit > MAX_CONCURRENCY {
        return Err(BatchError::InvalidConcurrency(options.concurrency_limit));
    }
    Ok(())
}
