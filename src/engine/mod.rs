//! Batch transfer engine split into focused submodules.
//!
//! - [`job`] - Per-job state and the sub-batch dispatch loop
//! - [`control`] - Pause/resume/cancel handle
//! - [`batching`] - Sub-batch partitioning and the settle-all join
//! - [`observer`] - Progress callbacks

mod batching;
mod control;
mod job;
mod observer;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use control::JobController;
pub use job::TransferJob;
pub use observer::{CallbackObserver, NullObserver, ProgressObserver};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{Config, validate_batch_size};
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::types::{Event, Phase, Progress, TransferOutcome, TransferTask};

use job::{JobSlot, JobState};

/// Batch transfer engine (cloneable - all fields are Arc-wrapped)
///
/// Runs at most one job at a time; clones share that limit.
#[derive(Clone)]
pub struct TransferEngine {
    /// Transport used for every fetch
    fetcher: Arc<dyn Fetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    config: Arc<Config>,
    /// Set while a job holds the engine
    active: Arc<AtomicBool>,
}

impl TransferEngine {
    /// Create an engine that fetches over HTTP
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings, or a network error if
    /// the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config.transfer)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Create an engine around a custom [`Fetcher`]
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;
        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.transfer.event_buffer);
        Ok(Self {
            fetcher,
            event_tx,
            config: Arc::new(config),
            active: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Subscribe to job events
    ///
    /// Each subscriber receives every event independently. A subscriber that
    /// falls behind by more than `event_buffer` events gets
    /// `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a job currently holds this engine
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Validate a batch and reserve the engine for it
    ///
    /// The returned job has not started yet; take its
    /// [`controller`](TransferJob::controller) and then await
    /// [`run`](TransferJob::run).
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `batch_size` is zero
    /// - [`Error::JobActive`] if another job holds the engine
    pub fn prepare(&self, tasks: Vec<TransferTask>, batch_size: usize) -> Result<TransferJob> {
        validate_batch_size(batch_size)?;
        let slot = JobSlot::acquire(&self.active).ok_or(Error::JobActive)?;

        Ok(TransferJob {
            state: Arc::new(JobState::new(tasks.len())),
            tasks,
            batch_size,
            fetcher: Arc::clone(&self.fetcher),
            event_tx: self.event_tx.clone(),
            slot,
        })
    }

    /// Start a job on the tokio runtime
    ///
    /// The job is already running when this returns, so the controller
    /// accepts pause and cancel right away. A pause issued before the first
    /// sub-batch holds the job before any fetch.
    ///
    /// # Errors
    ///
    /// Same as [`prepare`](Self::prepare).
    pub fn start<O>(
        &self,
        tasks: Vec<TransferTask>,
        batch_size: usize,
        observer: O,
    ) -> Result<RunningJob>
    where
        O: ProgressObserver + 'static,
    {
        let job = self.prepare(tasks, batch_size)?;
        // Running before the task is scheduled, so an immediate pause sticks
        job.state.begin();
        let controller = job.controller();
        let handle = tokio::spawn(job.run(observer));
        Ok(RunningJob { controller, handle })
    }
}

/// A job spawned by [`TransferEngine::start`]
pub struct RunningJob {
    controller: JobController,
    handle: tokio::task::JoinHandle<TransferOutcome>,
}

impl RunningJob {
    /// Control handle for the job
    pub fn controller(&self) -> JobController {
        self.controller.clone()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Current completed/total counters
    pub fn progress(&self) -> Progress {
        self.controller.progress()
    }

    /// Wait for the job to finish
    ///
    /// # Errors
    ///
    /// [`Error::Other`] if the job task panicked or was aborted.
    pub async fn wait(self) -> Result<TransferOutcome> {
        self.handle
            .await
            .map_err(|e| Error::Other(format!("transfer task failed: {e}")))
    }
}
