//! Per-job state and the sub-batch dispatch loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{broadcast, watch};

use crate::fetcher::Fetcher;
use crate::types::{Event, Phase, Progress, ResultMapping, TransferOutcome, TransferTask};

use super::batching::{fetch_sub_batch, sub_batch_count};
use super::control::JobController;
use super::observer::ProgressObserver;

/// Mutable record governing one job
///
/// The phase lives in a watch channel: control calls write it, and the
/// dispatch loop waits on it while paused. That channel is the single
/// suspension slot; only the loop ever waits on it.
pub(crate) struct JobState {
    pub(crate) phase_tx: watch::Sender<Phase>,
    total: usize,
    completed: AtomicUsize,
}

impl JobState {
    pub(crate) fn new(total: usize) -> Self {
        let (phase_tx, _rx) = watch::channel(Phase::Idle);
        Self {
            phase_tx,
            total,
            completed: AtomicUsize::new(0),
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        *self.phase_tx.borrow()
    }

    pub(crate) fn progress(&self) -> Progress {
        Progress {
            completed: self.completed.load(Ordering::Acquire),
            total: self.total,
        }
    }

    fn record_settled(&self) {
        let previous = self.completed.fetch_add(1, Ordering::AcqRel);
        debug_assert!(previous < self.total, "completed counter overran total");
    }

    /// Idle -> Running. Returns false if the job was cancelled before it began.
    ///
    /// Safe to call twice: a job already moved to Running (or paused since)
    /// is left as is.
    pub(crate) fn begin(&self) -> bool {
        self.phase_tx.send_if_modified(|phase| match phase {
            Phase::Idle => {
                *phase = Phase::Running;
                true
            }
            _ => false,
        });
        !matches!(self.phase(), Phase::Cancelling | Phase::Cancelled)
    }

    /// Move to the terminal phase; a pending cancel wins over completion.
    fn settle(&self) -> Phase {
        let mut terminal = Phase::Completed;
        self.phase_tx.send_modify(|phase| {
            terminal = match phase {
                Phase::Cancelling | Phase::Cancelled => Phase::Cancelled,
                _ => Phase::Completed,
            };
            *phase = terminal;
        });
        terminal
    }

    fn mark_cancelled(&self) {
        self.phase_tx.send_replace(Phase::Cancelled);
    }
}

/// Holds an engine's single job slot; releases it when dropped
pub(crate) struct JobSlot(Arc<AtomicBool>);

impl JobSlot {
    pub(crate) fn acquire(active: &Arc<AtomicBool>) -> Option<Self> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(active)))
    }
}

impl Drop for JobSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A prepared batch transfer
///
/// Created by [`TransferEngine::prepare`](super::TransferEngine::prepare).
/// Grab a [`JobController`] with [`controller`](Self::controller) before
/// awaiting [`run`](Self::run). Dropping an unrun job frees the engine.
pub struct TransferJob {
    pub(crate) tasks: Vec<TransferTask>,
    pub(crate) batch_size: usize,
    pub(crate) state: Arc<JobState>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) slot: JobSlot,
}

/// What to do at a sub-batch boundary
enum Checkpoint {
    Continue,
    Stop,
}

impl TransferJob {
    /// Control handle for this job
    pub fn controller(&self) -> JobController {
        JobController::new(Arc::clone(&self.state))
    }

    /// Number of tasks in the batch
    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    /// Run the job to completion or cancellation
    ///
    /// Sub-batches are dispatched in input order. `observer` hears about
    /// every settled sub-batch and every pause.
    pub async fn run<O: ProgressObserver>(self, mut observer: O) -> TransferOutcome {
        let TransferJob {
            tasks,
            batch_size,
            state,
            fetcher,
            event_tx,
            slot,
        } = self;
        let total = tasks.len();
        let mut phase_rx = state.phase_tx.subscribe();

        // Nothing to fetch: go straight to Completed without a progress callback
        if tasks.is_empty() && state.settle() == Phase::Completed {
            tracing::debug!("Empty batch, nothing to transfer");
            event_tx
                .send(Event::Completed {
                    succeeded: 0,
                    total: 0,
                })
                .ok();
            drop(slot);
            return TransferOutcome::Completed(ResultMapping::new());
        }

        if !state.begin() {
            tracing::info!(total, "Transfer cancelled before start");
            state.mark_cancelled();
            event_tx.send(Event::Cancelled { completed: 0, total }).ok();
            drop(slot);
            return TransferOutcome::Cancelled;
        }

        tracing::info!(
            total,
            batch_size,
            sub_batches = sub_batch_count(total, batch_size),
            fetcher = fetcher.name(),
            "Starting batch transfer"
        );
        event_tx.send(Event::Started { total, batch_size }).ok();

        let mut results = ResultMapping::with_capacity(total);
        for (index, sub_batch) in tasks.chunks(batch_size).enumerate() {
            let checkpoint =
                wait_at_boundary(&state, &mut phase_rx, &mut observer, &event_tx).await;
            if let Checkpoint::Stop = checkpoint {
                break;
            }

            tracing::debug!(sub_batch = index, size = sub_batch.len(), "Dispatching sub-batch");
            for settled in fetch_sub_batch(fetcher.as_ref(), sub_batch).await {
                state.record_settled();
                if let Ok(bytes) = settled.result {
                    results.insert(settled.task.name.clone(), bytes);
                }
            }

            let progress = state.progress();
            observer.on_progress(progress.completed, progress.total);
            event_tx
                .send(Event::Progress {
                    completed: progress.completed,
                    total: progress.total,
                    percent: progress.percent(),
                })
                .ok();
        }

        let progress = state.progress();
        let outcome = match state.settle() {
            Phase::Cancelled => {
                tracing::info!(
                    completed = progress.completed,
                    total,
                    "Transfer cancelled, discarding partial results"
                );
                event_tx
                    .send(Event::Cancelled {
                        completed: progress.completed,
                        total,
                    })
                    .ok();
                TransferOutcome::Cancelled
            }
            _ => {
                tracing::info!(
                    succeeded = results.len(),
                    missing = total - results.len().min(total),
                    total,
                    "Transfer complete"
                );
                event_tx
                    .send(Event::Completed {
                        succeeded: results.len(),
                        total,
                    })
                    .ok();
                TransferOutcome::Completed(results)
            }
        };
        drop(slot);
        outcome
    }
}

/// Honor pause and cancel requests before the next sub-batch starts.
async fn wait_at_boundary<O: ProgressObserver>(
    state: &JobState,
    phase_rx: &mut watch::Receiver<Phase>,
    observer: &mut O,
    event_tx: &broadcast::Sender<Event>,
) -> Checkpoint {
    loop {
        let phase = *phase_rx.borrow_and_update();
        match phase {
            Phase::Paused => {
                let progress = state.progress();
                tracing::info!(
                    completed = progress.completed,
                    total = progress.total,
                    "Transfer paused"
                );
                observer.on_paused(progress.completed, progress.total);
                event_tx
                    .send(Event::Paused {
                        completed: progress.completed,
                        total: progress.total,
                    })
                    .ok();

                let next = match phase_rx.wait_for(|p| *p != Phase::Paused).await {
                    Ok(next) => *next,
                    // Sender lives in `state`, which outlives this wait
                    Err(_) => return Checkpoint::Stop,
                };
                if next == Phase::Running {
                    tracing::info!("Transfer resumed");
                    event_tx.send(Event::Resumed).ok();
                }
                // Re-check: a cancel may have followed the resume
            }
            Phase::Cancelling | Phase::Cancelled => return Checkpoint::Stop,
            Phase::Idle | Phase::Running | Phase::Completed => return Checkpoint::Continue,
        }
    }
}
