//! Job lifecycle control: pause, resume and cancel.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Phase, Progress};

use super::job::JobState;

/// Requested phase change, decided under the phase lock
enum Transition {
    To(Phase),
    Unchanged,
    Rejected(Phase),
}

/// Control handle for one transfer job (cheap to clone)
///
/// Requests are cooperative: the fetches already in flight always finish,
/// and the dispatch loop acts on the request at the next sub-batch boundary.
#[derive(Clone)]
pub struct JobController {
    state: Arc<JobState>,
}

impl JobController {
    pub(crate) fn new(state: Arc<JobState>) -> Self {
        Self { state }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Current completed/total counters
    pub fn progress(&self) -> Progress {
        self.state.progress()
    }

    /// Pause a running job
    ///
    /// The sub-batch in flight finishes; no further sub-batch starts until
    /// [`resume`](Self::resume) or [`cancel`](Self::cancel). Pausing a job
    /// that is already paused is a no-op.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if the job is not running.
    pub fn pause(&self) -> Result<()> {
        self.transition("pause", |phase| match phase {
            Phase::Running => Transition::To(Phase::Paused),
            Phase::Paused => Transition::Unchanged,
            other => Transition::Rejected(other),
        })
    }

    /// Resume a paused job
    ///
    /// Releases the suspended dispatch loop. Resuming a running job is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if the job is neither paused nor running.
    pub fn resume(&self) -> Result<()> {
        self.transition("resume", |phase| match phase {
            Phase::Paused => Transition::To(Phase::Running),
            Phase::Running => Transition::Unchanged,
            other => Transition::Rejected(other),
        })
    }

    /// Cancel the job
    ///
    /// A paused job is released immediately, without needing a resume, and
    /// the job ends with [`TransferOutcome::Cancelled`](crate::TransferOutcome::Cancelled).
    /// Repeated cancels are no-ops.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if the job already completed.
    pub fn cancel(&self) -> Result<()> {
        self.transition("cancel", |phase| match phase {
            Phase::Idle | Phase::Running | Phase::Paused => Transition::To(Phase::Cancelling),
            Phase::Cancelling | Phase::Cancelled => Transition::Unchanged,
            Phase::Completed => Transition::Rejected(Phase::Completed),
        })
    }

    fn transition(&self, operation: &str, decide: impl FnOnce(Phase) -> Transition) -> Result<()> {
        let mut rejected = None;
        self.state
            .phase_tx
            .send_if_modified(|phase| match decide(*phase) {
                Transition::To(next) => {
                    *phase = next;
                    true
                }
                Transition::Unchanged => false,
                Transition::Rejected(current) => {
                    rejected = Some(current);
                    false
                }
            });

        match rejected {
            Some(current) => Err(Error::InvalidState {
                operation: operation.to_string(),
                current_state: current.to_string(),
            }),
            None => {
                tracing::debug!(operation, phase = %self.phase(), "Job control request applied");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for JobController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobController")
            .field("phase", &self.phase())
            .field("progress", &self.progress())
            .finish()
    }
}
