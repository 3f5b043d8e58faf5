//! Core types for iconpack-dl

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Successfully fetched payloads, keyed by task name
///
/// Only key membership is meaningful; insertion order is not.
pub type ResultMapping = HashMap<String, Vec<u8>>;

/// One named resource to retrieve
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferTask {
    /// Identifier used as the key in the result mapping
    pub name: String,
    /// URL to fetch
    pub url: String,
}

impl TransferTask {
    /// Create a new task
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Lifecycle phase of a transfer job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Prepared but not yet running
    Idle,
    /// Dispatching sub-batches
    Running,
    /// Suspended at a sub-batch boundary until resumed or cancelled
    Paused,
    /// Cancel requested; stops at the next sub-batch boundary
    Cancelling,
    /// All sub-batches finished
    Completed,
    /// Stopped early on request
    Cancelled,
}

impl Phase {
    /// Whether the job has finished (successfully or not)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Cancelled)
    }

    /// Lowercase name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Cancelling => "cancelling",
            Phase::Completed => "completed",
            Phase::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a job's counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Tasks settled so far, successful or not
    pub completed: usize,
    /// Tasks in the batch
    pub total: usize,
}

impl Progress {
    /// Whole-number percentage, rounded down
    ///
    /// An empty batch counts as fully done.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let completed = self.completed.min(self.total) as u128;
        ((completed * 100) / self.total as u128) as u8
    }
}

/// How a job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Every sub-batch ran; the mapping may be smaller than the batch when
    /// some fetches failed
    Completed(ResultMapping),
    /// Stopped on request; partial results are discarded
    Cancelled,
}

impl TransferOutcome {
    /// Whether the job was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransferOutcome::Cancelled)
    }

    /// The result mapping, if the job completed
    pub fn into_mapping(self) -> Option<ResultMapping> {
        match self {
            TransferOutcome::Completed(mapping) => Some(mapping),
            TransferOutcome::Cancelled => None,
        }
    }
}

/// Event emitted during a transfer job
///
/// Events fire at the same sub-batch boundaries as the observer callbacks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job began dispatching
    Started {
        /// Tasks in the batch
        total: usize,
        /// Sub-batch size in use
        batch_size: usize,
    },

    /// A sub-batch settled
    Progress {
        /// Tasks settled so far
        completed: usize,
        /// Tasks in the batch
        total: usize,
        /// Whole-number percentage
        percent: u8,
    },

    /// Job suspended at a sub-batch boundary
    Paused {
        /// Tasks settled so far
        completed: usize,
        /// Tasks in the batch
        total: usize,
    },

    /// Job left the paused state and continues dispatching
    Resumed,

    /// Job finished every sub-batch
    Completed {
        /// Tasks that produced a payload
        succeeded: usize,
        /// Tasks in the batch
        total: usize,
    },

    /// Job stopped on request
    Cancelled {
        /// Tasks settled before stopping
        completed: usize,
        /// Tasks in the batch
        total: usize,
    },
}

/// Summary of which tasks made it into a result mapping
///
/// Counted by distinct task name, the same way the mapping is keyed: a name
/// submitted twice is one entry, and it succeeded if any of its fetches did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReport {
    /// Distinct names submitted
    pub total: usize,
    /// Distinct names with a payload in the mapping
    pub succeeded: usize,
    /// Names with no payload, in submission order
    pub missing: Vec<String>,
}

impl TransferReport {
    /// Compare a submitted batch against the mapping it produced
    pub fn new(tasks: &[TransferTask], mapping: &ResultMapping) -> Self {
        let mut seen = HashSet::new();
        let mut succeeded = 0;
        let mut missing = Vec::new();
        for task in tasks {
            if !seen.insert(task.name.as_str()) {
                continue;
            }
            if mapping.contains_key(&task.name) {
                succeeded += 1;
            } else {
                missing.push(task.name.clone());
            }
        }
        Self {
            total: seen.len(),
            succeeded,
            missing,
        }
    }

    /// Whether every task produced a payload
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl std::fmt::Display for TransferReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} succeeded", self.succeeded, self.total)
    }
}

/// Tasks whose names are absent from `mapping`
///
/// The engine never retries; a caller that wants another attempt submits
/// these as a new job.
pub fn missing_tasks(tasks: &[TransferTask], mapping: &ResultMapping) -> Vec<TransferTask> {
    tasks
        .iter()
        .filter(|t| !mapping.contains_key(&t.name))
        .cloned()
        .collect()
}
