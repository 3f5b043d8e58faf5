//! Progress callbacks invoked at sub-batch boundaries.

/// Receives progress notifications from a running job
///
/// Both hooks run on the job's own task, between sub-batches. They may call
/// back into a [`JobController`](super::JobController) (for example to
/// cancel after the first sub-batch); the request takes effect at the next
/// boundary.
pub trait ProgressObserver: Send {
    /// A sub-batch settled; `completed` tasks of `total` are done
    fn on_progress(&mut self, _completed: usize, _total: usize) {}

    /// The job is about to suspend until resumed or cancelled
    fn on_paused(&mut self, _completed: usize, _total: usize) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Observer built from a pair of closures
pub struct CallbackObserver<P, Q> {
    on_progress: P,
    on_paused: Q,
}

impl<P, Q> CallbackObserver<P, Q>
where
    P: FnMut(usize, usize) + Send,
    Q: FnMut(usize, usize) + Send,
{
    /// Wrap the two callbacks
    pub fn new(on_progress: P, on_paused: Q) -> Self {
        Self {
            on_progress,
            on_paused,
        }
    }
}

impl<P, Q> ProgressObserver for CallbackObserver<P, Q>
where
    P: FnMut(usize, usize) + Send,
    Q: FnMut(usize, usize) + Send,
{
    fn on_progress(&mut self, completed: usize, total: usize) {
        (self.on_progress)(completed, total);
    }

    fn on_paused(&mut self, completed: usize, total: usize) {
        (self.on_paused)(completed, total);
    }
}

impl<O: ProgressObserver + ?Sized> ProgressObserver for Box<O> {
    fn on_progress(&mut self, completed: usize, total: usize) {
        (**self).on_progress(completed, total);
    }

    fn on_paused(&mut self, completed: usize, total: usize) {
        (**self).on_paused(completed, total);
    }
}
