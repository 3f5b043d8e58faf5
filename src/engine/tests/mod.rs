use super::test_helpers::*;
use super::*;
use crate::types::ResultMapping;
use std::sync::Mutex;


/// Collects every observer callback for later assertions
#[derive(Clone, Default)]
struct Recorded {
    progress: Arc<Mutex<Vec<(usize, usize)>>>,
    paused: Arc<Mutex<Vec<(usize, usize)>>>,
}

impl Recorded {
    fn observer(&self) -> Box<dyn ProgressObserver> {
        let progress = Arc::clone(&self.progress);
        let paused = Arc::clone(&self.paused);
        Box::new(CallbackObserver::new(
            move |completed, total| progress.lock().unwrap().push((completed, total)),
            move |completed, total| paused.lock().unwrap().push((completed, total)),
        ))
    }

    fn progress(&self) -> Vec<(usize, usize)> {
        self.progress.lock().unwrap().clone()
    }

    fn paused(&self) -> Vec<(usize, usize)> {
        self.paused.lock().unwrap().clone()
    }
}

/// Drain every event already sent on `rx`
fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn expect_completed(outcome: TransferOutcome) -> ResultMapping {
    match outcome {
        TransferOutcome::Completed(mapping) => mapping,
        TransferOutcome::Cancelled => panic!("expected completed outcome, got cancelled"),
    }
}
