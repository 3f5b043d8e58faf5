//! Shared test helpers: an in-memory fetcher and task builders.

use crate::config::Config;
use crate::engine::TransferEngine;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::types::TransferTask;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fetcher that answers from memory
///
/// Every URL succeeds with its own bytes as the payload, except the ones
/// registered with [`failing`](Self::failing). Calls are recorded in order
/// of dispatch, and the peak number of overlapping fetches is tracked.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(urls.into_iter().map(Into::into));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: 404,
            });
        }
        Ok(url.as_bytes().to_vec())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// `count` tasks named `icon_1.jpg`, `icon_2.jpg`, ... (1-based)
pub(crate) fn numbered_tasks(count: usize) -> Vec<TransferTask> {
    (1..=count)
        .map(|i| TransferTask::new(format!("icon_{i}.jpg"), task_url(i)))
        .collect()
}

/// URL of the `index`-th (1-based) task from [`numbered_tasks`]
pub(crate) fn task_url(index: usize) -> String {
    format!("https://cdn.test/apps/440/icon_{index}.jpg")
}

/// Engine over `fetcher` with default configuration
pub(crate) fn create_test_engine(fetcher: Arc<ScriptedFetcher>) -> TransferEngine {
    TransferEngine::with_fetcher(Config::default(), fetcher).unwrap()
}
