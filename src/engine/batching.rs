//! Sub-batch partitioning and the settle-all fetch join.

use futures::future::join_all;

use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::types::TransferTask;

/// Number of sub-batches a batch of `task_count` splits into
pub(crate) fn sub_batch_count(task_count: usize, batch_size: usize) -> usize {
    task_count.div_ceil(batch_size.max(1))
}

/// Outcome of one task in a settled sub-batch
pub(crate) struct SettledFetch<'a> {
    pub(crate) task: &'a TransferTask,
    pub(crate) result: Result<Vec<u8>>,
}

/// Fetch every task in `sub_batch` concurrently and wait for all of them.
///
/// A failed fetch never short-circuits the others; each one captures its
/// own result. Output order follows `sub_batch`.
pub(crate) async fn fetch_sub_batch<'a>(
    fetcher: &dyn Fetcher,
    sub_batch: &'a [TransferTask],
) -> Vec<SettledFetch<'a>> {
    join_all(sub_batch.iter().map(|task| async move {
        let result = fetcher.fetch(&task.url).await;
        if let Err(e) = &result {
            tracing::debug!(
                name = %task.name,
                url = %task.url,
                error = %e,
                "Fetch failed, omitting from results"
            );
        }
        SettledFetch { task, result }
    }))
    .await
}
