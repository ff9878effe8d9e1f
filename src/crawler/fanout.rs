//! Bounded-concurrency fan-out over independent items
//!
//! Every item runs through the same worker with at most `concurrency`
//! workers in flight. The limit is held by the executor, not the call, so
//! stages run concurrently on one executor share it. A failing item is logged with its key and dropped
//! from the results; siblings are unaffected and the call always runs to
//! completion. Results come back in completion order, not input order.

use crate::records::ItemKey;
use crate::{ExtractError, HarvestError};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default fan-out width
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Outcome of one fan-out stage
#[derive(Debug)]
pub struct FanOutReport<R> {
    pub results: Vec<R>,
    /// One `HarvestError::ItemExtraction` per failed item
    pub failures: Vec<HarvestError>,
}

/// Clones share the same worker permits
#[derive(Debug, Clone)]
pub struct FanOutExecutor {
    concurrency: usize,
    permits: Arc<Semaphore>,
}

impl Default for FanOutExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl FanOutExecutor {
    /// Creates an executor; a width of 0 is treated as 1
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            concurrency,
            permits: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs `worker` over every item and waits for all of them
    pub async fn run<T, R, F, Fut>(
        &self,
        stage: &'static str,
        items: Vec<T>,
        worker: F,
    ) -> FanOutReport<R>
    where
        T: ItemKey,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, ExtractError>>,
    {
        let total = items.len();
        tracing::debug!(
            "Starting {} stage: {} items, {} workers",
            stage,
            total,
            self.concurrency
        );

        let outcomes: Vec<(String, Result<R, ExtractError>)> =
            stream::iter(items.into_iter().map(|item| {
                let key = item.item_key();
                let work = worker(item);
                let permits = Arc::clone(&self.permits);
                async move {
                    // The semaphore is never closed
                    let _permit = permits.acquire().await.ok();
                    (key, work.await)
                }
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (key, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(source) => {
                    let failure = HarvestError::ItemExtraction { stage, key, source };
                    tracing::warn!("{}", failure);
                    failures.push(failure);
                }
            }
        }

        tracing::info!(
            "{} stage finished: {} succeeded, {} failed",
            stage,
            results.len(),
            failures.len()
        );

        FanOutReport { results, failures }
    }
}
