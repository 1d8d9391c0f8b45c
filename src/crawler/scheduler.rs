//! Bounded worker pool for article fetches
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Spawning one task per job on a `JoinSet`
//! - A single join barrier that returns results in submission order
//!
//! Nothing is streamed out of the pool: callers see results only after every
//! job has finished or failed.

use crate::ScribeError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Worker pool with a fixed number of permits
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool allowing `size` jobs in flight (at least one)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Returns the number of jobs that may run at once
    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `task` for every item and waits for all of them
    ///
    /// Futures are created eagerly but only polled once a permit is held,
    /// so at most `size` of them make progress at a time.
    ///
    /// # Arguments
    ///
    /// * `items` - Jobs, in discovery order
    /// * `task` - Builds the future for one job
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<T>)` - One output per item, in the order of `items`
    /// * `Err(ScribeError::Worker)` - A task panicked
    pub async fn run<I, F, Fut, T>(&self, items: I, task: F) -> Result<Vec<T>, ScribeError>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut set = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let job = task(item);
            set.spawn(async move {
                // The semaphore is never closed, so acquisition cannot fail
                let _permit = semaphore.acquire_owned().await.ok();
                (index, job.await)
            });
        }

        let mut outputs = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(output) => outputs.push(output),
                Err(e) => return Err(ScribeError::Worker(e.to_string())),
            }
        }

        outputs.sort_by_key(|(index, _)| *index);
        Ok(outputs.into_iter().map(|(_, output)| output).collect())
    }
}
