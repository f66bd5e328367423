// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use futures::StreamExt;
use tick::PeriodicTimer;
use tokio::task::JoinHandle;

use crate::{DataCache, Fetcher};

/// Default period between two cleanup sweeps.
pub const DEFAULT_CLEANUP_PERIOD: Duration = Duration::from_secs(30 * 60);

/// Default age beyond which a sweep removes an entry.
pub const DEFAULT_CLEANUP_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Background task that periodically calls [`DataCache::cleanup`].
///
/// The sweep runs on the cache's clock. The task stops when the janitor is stopped or dropped.
///
/// # Examples
///
/// ```
/// use finboard_cache::{CacheJanitor, DataCache, HttpFetcher};
/// use tick::Clock;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), finboard_cache::FetchError> {
/// let cache = DataCache::builder(Clock::new_tokio()).build(HttpFetcher::new()?);
/// let janitor = CacheJanitor::start_default(&cache);
/// assert!(janitor.is_running());
/// janitor.stop();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CacheJanitor {
    task: JoinHandle<()>,
}

impl CacheJanitor {
    /// Sweeps every `period`, removing entries whose last success is older than `max_age`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    #[must_use = "the janitor stops when dropped"]
    pub fn start<F: Fetcher>(cache: &DataCache<F>, period: Duration, max_age: Duration) -> Self {
        let cache = cache.clone();
        let mut timer = PeriodicTimer::new(cache.clock(), period);

        let task = tokio::spawn(async move {
            while timer.next().await.is_some() {
                cache.cleanup(max_age);
            }
        });

        Self { task }
    }

    /// Sweeps every 30 minutes, removing entries older than one hour.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    #[must_use = "the janitor stops when dropped"]
    pub fn start_default<F: Fetcher>(cache: &DataCache<F>) -> Self {
        Self::start(cache, DEFAULT_CLEANUP_PERIOD, DEFAULT_CLEANUP_MAX_AGE)
    }

    /// Returns `true` until the janitor is stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the background sweep.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for CacheJanitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
