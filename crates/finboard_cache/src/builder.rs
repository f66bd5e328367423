// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use tick::Clock;

use crate::{CacheTelemetry, DataCache, Fetcher};

/// Name used in logs and metrics when none is configured.
pub const DEFAULT_CACHE_NAME: &str = "finboard";

/// Default client-side timeout applied to every fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`DataCache`], created by [`DataCache::builder`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use finboard_cache::{CacheTelemetry, DataCache, HttpFetcher};
/// use tick::Clock;
///
/// # fn main() -> Result<(), finboard_cache::FetchError> {
/// let cache = DataCache::builder(Clock::new_frozen())
///     .name("quotes")
///     .fetch_timeout(Duration::from_secs(5))
///     .telemetry(CacheTelemetry::new(false))
///     .build(HttpFetcher::new()?);
///
/// assert_eq!(cache.name(), "quotes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use]
pub struct DataCacheBuilder {
    clock: Clock,
    name: &'static str,
    fetch_timeout: Duration,
    telemetry: CacheTelemetry,
}

impl DataCacheBuilder {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            clock,
            name: DEFAULT_CACHE_NAME,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            telemetry: CacheTelemetry::default(),
        }
    }

    /// Sets the name used in logs and metrics.
    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Sets the client-side timeout applied to every fetch, measured on the cache's clock.
    ///
    /// An elapsed timeout is an ordinary fetch failure and may trigger the stale fallback.
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Replaces the default telemetry, which logs through `tracing` and records no metrics.
    pub fn telemetry(mut self, telemetry: CacheTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Builds the cache in front of `fetcher`.
    pub fn build<F: Fetcher>(self, fetcher: F) -> DataCache<F> {
        DataCache::from_parts(self.name, self.clock, fetcher, self.fetch_timeout, self.telemetry)
    }
}
