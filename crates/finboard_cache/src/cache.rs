// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{fmt::Debug, sync::Arc, time::Duration};

use finboard_flight::FlightGroup;
use tick::{Clock, FutureExt, Stopwatch};

use crate::{
    CacheEntry, CacheKey, DataCacheBuilder, Error, Fetcher, FreshnessStore, GetOptions, Lookup, Result, Served,
    stats::{CacheStats, EntryStats},
    telemetry::{CacheActivity, CacheTelemetry},
};

/// A stale-while-revalidate cache in front of a [`Fetcher`].
///
/// Each [`get`](Self::get) decides, in order:
///
/// 1. No entry: fetch, store and return the fresh payload. A failure is returned as is.
/// 2. Fresh entry: return it without any network work.
/// 3. Stale entry, refetch admitted by the retry cooldown: fetch (or join the fetch already in
///    flight). On failure, fall back to the stale payload while it is younger than the max age.
/// 4. Stale entry within the cooldown, still within the max age: return it as stale.
/// 5. Otherwise: fail with an "expired" error.
///
/// At most one fetch per key is outstanding at any time, and only that fetch mutates the
/// entry, after it settles. Failed fetches never remove or overwrite cached data.
///
/// Cloning a `DataCache` is cheap and yields a handle to the same cache.
///
/// # Examples
///
/// ```
/// use finboard_cache::{CacheKey, DataCache, FetchError, Fetcher, GetOptions, Served};
/// use tick::Clock;
///
/// struct Constant;
///
/// impl Fetcher for Constant {
///     type Output = u32;
///
///     async fn fetch(&self, _key: &CacheKey) -> Result<u32, FetchError> {
///         Ok(42)
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), finboard_cache::Error> {
/// let cache = DataCache::builder(Clock::new_tokio()).name("quotes").build(Constant);
///
/// let first = cache.get("https://example.com/q", GetOptions::default()).await?;
/// assert_eq!(first.served(), Served::Fetched);
///
/// let second = cache.get("https://example.com/q", GetOptions::default()).await?;
/// assert_eq!(second.served(), Served::Fresh);
/// assert_eq!(*second.data(), 42);
/// # Ok(())
/// # }
/// ```
pub struct DataCache<F: Fetcher> {
    inner: Arc<DataCacheInner<F>>,
}

struct DataCacheInner<F: Fetcher> {
    name: &'static str,
    store: FreshnessStore<F::Output>,
    flights: FlightGroup<CacheKey, Result<F::Output>>,
    fetcher: F,
    fetch_timeout: Duration,
    telemetry: CacheTelemetry,
}

impl<F: Fetcher> Clone for DataCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Fetcher> Debug for DataCache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCache")
            .field("name", &self.inner.name)
            .field("entries", &self.inner.store.len())
            .field("in_flight", &self.inner.flights.len())
            .field("fetch_timeout", &self.inner.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl DataCache<crate::HttpFetcher> {
    /// Starts building a cache that reads time from `clock`.
    #[must_use]
    pub fn builder(clock: Clock) -> DataCacheBuilder {
        DataCacheBuilder::new(clock)
    }
}

impl<F: Fetcher> DataCache<F> {
    pub(crate) fn from_parts(
        name: &'static str,
        clock: Clock,
        fetcher: F,
        fetch_timeout: Duration,
        telemetry: CacheTelemetry,
    ) -> Self {
        Self {
            inner: Arc::new(DataCacheInner {
                name,
                store: FreshnessStore::new(clock),
                flights: FlightGroup::new(),
                fetcher,
                fetch_timeout,
                telemetry,
            }),
        }
    }

    /// Returns the payload for `url`, fetching it when the cached copy is not fresh enough.
    ///
    /// # Errors
    ///
    /// Returns an error when neither a fetch nor the cache can produce acceptable data:
    /// the fetch failed and there is no entry, or no entry younger than the max age
    /// ([`Error::is_fetch_failure`]), or the entry is older than the max age while the retry
    /// cooldown prevents a new attempt ([`Error::is_expired`]).
    pub async fn get(&self, url: impl Into<CacheKey>, options: GetOptions) -> Result<Lookup<F::Output>> {
        let key = url.into();
        let inner = &*self.inner;

        let Some(entry) = inner.store.get(&key) else {
            inner.record(CacheActivity::Miss, &key);
            return match self.fetch(&key, options.refresh_interval()).await {
                Ok(data) => Ok(Lookup::new(data, Served::Fetched)),
                Err(error) => Err(inner.surface(error)),
            };
        };

        let now = inner.store.now();
        let refresh_interval = entry.effective_interval(options.refresh_interval());

        if entry.is_fresh_at(now, refresh_interval) {
            inner.record(CacheActivity::FreshHit, &key);
            return Ok(Lookup::new(entry.into_data(), Served::Fresh));
        }

        if entry.should_attempt_refetch_at(now, refresh_interval) {
            return match self.fetch(&key, options.refresh_interval()).await {
                Ok(data) => Ok(Lookup::new(data, Served::Fetched)),
                Err(error) => inner.fall_back(entry, options.max_age(), error),
            };
        }

        if entry.is_valid_at(now, options.max_age()) {
            inner.record(CacheActivity::StaleHit, &key);
            return Ok(Lookup::new(entry.into_data(), Served::Stale));
        }

        inner.record(CacheActivity::Expired, &key);
        Err(Error::expired(key, entry.age_at(now)))
    }

    /// Deletes the entry for `url`, so the next [`get`](Self::get) fetches. Returns `true` if an
    /// entry existed.
    pub fn invalidate(&self, url: impl Into<CacheKey>) -> bool {
        let key = url.into();
        let removed = self.inner.store.remove(&key);
        if removed {
            self.inner.record(CacheActivity::Invalidated, &key);
        }
        removed
    }

    /// Deletes every entry whose last successful fetch is older than `max_age`, returning how
    /// many were removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let removed = self.inner.store.cleanup(max_age);
        self.inner
            .telemetry
            .record_cleanup(self.inner.name, removed, self.inner.store.len());
        removed
    }

    /// Diagnostics for every entry, sorted by URL.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entries = self.collect_stats(|_| true);
        CacheStats::new(entries)
    }

    /// Diagnostics for the entries whose URL starts with `prefix`, sorted by URL.
    #[must_use]
    pub fn stats_for(&self, prefix: &str) -> Vec<EntryStats> {
        self.collect_stats(|key| key.matches_prefix(prefix))
    }

    /// Lists the URLs with a cached entry.
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        self.inner.store.keys()
    }

    /// Returns a snapshot of the entry for `url` without any freshness decision.
    #[must_use]
    pub fn peek(&self, url: impl Into<CacheKey>) -> Option<CacheEntry<F::Output>> {
        self.inner.store.get(&url.into())
    }

    /// Returns `true` while a fetch for `url` is outstanding.
    #[must_use]
    pub fn is_fetching(&self, url: impl Into<CacheKey>) -> bool {
        self.inner.flights.in_flight(&url.into())
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    /// The name used in logs and metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// The clock the cache reads time from.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        self.inner.store.clock()
    }

    /// The fetcher behind the cache.
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    /// Joins the in-flight fetch for `key`, or starts one.
    async fn fetch(&self, key: &CacheKey, refresh_interval: Duration) -> Result<F::Output> {
        let inner = Arc::clone(&self.inner);
        let flight_key = key.clone();

        self.inner
            .flights
            .join(key.clone(), move || async move {
                inner.fetch_and_store(flight_key, refresh_interval).await
            })
            .await
            .unwrap_or_else(|_| Err(Error::leader_panicked(key.clone())))
    }

    fn collect_stats(&self, filter: impl Fn(&CacheKey) -> bool) -> Vec<EntryStats> {
        let now = self.inner.store.now();
        let mut entries = Vec::new();
        self.inner.store.for_each(|key, entry| {
            if filter(key) {
                entries.push(EntryStats::from_entry(key, entry, now));
            }
        });
        entries.sort_by(|a, b| a.url().cmp(b.url()));
        entries
    }
}

impl<F: Fetcher> DataCacheInner<F> {
    /// Runs inside the single flight: the only place the store is written after a fetch.
    async fn fetch_and_store(&self, key: CacheKey, refresh_interval: Duration) -> Result<F::Output> {
        let clock = self.store.clock();
        let stopwatch = Stopwatch::new(clock);

        let outcome = match self.fetcher.fetch(&key).timeout(clock, self.fetch_timeout).await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(error)) => Err(Error::fetch(key.clone(), error)),
            Err(_) => Err(Error::timeout(key.clone(), self.fetch_timeout)),
        };
        let elapsed = stopwatch.elapsed();

        match outcome {
            Ok(data) => {
                self.store.put(key.clone(), data.clone(), refresh_interval);
                self.telemetry
                    .record(self.name, CacheActivity::Refreshed, &key, Some(elapsed));
                Ok(data)
            }
            Err(error) => {
                self.store.record_failure(&key, error.to_string());
                self.telemetry.record_fetch_failure(self.name, &key, elapsed, &error);
                Err(error)
            }
        }
    }

    fn fall_back(&self, entry: CacheEntry<F::Output>, max_age: Duration, error: Error) -> Result<Lookup<F::Output>> {
        let now = self.store.now();
        if entry.is_valid_at(now, max_age) {
            self.record(CacheActivity::Fallback, error.url());
            Ok(Lookup::new(entry.into_data(), Served::Fallback))
        } else {
            Err(self.surface(error))
        }
    }

    fn surface(&self, error: Error) -> Error {
        self.record(CacheActivity::Error, error.url());
        error
    }

    fn record(&self, activity: CacheActivity, key: &CacheKey) {
        self.telemetry.record(self.name, activity, key, None);
    }
}
