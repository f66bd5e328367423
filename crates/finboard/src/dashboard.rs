// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use finboard_cache::{
    CacheJanitor, CacheKey, CacheStats, DataCache, EntryStats, FetchError, Fetcher, GetOptions,
    HttpFetcher, Result,
};
use serde_json::Value;
use tick::Clock;

use crate::{DashboardConfig, WidgetData};

/// Multiplier from a widget's refresh interval to the max age it tolerates.
pub const WIDGET_MAX_AGE_FACTOR: u32 = 60;

/// Cache name used for the dashboard's shared cache.
pub const DASHBOARD_CACHE_NAME: &str = "finboard.dashboard";

/// The dashboard data service.
///
/// One `Dashboard` owns the process-wide [`DataCache`] that every widget reads through and
/// runs the schema engine over each payload it serves. Cloning is cheap; clones share the
/// cache.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use finboard::{Dashboard, DashboardConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dashboard = Dashboard::new(DashboardConfig::default())?;
/// let _janitor = dashboard.start_janitor();
///
/// let widget = dashboard
///     .refresh_widget("https://example.com/quote?symbol=AAPL", Duration::from_secs(30))
///     .await?;
/// println!("{} via {:?}", widget.analysis.widget_type, widget.display);
/// # Ok(())
/// # }
/// ```
pub struct Dashboard<F: Fetcher<Output = Value> = HttpFetcher> {
    cache: DataCache<F>,
    config: DashboardConfig,
}

impl<F: Fetcher<Output = Value>> Clone for Dashboard<F> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

impl<F: Fetcher<Output = Value>> Debug for Dashboard<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

impl Dashboard<HttpFetcher> {
    /// Creates a dashboard fetching over HTTP on the Tokio clock.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn new(config: DashboardConfig) -> std::result::Result<Self, FetchError> {
        Self::with_clock(config, Clock::new_tokio())
    }

    /// Creates a dashboard fetching over HTTP on the given clock.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn with_clock(
        config: DashboardConfig,
        clock: Clock,
    ) -> std::result::Result<Self, FetchError> {
        let fetcher = HttpFetcher::with_config(&config.http_config())?;
        let cache = DataCache::builder(clock)
            .name(DASHBOARD_CACHE_NAME)
            .fetch_timeout(config.fetch_timeout)
            .build(fetcher);
        Ok(Self::from_parts(cache, config))
    }
}

impl<F: Fetcher<Output = Value>> Dashboard<F> {
    /// Wraps an existing cache with the default configuration.
    #[must_use]
    pub fn with_cache(cache: DataCache<F>) -> Self {
        Self::from_parts(cache, DashboardConfig::default())
    }

    /// Wraps an existing cache with the given configuration.
    ///
    /// The fetch settings of `config` are not applied to `cache`.
    #[must_use]
    pub const fn from_parts(cache: DataCache<F>, config: DashboardConfig) -> Self {
        Self { cache, config }
    }

    /// Options for a widget refreshed every `refresh_interval`: data stays usable for sixty
    /// refresh intervals.
    #[must_use]
    pub fn widget_options(refresh_interval: Duration) -> GetOptions {
        GetOptions::new()
            .with_refresh_interval(refresh_interval)
            .with_max_age(refresh_interval.saturating_mul(WIDGET_MAX_AGE_FACTOR))
    }

    /// Loads the payload behind `url` through the cache and analyzes it.
    ///
    /// # Errors
    ///
    /// Returns the cache error when neither fresh nor fallback data is available.
    pub async fn load(&self, url: impl Into<CacheKey>, options: GetOptions) -> Result<WidgetData> {
        let lookup = self.cache.get(url, options).await?;
        Ok(WidgetData::from_lookup(lookup))
    }

    /// Loads `url` with the configured default options.
    ///
    /// # Errors
    ///
    /// Returns the cache error when neither fresh nor fallback data is available.
    pub async fn load_default(&self, url: impl Into<CacheKey>) -> Result<WidgetData> {
        self.load(url, self.config.default_options).await
    }

    /// Loads `url` for a widget refreshed every `refresh_interval`.
    ///
    /// # Errors
    ///
    /// Returns the cache error when neither fresh nor fallback data is available.
    pub async fn refresh_widget(
        &self,
        url: impl Into<CacheKey>,
        refresh_interval: Duration,
    ) -> Result<WidgetData> {
        self.load(url, Self::widget_options(refresh_interval)).await
    }

    /// Drops the cached payload of `url` and fetches it again.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; there is no stale data to fall back to.
    pub async fn force_refresh(
        &self,
        url: impl Into<CacheKey>,
        refresh_interval: Duration,
    ) -> Result<WidgetData> {
        let key = url.into();
        let removed = self.cache.invalidate(key.clone());
        tracing::info!(url = %key, removed, "forcing widget refresh");
        self.refresh_widget(key, refresh_interval).await
    }

    /// Drops the cached payload of `url`. Returns `true` if there was one.
    pub fn invalidate(&self, url: impl Into<CacheKey>) -> bool {
        self.cache.invalidate(url)
    }

    /// Removes entries whose last successful fetch is older than `max_age`, returning how many
    /// were removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        self.cache.cleanup(max_age)
    }

    /// Removes entries older than the configured cleanup max age.
    pub fn cleanup_default(&self) -> usize {
        self.cleanup(self.config.cleanup_max_age)
    }

    /// Diagnostics for every cached URL.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Diagnostics for the cached URLs starting with `prefix`.
    #[must_use]
    pub fn stats_for(&self, prefix: &str) -> Vec<EntryStats> {
        self.cache.stats_for(prefix)
    }

    /// Starts the periodic cleanup with the configured period and max age.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    #[must_use = "the janitor stops when dropped"]
    pub fn start_janitor(&self) -> CacheJanitor {
        tracing::info!(
            period_secs = self.config.cleanup_period.as_secs_f64(),
            max_age_secs = self.config.cleanup_max_age.as_secs_f64(),
            "starting cache cleanup"
        );
        CacheJanitor::start(&self.cache, self.config.cleanup_period, self.config.cleanup_max_age)
    }

    /// The shared cache.
    #[must_use]
    pub const fn cache(&self) -> &DataCache<F> {
        &self.cache
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }
}
