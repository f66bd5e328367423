// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logging and optional metrics for cache activity.
//!
//! Every decision the cache makes is emitted as a `tracing` event named `cache.event`, with
//! the activity as a stable dotted name. With the `metrics` feature, the same activities are
//! counted through OpenTelemetry and upstream fetch durations are recorded.

use std::{sync::Arc, time::Duration};

#[cfg(any(feature = "metrics", test))]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter},
};
use tracing::Level;

use crate::CacheKey;

pub(crate) mod attributes;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// Cache telemetry sink, passed to the cache builder via `.telemetry()`.
///
/// The default emits `tracing` events and no metrics.
///
/// # Examples
///
/// ```
/// use finboard_cache::CacheTelemetry;
///
/// let quiet = CacheTelemetry::new(false);
/// let logging = CacheTelemetry::default();
/// # let _ = (quiet, logging);
/// ```
#[derive(Clone, Debug)]
pub struct CacheTelemetry {
    inner: Arc<CacheTelemetryInner>,
}

#[derive(Debug)]
struct CacheTelemetryInner {
    logging_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    fetch_duration: Option<Histogram<f64>>,
}

impl Default for CacheTelemetry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CacheTelemetry {
    /// Creates a telemetry sink that emits `tracing` events when `logging_enabled` is set.
    #[must_use]
    pub fn new(logging_enabled: bool) -> Self {
        Self {
            inner: Arc::new(CacheTelemetryInner {
                logging_enabled,
                #[cfg(any(feature = "metrics", test))]
                event_counter: None,
                #[cfg(any(feature = "metrics", test))]
                fetch_duration: None,
            }),
        }
    }

    /// Additionally records activity counts and fetch durations on `meter`.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn with_metrics(self, meter: &Meter) -> Self {
        Self {
            inner: Arc::new(CacheTelemetryInner {
                logging_enabled: self.inner.logging_enabled,
                event_counter: Some(metrics::create_event_counter(meter)),
                fetch_duration: Some(metrics::create_fetch_duration_histogram(meter)),
            }),
        }
    }

    pub(crate) fn record(&self, cache_name: &'static str, activity: CacheActivity, url: &CacheKey, duration: Option<Duration>) {
        #[cfg(any(feature = "metrics", test))]
        {
            let attrs = [
                KeyValue::new(attributes::CACHE_NAME, cache_name),
                KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
            ];

            if let Some(counter) = &self.inner.event_counter {
                counter.add(1, &attrs);
            }

            if let (Some(d), Some(histogram)) = (duration, &self.inner.fetch_duration) {
                histogram.record(d.as_secs_f64(), &attrs);
            }
        }

        if self.inner.logging_enabled {
            Self::emit(cache_name, activity, url.url(), duration);
        }
    }

    pub(crate) fn record_fetch_failure(
        &self,
        cache_name: &'static str,
        url: &CacheKey,
        duration: Duration,
        error: &crate::Error,
    ) {
        #[cfg(any(feature = "metrics", test))]
        {
            let attrs = [
                KeyValue::new(attributes::CACHE_NAME, cache_name),
                KeyValue::new(attributes::CACHE_ACTIVITY_NAME, CacheActivity::FetchFailed.as_str()),
            ];

            if let Some(counter) = &self.inner.event_counter {
                counter.add(1, &attrs);
            }

            if let Some(histogram) = &self.inner.fetch_duration {
                histogram.record(duration.as_secs_f64(), &attrs);
            }
        }

        if self.inner.logging_enabled {
            tracing::debug!(
                cache.name = cache_name,
                cache.activity = CacheActivity::FetchFailed.as_str(),
                cache.url = url.url(),
                cache.duration_ns = duration.as_nanos(),
                error = %error,
                "cache.event"
            );
        }
    }

    pub(crate) fn record_cleanup(&self, cache_name: &'static str, removed: usize, remaining: usize) {
        #[cfg(any(feature = "metrics", test))]
        {
            if let Some(counter) = &self.inner.event_counter {
                let attrs = [
                    KeyValue::new(attributes::CACHE_NAME, cache_name),
                    KeyValue::new(attributes::CACHE_ACTIVITY_NAME, CacheActivity::Cleanup.as_str()),
                ];
                counter.add(1, &attrs);
            }
        }

        if self.inner.logging_enabled {
            tracing::info!(
                cache.name = cache_name,
                cache.activity = CacheActivity::Cleanup.as_str(),
                cache.removed = removed,
                cache.remaining = remaining,
                "cache.event"
            );
        }
    }

    fn emit(cache_name: &'static str, activity: CacheActivity, url: &str, duration: Option<Duration>) {
        let name = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing levels must be constant. Field names must match the constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = cache_name,
                    cache.activity = name,
                    cache.url = url,
                    cache.duration_ns = ?duration_ns,
                    "cache.event"
                )
            };
        }

        match activity.level() {
            Level::ERROR => emit_event!(error),
            Level::WARN => emit_event!(warn),
            Level::INFO => emit_event!(info),
            _ => emit_event!(debug),
        }
    }
}

/// What the cache did for one request or housekeeping call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    FreshHit,
    Miss,
    StaleHit,
    Refreshed,
    FetchFailed,
    Fallback,
    Expired,
    Error,
    Invalidated,
    Cleanup,
}

impl CacheActivity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FreshHit => "cache.fresh_hit",
            Self::Miss => "cache.miss",
            Self::StaleHit => "cache.stale_hit",
            Self::Refreshed => "cache.refreshed",
            Self::FetchFailed => "cache.fetch_failed",
            Self::Fallback => "cache.fallback",
            Self::Expired => "cache.expired",
            Self::Error => "cache.error",
            Self::Invalidated => "cache.invalidated",
            Self::Cleanup => "cache.cleanup",
        }
    }

    pub const fn level(self) -> Level {
        match self {
            Self::FreshHit | Self::Miss | Self::StaleHit | Self::Refreshed | Self::FetchFailed => Level::DEBUG,
            Self::Invalidated | Self::Cleanup => Level::INFO,
            Self::Fallback => Level::WARN,
            Self::Expired | Self::Error => Level::ERROR,
        }
    }
}
