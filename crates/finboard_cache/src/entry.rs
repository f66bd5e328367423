// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Upper bound of the retry cooldown, regardless of the refresh interval.
pub const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Returns the minimum time between two network attempts for an entry refreshed every
/// `refresh_interval`: half the interval, capped at [`MAX_RETRY_INTERVAL`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use finboard_cache::min_retry_interval;
///
/// assert_eq!(min_retry_interval(Duration::from_secs(20)), Duration::from_secs(10));
/// assert_eq!(min_retry_interval(Duration::from_secs(300)), Duration::from_secs(30));
/// ```
#[must_use]
pub fn min_retry_interval(refresh_interval: Duration) -> Duration {
    (refresh_interval / 2).min(MAX_RETRY_INTERVAL)
}

/// The last successfully fetched payload for one resource, plus its recency bookkeeping.
///
/// An entry only exists once a fetch succeeded; absence is equivalent to "never fetched".
/// `data` is only replaced on success, so it always corresponds to the payload as of
/// [`last_success_at`](Self::last_success_at). Failed attempts move
/// [`last_attempt_at`](Self::last_attempt_at) and record [`last_error`](Self::last_error).
///
/// All predicates take the current instant explicitly, so they are pure and easy to test.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    data: V,
    fetched_at: Instant,
    last_success_at: Instant,
    last_attempt_at: Instant,
    refresh_interval: Duration,
    fetch_count: u64,
    last_error: Option<Arc<str>>,
}

impl<V> CacheEntry<V> {
    pub(crate) const fn new(data: V, now: Instant, refresh_interval: Duration) -> Self {
        Self {
            data,
            fetched_at: now,
            last_success_at: now,
            last_attempt_at: now,
            refresh_interval,
            fetch_count: 1,
            last_error: None,
        }
    }

    /// Replaces the payload after a successful fetch.
    ///
    /// The stored refresh interval only ever tightens.
    pub(crate) fn record_success(&mut self, data: V, now: Instant, refresh_interval: Duration) {
        self.data = data;
        self.fetched_at = now;
        self.last_success_at = now;
        self.last_attempt_at = now;
        self.refresh_interval = self.refresh_interval.min(refresh_interval);
        self.fetch_count = self.fetch_count.saturating_add(1);
        self.last_error = None;
    }

    pub(crate) fn record_failure(&mut self, now: Instant, message: impl Into<Arc<str>>) {
        self.last_attempt_at = now;
        self.last_error = Some(message.into());
    }

    /// The payload as of the last successful fetch.
    #[must_use]
    pub const fn data(&self) -> &V {
        &self.data
    }

    /// Consumes the entry, returning the payload.
    #[must_use]
    pub fn into_data(self) -> V {
        self.data
    }

    /// When `data` was last written.
    #[must_use]
    pub const fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    /// When the last successful fetch settled.
    #[must_use]
    pub const fn last_success_at(&self) -> Instant {
        self.last_success_at
    }

    /// When the last network attempt settled, successful or not.
    #[must_use]
    pub const fn last_attempt_at(&self) -> Instant {
        self.last_attempt_at
    }

    /// The tightest refresh interval ever requested for this resource.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Number of successful fetches.
    #[must_use]
    pub const fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    /// Message of the most recent failed attempt, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Age of `data` at `now`.
    #[must_use]
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    /// The refresh interval that applies to a request asking for `requested`.
    #[must_use]
    pub fn effective_interval(&self, requested: Duration) -> Duration {
        self.refresh_interval.min(requested)
    }

    /// Returns `true` while `data` is younger than `refresh_interval`.
    #[must_use]
    pub fn is_fresh_at(&self, now: Instant, refresh_interval: Duration) -> bool {
        self.age_at(now) < refresh_interval
    }

    /// Returns `true` while `data` is younger than `max_age`.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant, max_age: Duration) -> bool {
        self.age_at(now) < max_age
    }

    /// Admission gate for a new network attempt.
    ///
    /// Refuses while the last attempt is more recent than [`min_retry_interval`]. Past the
    /// cooldown, admits only once the last successful value is itself older than
    /// `refresh_interval`.
    #[must_use]
    pub fn should_attempt_refetch_at(&self, now: Instant, refresh_interval: Duration) -> bool {
        if now.saturating_duration_since(self.last_attempt_at) < min_retry_interval(refresh_interval) {
            return false;
        }

        now.saturating_duration_since(self.last_success_at) >= refresh_interval
    }
}
