// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default desired recency of a request.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Default maximum staleness a request tolerates.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Per-request freshness requirements.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use finboard_cache::GetOptions;
///
/// let options = GetOptions::new()
///     .with_refresh_interval(Duration::from_secs(30))
///     .with_max_age(Duration::from_secs(600));
///
/// assert_eq!(options.refresh_interval(), Duration::from_secs(30));
/// assert_eq!(options.max_age(), Duration::from_secs(600));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GetOptions {
    #[cfg_attr(feature = "serde", serde(with = "crate::duration_secs"))]
    refresh_interval: Duration,
    #[cfg_attr(feature = "serde", serde(with = "crate::duration_secs"))]
    max_age: Duration,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl GetOptions {
    /// Options with a 60 second refresh interval and a one hour max age.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how recent the data must be to be served without a network attempt.
    #[must_use]
    pub const fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Sets how old the data may be and still be served as a stale fallback.
    #[must_use]
    pub const fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// The requested refresh interval.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// The requested max age.
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }
}
