// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use finboard_cache::{
    DEFAULT_CLEANUP_MAX_AGE, DEFAULT_CLEANUP_PERIOD, DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT, GetOptions,
    HttpFetcherConfig,
};
use serde::{Deserialize, Serialize};

/// Settings of a [`Dashboard`](crate::Dashboard).
///
/// Durations are written in seconds. Missing fields take their defaults, so an empty document
/// is a valid configuration:
///
/// ```
/// use std::time::Duration;
///
/// use finboard::DashboardConfig;
///
/// let config: DashboardConfig =
///     serde_json::from_str(r#"{"fetch_timeout": 5, "cleanup_period": 600}"#).unwrap();
///
/// assert_eq!(config.fetch_timeout, Duration::from_secs(5));
/// assert_eq!(config.user_agent, "FinBoard/1.0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Client-side timeout of every upstream request.
    #[serde(with = "finboard_cache::duration_secs")]
    pub fetch_timeout: Duration,
    /// `User-Agent` sent upstream.
    pub user_agent: String,
    /// Period between two cleanup sweeps.
    #[serde(with = "finboard_cache::duration_secs")]
    pub cleanup_period: Duration,
    /// Age beyond which a sweep removes an entry.
    #[serde(with = "finboard_cache::duration_secs")]
    pub cleanup_max_age: Duration,
    /// Options used by [`Dashboard::load_default`](crate::Dashboard::load_default).
    pub default_options: GetOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cleanup_period: DEFAULT_CLEANUP_PERIOD,
            cleanup_max_age: DEFAULT_CLEANUP_MAX_AGE,
            default_options: GetOptions::default(),
        }
    }
}

impl DashboardConfig {
    pub(crate) fn http_config(&self) -> HttpFetcherConfig {
        HttpFetcherConfig::default()
            .with_timeout(self.fetch_timeout)
            .with_user_agent(self.user_agent.clone())
    }
}
