// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A stale-while-revalidate data cache for dashboard widgets.
//!
//! [`DataCache`] sits between widgets and the third-party APIs they poll. Each request states
//! how recent the data should be ([`GetOptions`]), and the cache decides whether to serve the
//! cached payload, refresh it, or fall back to stale data when a refresh fails.
//!
//! # Overview
//!
//! - [`FreshnessStore`] keeps one [`CacheEntry`] per [`CacheKey`] (derived from the URL) and
//!   answers freshness questions against an injected [`tick::Clock`].
//! - Fetches are coalesced by a single-flight group: concurrent requests for one URL share one
//!   network call, and that call runs to completion even if its callers go away.
//! - [`Fetcher`] is the seam to the network; [`HttpFetcher`] is the `reqwest` implementation.
//! - [`CacheJanitor`] periodically sweeps entries that have not been refreshed for a long time.
//!
//! # Serving Policy
//!
//! | entry | refetch admitted | outcome |
//! |---|---|---|
//! | missing | always | fetch; failure is returned |
//! | fresh | n/a | cached payload, [`Served::Fresh`] |
//! | stale | yes | fetch; on failure [`Served::Fallback`] while younger than max age |
//! | stale | no (cooldown) | [`Served::Stale`] while younger than max age, else expired error |
//!
//! The retry cooldown is half the refresh interval, capped at 30 seconds, measured from the
//! last attempt (successful or not).
//!
//! # Features
//!
//! - `metrics`: records activity counts and fetch durations through OpenTelemetry.
//! - `serde`: serialization of [`GetOptions`] and the [`duration_secs`] helpers.

mod builder;
mod cache;
#[cfg(feature = "serde")]
pub mod duration_secs;
mod entry;
mod error;
mod fetcher;
mod http;
mod janitor;
mod key;
mod lookup;
mod options;
mod stats;
mod store;
mod telemetry;

pub use builder::{DEFAULT_CACHE_NAME, DEFAULT_FETCH_TIMEOUT, DataCacheBuilder};
pub use cache::DataCache;
pub use entry::{CacheEntry, MAX_RETRY_INTERVAL, min_retry_interval};
pub use error::{Error, ErrorKind, FetchError, Result};
pub use fetcher::Fetcher;
pub use http::{DEFAULT_HTTP_TIMEOUT, DEFAULT_USER_AGENT, HttpFetcher, HttpFetcherConfig, decode_body};
pub use janitor::{CacheJanitor, DEFAULT_CLEANUP_MAX_AGE, DEFAULT_CLEANUP_PERIOD};
pub use key::CacheKey;
pub use lookup::{Lookup, Served};
pub use options::{DEFAULT_MAX_AGE, DEFAULT_REFRESH_INTERVAL, GetOptions};
pub use stats::{CacheStats, EntryStats};
pub use store::FreshnessStore;
pub use telemetry::CacheTelemetry;
