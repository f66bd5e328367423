// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{fmt, sync::Arc};

/// Identifies one cached resource.
///
/// A key is derived from the request URL alone; the request method and headers do not
/// participate. Widgets pointing at the identical URL share one cache entry and one
/// in-flight fetch.
///
/// Cloning a key is cheap.
///
/// # Examples
///
/// ```
/// use finboard_cache::CacheKey;
///
/// let key = CacheKey::new("https://api.example.com/quote?symbol=AAPL");
/// assert_eq!(key.url(), "https://api.example.com/quote?symbol=AAPL");
/// assert_eq!(key, CacheKey::from("https://api.example.com/quote?symbol=AAPL"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    /// Creates a key for the given URL.
    #[must_use]
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(Arc::from(url.as_ref()))
    }

    /// Returns the URL this key was derived from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the URL starts with `prefix`.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for CacheKey {
    fn from(url: String) -> Self {
        Self(Arc::from(url))
    }
}

impl From<&String> for CacheKey {
    fn from(url: &String) -> Self {
        Self::new(url)
    }
}
