// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use crate::{CacheEntry, CacheKey};

/// Read-only diagnostics for the whole cache.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheStats {
    entries: Vec<EntryStats>,
}

impl CacheStats {
    pub(crate) const fn new(entries: Vec<EntryStats>) -> Self {
        Self { entries }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.entries.len()
    }

    /// Per-entry diagnostics, sorted by URL.
    #[must_use]
    pub fn entries(&self) -> &[EntryStats] {
        &self.entries
    }
}

/// Read-only diagnostics for one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryStats {
    url: CacheKey,
    age: Duration,
    fresh: bool,
    fetch_count: u64,
    last_error: Option<String>,
}

impl EntryStats {
    pub(crate) fn from_entry<V>(url: &CacheKey, entry: &CacheEntry<V>, now: Instant) -> Self {
        Self {
            url: url.clone(),
            age: entry.age_at(now),
            fresh: entry.is_fresh_at(now, entry.refresh_interval()),
            fetch_count: entry.fetch_count(),
            last_error: entry.last_error().map(str::to_string),
        }
    }

    /// The cached URL.
    #[must_use]
    pub const fn url(&self) -> &CacheKey {
        &self.url
    }

    /// Age of the cached payload.
    #[must_use]
    pub const fn age(&self) -> Duration {
        self.age
    }

    /// Age of the cached payload in fractional seconds.
    #[must_use]
    pub fn age_seconds(&self) -> f64 {
        self.age.as_secs_f64()
    }

    /// Whether the payload is fresh under the entry's stored refresh interval.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Number of successful fetches.
    #[must_use]
    pub const fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    /// Message of the last failed attempt since the last success, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
