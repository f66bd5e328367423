// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};
use tick::Clock;

use crate::{CacheEntry, CacheKey};

/// Per-key recency bookkeeping, with no I/O.
///
/// The store owns the entries and reads the current time from the injected [`Clock`]. It is
/// only mutated after a fetch settles, and by explicit invalidation or cleanup.
pub struct FreshnessStore<V> {
    entries: DashMap<CacheKey, CacheEntry<V>>,
    clock: Clock,
}

impl<V> Debug for FreshnessStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessStore")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<V> FreshnessStore<V>
where
    V: Clone,
{
    /// Creates an empty store reading time from `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// The current instant according to the store's clock.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.clock.instant()
    }

    /// The clock the store reads time from.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Stores a successfully fetched payload.
    ///
    /// Creates the entry, or updates it in place: the payload and every timestamp move to now,
    /// the fetch count increments and the stored refresh interval keeps the tighter of the
    /// existing and requested values.
    pub fn put(&self, key: CacheKey, data: V, refresh_interval: Duration) {
        let now = self.now();
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => occupied.get_mut().record_success(data, now, refresh_interval),
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(data, now, refresh_interval));
            }
        }
    }

    /// Records a failed attempt against an existing entry. A missing entry stays missing.
    pub fn record_failure(&self, key: &CacheKey, message: impl Into<Arc<str>>) {
        let now = self.now();
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.record_failure(now, message);
        }
    }

    /// Returns a snapshot of the entry for `key`.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry<V>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Deletes the entry for `key`, returning `true` if one existed.
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Lists the keys of every stored entry.
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Age of `entry` according to the store's clock.
    #[must_use]
    pub fn age(&self, entry: &CacheEntry<V>) -> Duration {
        entry.age_at(self.now())
    }

    /// Deletes every entry whose last success is older than `max_age`, returning how many
    /// were removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let now = self.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = now.saturating_duration_since(entry.last_success_at()) <= max_age;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Visits every entry. The visitor must not call back into the store.
    pub(crate) fn for_each(&self, mut visit: impl FnMut(&CacheKey, &CacheEntry<V>)) {
        for entry in &self.entries {
            visit(entry.key(), entry.value());
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
