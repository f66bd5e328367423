// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Coalesces concurrent async jobs for the same key into a single execution.
//!
//! This crate provides [`FlightGroup`], a single-flight coordinator. When several callers
//! ask for the same work (identified by a key) while that work is still outstanding, only
//! the first caller (the "leader") starts it. Every other caller (a "follower") joins the
//! outstanding flight and receives a clone of the very same result, success or failure.
//!
//! # When to Use
//!
//! - **Cache population**: several widgets polling the same endpoint must not trigger
//!   several identical network calls.
//! - **Force refresh racing a timer**: a manual refresh and a scheduled refresh of the same
//!   resource collapse onto one request.
//!
//! # Example
//!
//! ```
//! use finboard_flight::FlightGroup;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let group: FlightGroup<&str, String> = FlightGroup::new();
//!
//! // Concurrent calls with the same key share one execution.
//! let result = group
//!     .join("quote:AAPL", || async { "expensive_result".to_string() })
//!     .await;
//!
//! assert_eq!(result.unwrap(), "expensive_result");
//! # }
//! ```
//!
//! # Registration and Settlement
//!
//! A flight is registered synchronously inside [`FlightGroup::join`], before the returned
//! future is polled even once. Two joins for the same key can therefore never both decide
//! that nothing is in flight.
//!
//! The work is spawned onto the Tokio runtime, so it always runs to completion, even when
//! every caller has dropped its [`Joined`] future. When the work settles, the flight
//! removes its own registration *before* the result becomes visible to joiners; a join
//! issued after settlement starts a new flight.
//!
//! # Panics
//!
//! A panic inside the work does not hang the joiners: each of them resolves to
//! [`LeaderPanicked`] and the registration is cleared, so the next join starts afresh.
//!
//! [`FlightGroup::join`] must be called from within a Tokio runtime.

use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    task::{Context, Poll},
};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

/// The shared, cloneable handle every joiner of one flight awaits.
type Flight<T> = Shared<BoxFuture<'static, Result<T, LeaderPanicked>>>;

/// Returned to every joiner of a flight whose work panicked or was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the leader of a single-flight work item panicked before producing a result")]
pub struct LeaderPanicked;

struct Registration<T> {
    generation: u64,
    flight: Flight<T>,
}

struct Registry<K, T> {
    flights: Mutex<HashMap<K, Registration<T>>>,
    next_generation: AtomicU64,
}

impl<K, T> Registry<K, T>
where
    K: Eq + Hash,
{
    /// Removes the registration for `key`, but only if it still belongs to `generation`.
    fn settle(&self, key: &K, generation: u64) {
        let mut flights = self.flights.lock();
        if flights.get(key).is_some_and(|r| r.generation == generation) {
            flights.remove(key);
        }
    }
}

/// RAII guard living inside the spawned work; clears the registration on completion,
/// panic or abort alike.
struct SettleGuard<K, T>
where
    K: Eq + Hash,
{
    registry: Arc<Registry<K, T>>,
    key: Option<K>,
    generation: u64,
}

impl<K, T> Drop for SettleGuard<K, T>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.registry.settle(&key, self.generation);
        }
    }
}

/// Represents a class of work and creates a space in which units of work
/// can be executed with duplicate suppression.
///
/// Cloning a `FlightGroup` is cheap and yields a handle to the same registry.
pub struct FlightGroup<K, T> {
    registry: Arc<Registry<K, T>>,
}

impl<K, T> Clone for FlightGroup<K, T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<K, T> Default for FlightGroup<K, T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry {
                flights: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }
}

impl<K, T> Debug for FlightGroup<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightGroup")
            .field("in_flight", &self.registry.flights.lock().len())
            .finish()
    }
}

impl<K, T> FlightGroup<K, T>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty flight group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the outstanding flight for `key`, or starts one by calling `work`.
    ///
    /// `work` is only invoked when no flight for `key` is outstanding; a follower's
    /// closure is dropped unused. The work future is spawned immediately, so it makes
    /// progress and settles even if the returned [`Joined`] is never awaited.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime, and propagates a panic raised by `work`
    /// itself. Either way nothing is registered for `key`.
    pub fn join<F, Fut>(&self, key: K, work: F) -> Joined<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        // Resolved before locking: a panic while the guard is armed would re-enter the lock.
        let runtime = tokio::runtime::Handle::current();
        let mut flights = self.registry.flights.lock();

        if let Some(existing) = flights.get(&key) {
            return Joined {
                flight: existing.flight.clone(),
                leader: false,
            };
        }

        let work = work();
        let generation = self.registry.next_generation.fetch_add(1, Ordering::Relaxed);
        let guard = SettleGuard {
            registry: Arc::clone(&self.registry),
            key: Some(key.clone()),
            generation,
        };

        let handle = runtime.spawn(async move {
            let _guard = guard;
            work.await
        });

        // The registry lock is still held, so the task cannot settle before it is registered.
        let flight = handle.map(|joined| joined.map_err(|_| LeaderPanicked)).boxed().shared();
        flights.insert(
            key,
            Registration {
                generation,
                flight: flight.clone(),
            },
        );

        Joined { flight, leader: true }
    }

    /// Returns `true` if a flight for `key` is currently outstanding.
    #[must_use]
    pub fn in_flight(&self, key: &K) -> bool {
        self.registry.flights.lock().contains_key(key)
    }

    /// Returns the number of outstanding flights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.flights.lock().len()
    }

    /// Returns `true` if nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A caller's handle on a flight, resolving to the flight's shared result.
#[must_use = "the work runs regardless, but its result is only observed by awaiting"]
pub struct Joined<T> {
    flight: Flight<T>,
    leader: bool,
}

impl<T> Joined<T> {
    /// Returns `true` if this caller started the flight rather than joining an existing one.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.leader
    }
}

impl<T> Debug for Joined<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joined").field("leader", &self.leader).finish_non_exhaustive()
    }
}

impl<T: Clone> Future for Joined<T> {
    type Output = Result<T, LeaderPanicked>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.flight).poll(cx)
    }
}
