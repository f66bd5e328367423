// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `FlightGroup::join()`.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{
            AtomicUsize,
            Ordering::{AcqRel, Acquire},
        },
    },
    time::Duration,
};

use finboard_flight::{FlightGroup, LeaderPanicked};
use futures::{StreamExt, stream::FuturesUnordered};

#[tokio::test]
async fn direct_call() {
    let group = FlightGroup::new();
    let result = group
        .join("key", || async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            "Result".to_string()
        })
        .await;
    assert_eq!(result, Ok("Result".to_string()));
}

#[tokio::test]
async fn parallel_joins_execute_once() {
    let call_counter = Arc::new(AtomicUsize::default());

    let group = FlightGroup::new();
    let futures = FuturesUnordered::new();
    for _ in 0..10 {
        let counter = Arc::clone(&call_counter);
        futures.push(group.join("key", move || async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            counter.fetch_add(1, AcqRel);
            "Result".to_string()
        }));
    }

    assert!(futures.all(|out| async move { out == Ok("Result".to_string()) }).await);
    assert_eq!(call_counter.load(Acquire), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_joins_across_threads_execute_once() {
    let call_counter = Arc::new(AtomicUsize::default());
    let group: FlightGroup<String, u64> = FlightGroup::new();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let group = group.clone();
        let counter = Arc::clone(&call_counter);
        tasks.push(tokio::spawn(async move {
            group
                .join("shared".to_string(), move || async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    counter.fetch_add(1, AcqRel);
                    42
                })
                .await
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), Ok(42));
    }
    assert_eq!(call_counter.load(Acquire), 1);
}

#[tokio::test]
async fn errors_are_shared_with_every_joiner() {
    let call_counter = Arc::new(AtomicUsize::default());
    let group: FlightGroup<&str, Result<u32, String>> = FlightGroup::new();

    let make_work = |counter: Arc<AtomicUsize>| {
        move || async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            counter.fetch_add(1, AcqRel);
            Err::<u32, _>("upstream unavailable".to_string())
        }
    };

    let first = group.join("key", make_work(Arc::clone(&call_counter)));
    let second = group.join("key", make_work(Arc::clone(&call_counter)));

    let expected = Ok(Err("upstream unavailable".to_string()));
    assert_eq!(first.await, expected);
    assert_eq!(second.await, expected);
    assert_eq!(call_counter.load(Acquire), 1);
}

#[tokio::test]
async fn different_keys_run_independently() {
    let call_counter = Arc::new(AtomicUsize::default());
    let group = FlightGroup::new();

    let a = {
        let counter = Arc::clone(&call_counter);
        group.join("a", move || async move {
            counter.fetch_add(1, AcqRel);
            "a"
        })
    };
    let b = {
        let counter = Arc::clone(&call_counter);
        group.join("b", move || async move {
            counter.fetch_add(1, AcqRel);
            "b"
        })
    };

    assert_eq!(a.await, Ok("a"));
    assert_eq!(b.await, Ok("b"));
    assert_eq!(call_counter.load(Acquire), 2);
}

#[tokio::test]
async fn settled_flight_is_not_reused() {
    let call_counter = Arc::new(AtomicUsize::default());
    let group = FlightGroup::new();

    for expected in 1..=3 {
        let counter = Arc::clone(&call_counter);
        let result = group
            .join("key", move || async move { counter.fetch_add(1, AcqRel) + 1 })
            .await;
        assert_eq!(result, Ok(expected));
    }

    assert_eq!(call_counter.load(Acquire), 3);
    assert!(group.is_empty());
}

#[tokio::test]
async fn late_join_receives_leader_result() {
    let group = FlightGroup::new();
    let early = group.join("key".to_string(), || async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        "Result".to_string()
    });
    let late = group.join("key".to_string(), std::future::pending::<String>);

    assert_eq!(early.await, Ok("Result".to_string()));
    assert_eq!(late.await, Ok("Result".to_string()));
}

#[tokio::test]
async fn work_completes_after_all_joiners_are_dropped() {
    let completed = Arc::new(AtomicUsize::default());
    let group: FlightGroup<&str, ()> = FlightGroup::new();

    let joined = {
        let completed = Arc::clone(&completed);
        group.join("key", move || async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            completed.fetch_add(1, AcqRel);
        })
    };
    drop(joined);

    for _ in 0..50 {
        if completed.load(Acquire) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(completed.load(Acquire), 1);
    assert!(!group.in_flight(&"key"));
}

#[tokio::test]
async fn panicking_leader_resolves_joiners_and_clears_registration() {
    let group: FlightGroup<&str, u32> = FlightGroup::new();

    let first = group.join("key", || async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        panic!("leader blew up");
    });
    let second = group.join("key", || async { 7 });

    assert_eq!(first.await, Err(LeaderPanicked));
    assert_eq!(second.await, Err(LeaderPanicked));
    assert!(!group.in_flight(&"key"));

    let retry = group.join("key", || async { 7 }).await;
    assert_eq!(retry, Ok(7));
}

#[test]
fn join_outside_runtime_panics_and_leaves_group_usable() {
    let group: FlightGroup<&str, u32> = FlightGroup::new();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        drop(group.join("key", || async { 1 }));
    }));

    assert!(outcome.is_err());
    assert!(group.is_empty());
    assert!(!group.in_flight(&"key"));
}

#[tokio::test]
async fn panicking_work_closure_registers_nothing() {
    let group: FlightGroup<&str, u32> = FlightGroup::new();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        drop(group.join("key", || -> std::future::Ready<u32> { panic!("no future for you") }));
    }));

    assert!(outcome.is_err());
    assert!(group.is_empty());
    assert_eq!(group.join("key", || async { 7 }).await, Ok(7));
}
