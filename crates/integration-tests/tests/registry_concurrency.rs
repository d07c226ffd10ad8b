//! Registry behavior under concurrent callers

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tidemq_core::Message;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_concurrent_get_or_create_returns_same_instance() {
    let env = common::setup();

    let mut tasks = JoinSet::new();
    for _ in 0..50 {
        let registry = env.registry.clone();
        tasks.spawn(async move { registry.get_or_create("orders").await.unwrap() });
    }

    let mut stores = Vec::new();
    while let Some(result) = tasks.join_next().await {
        stores.push(result.unwrap());
    }

    assert!(stores.iter().all(|s| Arc::ptr_eq(s, &stores[0])));
    assert_eq!(env.registry.queue_names().await, vec!["orders"]);
    assert!(env.dir.path().join("orders").join("queue.db").is_file());
}

#[tokio::test]
async fn test_cross_queue_isolation() {
    let env = common::setup();
    let a = env.registry.get_or_create("a").await.unwrap();
    let b = env.registry.get_or_create("b").await.unwrap();

    a.enqueue(Message::new("shared-id", "from-a")).await.unwrap();
    b.enqueue(Message::new("shared-id", "from-b")).await.unwrap();

    let from_a = a.dequeue(Duration::ZERO).await.unwrap().unwrap();
    assert_eq!(from_a.payload, "from-a");

    // Consuming from a leaves b untouched
    let from_b = b.dequeue(Duration::ZERO).await.unwrap().unwrap();
    assert_eq!(from_b.payload, "from-b");
    assert!(a.dequeue(Duration::ZERO).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_consumers_never_share_in_flight_messages() {
    let env = common::setup();
    let queue = env.registry.get_or_create("work").await.unwrap();
    for i in 0..20 {
        queue
            .enqueue(Message::new(format!("job-{i}"), "p"))
            .await
            .unwrap();
    }

    let mut tasks = JoinSet::new();
    for _ in 0..4 {
        let registry = env.registry.clone();
        tasks.spawn(async move {
            let queue = registry.get_or_create("work").await.unwrap();
            let mut got = Vec::new();
            while let Some(msg) = queue.dequeue(Duration::from_secs(30)).await.unwrap() {
                got.push(msg.id);
            }
            got
        });
    }

    let mut seen = HashSet::new();
    while let Some(result) = tasks.join_next().await {
        for id in result.unwrap() {
            assert!(seen.insert(id.clone()), "{id} delivered twice");
        }
    }
    assert_eq!(seen.len(), 20);
}

#[tokio::test]
async fn test_concurrent_producers_and_waiting_consumers() {
    let env = common::setup();

    let mut consumers = JoinSet::new();
    for _ in 0..5 {
        let registry = env.registry.clone();
        consumers.spawn(async move {
            let queue = registry.get_or_create("events").await.unwrap();
            let msg = queue.wait_for_message(Duration::from_secs(5)).await.unwrap();
            queue.acknowledge(&msg.id).await.unwrap();
            msg.id
        });
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    let queue = env.registry.get_or_create("events").await.unwrap();
    for i in 0..5 {
        queue
            .enqueue(Message::new(format!("evt-{i}"), "p"))
            .await
            .unwrap();
    }

    let mut received = HashSet::new();
    while let Some(result) = consumers.join_next().await {
        assert!(received.insert(result.unwrap()));
    }
    assert_eq!(received.len(), 5);

    let counts = queue.stats().await.unwrap();
    assert_eq!((counts.pending, counts.in_flight), (0, 0));
}
