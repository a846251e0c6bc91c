mod common;

use chrono::Duration;
use common::{base_time, init_tracing};
use crypto_news::{Clock, ManualClock, QueryCache};
use futures::future::join_all;
use std::sync::Arc;

fn cache_with_clock() -> (QueryCache<Vec<u32>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(base_time()));
    let cache = QueryCache::new(Duration::minutes(5), clock.clone() as Arc<dyn Clock>);
    (cache, clock)
}

#[tokio::test]
async fn test_hit_reports_age() {
    init_tracing();
    let (cache, clock) = cache_with_clock();

    cache.set("articles:page=1", vec![1, 2, 3]).await;
    clock.advance(Duration::minutes(2));

    let hit = cache.get("articles:page=1").await.expect("fresh entry");
    assert_eq!(hit.value, vec![1, 2, 3]);
    assert_eq!(hit.age.num_minutes(), 2);
    assert!(cache.get("articles:page=2").await.is_none());
}

#[tokio::test]
async fn test_entries_past_ttl_are_never_returned() {
    let (cache, clock) = cache_with_clock();

    cache.set("k", vec![7]).await;
    clock.advance(Duration::minutes(5) - Duration::seconds(1));
    assert!(cache.get("k").await.is_some());

    clock.advance(Duration::seconds(1));
    assert!(cache.get("k").await.is_none());
    // Expired entries are evicted on access.
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn test_set_refreshes_timestamp() {
    let (cache, clock) = cache_with_clock();

    cache.set("k", vec![1]).await;
    clock.advance(Duration::minutes(4));
    cache.set("k", vec![2]).await;
    clock.advance(Duration::minutes(4));

    let hit = cache.get("k").await.expect("refreshed entry");
    assert_eq!(hit.value, vec![2]);
    assert_eq!(hit.age.num_minutes(), 4);
}

#[tokio::test]
async fn test_invalidation() {
    let (cache, _clock) = cache_with_clock();

    cache.set("articles:page=1", vec![1]).await;
    cache.set("articles:page=2", vec![2]).await;
    cache.set("stats", vec![3]).await;

    assert_eq!(cache.invalidate_prefix("articles:").await, 2);
    assert!(cache.get("articles:page=1").await.is_none());
    assert!(cache.get("stats").await.is_some());

    assert_eq!(cache.invalidate_all().await, 1);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_purge_expired_keeps_fresh_entries() {
    let (cache, clock) = cache_with_clock();

    cache.set("old", vec![1]).await;
    clock.advance(Duration::minutes(3));
    cache.set("new", vec![2]).await;
    clock.advance(Duration::minutes(3));

    assert_eq!(cache.purge_expired().await, 1);
    assert_eq!(cache.len().await, 1);
    assert!(cache.get("new").await.is_some());
}

#[tokio::test]
async fn test_concurrent_readers_and_writers() {
    let (cache, _clock) = cache_with_clock();
    let cache = Arc::new(cache);

    let writers = (0..16u32).map(|i| {
        let cache = cache.clone();
        tokio::spawn(async move { cache.set(format!("key-{}", i % 4), vec![i]).await })
    });
    for result in join_all(writers).await {
        result.unwrap();
    }

    let readers = (0..4).map(|i| {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get(&format!("key-{}", i)).await })
    });
    for result in join_all(readers).await {
        assert!(result.unwrap().is_some());
    }
    assert_eq!(cache.len().await, 4);
}

#[tokio::test]
async fn test_write_after_invalidation_is_dropped() {
    let (cache, _clock) = cache_with_clock();

    let before = cache.generation();
    assert!(cache.set_if_generation("articles:page=1", vec![1], before).await);

    let read_started = cache.generation();
    // An insert lands while the read is still querying the store.
    cache.invalidate_all().await;
    assert!(!cache.set_if_generation("articles:page=1", vec![0], read_started).await);
    assert!(cache.get("articles:page=1").await.is_none());

    // Prefix invalidation counts too, even when it drops nothing.
    let read_started = cache.generation();
    cache.invalidate_prefix("articles:").await;
    assert!(!cache.set_if_generation("articles:page=2", vec![0], read_started).await);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_age_is_never_negative() {
    let (cache, clock) = cache_with_clock();

    cache.set("k", vec![1]).await;
    // Entry stamped after the reader looked at the clock.
    clock.set(base_time() - Duration::seconds(30));

    let hit = cache.get("k").await.expect("fresh entry");
    assert_eq!(hit.age, Duration::zero());
}
