//! Scenario tests for the booking manager.

use super::*;
use crate::cache::{FileBookingCache, FileCacheConfig, MemoryBookingCache};
use crate::clock::ManualClock;
use crate::source::stub::{Reply, StubSource, booking};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const NOW: i64 = 1_700_000_000;

struct Harness {
    manager: BookingManager,
    source: Arc<StubSource>,
    cache: Arc<MemoryBookingCache>,
    clock: ManualClock,
}

fn harness(source: StubSource) -> Harness {
    let clock = ManualClock::new(NOW);
    let source = Arc::new(source);
    let cache = Arc::new(MemoryBookingCache::new(Arc::new(clock.clone())));
    let manager = BookingManager::new(source.clone(), cache.clone(), Arc::new(clock.clone()));
    Harness {
        manager,
        source,
        cache,
        clock,
    }
}

fn drain(sub: &mut Subscription<FetchResult>) -> Vec<FetchResult> {
    let mut seen = Vec::new();
    while let Some(result) = sub.try_next() {
        seen.push(result);
    }
    seen
}

/// Compact description of a result sequence: `P`, `S:<ref>` or `F:<status>`.
fn describe(results: &[FetchResult]) -> Vec<String> {
    results
        .iter()
        .map(|result| match result {
            FetchResult::Pending => "P".to_string(),
            FetchResult::Success(record) => format!("S:{}", record.ship_reference),
            FetchResult::Failure(error) => format!("F:{}", error.status().unwrap_or(0)),
        })
        .collect()
}

#[tokio::test]
async fn initial_result_is_pending() {
    let h = harness(StubSource::new(vec![]));
    assert!(matches!(h.manager.current(), FetchResult::Pending));
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn empty_cache_fetches_once_and_writes_through() {
    let h = harness(StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]));
    let mut sub = h.manager.subscribe();

    let outcome = h.manager.fetch(false).await;

    assert_eq!(h.source.calls(), 1);
    assert_eq!(outcome.booking().unwrap().ship_reference, "NEW");
    assert_eq!(describe(&drain(&mut sub)), vec!["P", "S:NEW"]);
    assert_eq!(
        h.cache.load().await.unwrap(),
        Some(booking("NEW", NOW + 60))
    );
}

#[tokio::test]
async fn fresh_cache_short_circuits_source() {
    let h = harness(StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]));
    h.cache.save(&booking("CACHED", NOW + 3600)).await.unwrap();
    let mut sub = h.manager.subscribe();

    h.manager.fetch(false).await;

    assert_eq!(h.source.calls(), 0);
    assert_eq!(describe(&drain(&mut sub)), vec!["P", "S:CACHED"]);
}

#[tokio::test]
async fn expired_cache_goes_to_source() {
    let h = harness(StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]));
    h.cache.save(&booking("OLD", NOW)).await.unwrap();

    h.manager.fetch(false).await;

    assert_eq!(h.source.calls(), 1);
    assert_eq!(h.manager.current().booking().unwrap().ship_reference, "NEW");
}

#[tokio::test]
async fn corrupt_cache_is_a_miss() {
    let h = harness(StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]));
    h.cache.put_raw("{\"shipReference\":");

    h.manager.fetch(false).await;

    assert_eq!(h.source.calls(), 1);
    assert_eq!(
        h.cache.load().await.unwrap().unwrap().ship_reference,
        "NEW"
    );
}

#[tokio::test]
async fn forced_refresh_publishes_pending_then_calls_source() {
    let h = harness(StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]));
    h.cache.save(&booking("CACHED", NOW + 3600)).await.unwrap();
    h.manager.prime_from_cache().await;
    let mut sub = h.manager.subscribe();

    h.manager.fetch(true).await;

    assert_eq!(h.source.calls(), 1);
    assert_eq!(describe(&drain(&mut sub)), vec!["S:CACHED", "P", "S:NEW"]);
}

#[tokio::test]
async fn failure_preserves_stale_cache() {
    let h = harness(StubSource::new(vec![Reply::Fail(503)]));
    let stale = booking("STALE", NOW - 10);
    h.cache.save(&stale).await.unwrap();
    let mut sub = h.manager.subscribe();

    let outcome = h.manager.fetch(true).await;

    assert!(matches!(outcome, FetchResult::Failure(_)));
    assert_eq!(describe(&drain(&mut sub)), vec!["P", "P", "F:503"]);
    assert_eq!(h.cache.load().await.unwrap(), Some(stale));
}

#[tokio::test]
async fn failure_on_empty_cache_leaves_it_empty() {
    let h = harness(StubSource::new(vec![Reply::Fail(500)]));

    h.manager.fetch(false).await;

    assert!(matches!(h.manager.current(), FetchResult::Failure(_)));
    assert!(h.cache.load().await.unwrap().is_none());
}

#[tokio::test]
async fn retry_after_failure_recovers() {
    let h = harness(StubSource::new(vec![
        Reply::Fail(502),
        Reply::Booking(booking("NEW", NOW + 60)),
    ]));
    let mut sub = h.manager.subscribe();

    h.manager.fetch(false).await;
    h.manager.fetch(true).await;

    assert_eq!(h.source.calls(), 2);
    assert_eq!(describe(&drain(&mut sub)), vec!["P", "F:502", "P", "S:NEW"]);
}

#[tokio::test]
async fn prime_publishes_fresh_cache_only() {
    let h = harness(StubSource::new(vec![]));
    h.cache.save(&booking("CACHED", NOW + 1)).await.unwrap();

    h.manager.prime_from_cache().await;

    assert_eq!(h.source.calls(), 0);
    assert_eq!(
        h.manager.current().booking().unwrap().ship_reference,
        "CACHED"
    );
}

#[tokio::test]
async fn prime_is_noop_on_miss_or_expiry() {
    let h = harness(StubSource::new(vec![Reply::Fail(500)]));
    h.manager.fetch(false).await;
    let mut sub = h.manager.subscribe();

    h.manager.prime_from_cache().await;
    h.cache.save(&booking("OLD", NOW - 1)).await.unwrap();
    h.manager.prime_from_cache().await;
    h.cache.put_raw("garbage");
    h.manager.prime_from_cache().await;

    assert_eq!(describe(&drain(&mut sub)), vec!["F:500"]);
    assert_eq!(h.source.calls(), 1);
}

#[tokio::test]
async fn clear_cache_keeps_published_result() {
    let h = harness(StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]));
    h.manager.fetch(false).await;

    h.manager.clear_cache().await.unwrap();
    h.manager.clear_cache().await.unwrap();

    assert!(h.cache.load().await.unwrap().is_none());
    assert_eq!(h.manager.current().booking().unwrap().ship_reference, "NEW");
}

#[tokio::test]
async fn remaining_validity() {
    let h = harness(StubSource::new(vec![]));
    assert_eq!(h.manager.remaining_validity_seconds().await, None);

    h.cache.save(&booking("B", NOW + 90)).await.unwrap();
    assert_eq!(h.manager.remaining_validity_seconds().await, Some(90));

    h.clock.advance(30);
    assert_eq!(h.manager.remaining_validity_seconds().await, Some(60));

    h.clock.advance(600);
    assert_eq!(h.manager.remaining_validity_seconds().await, Some(0));

    let mut unparsable = booking("B", 0);
    unparsable.expiry_time = "later".to_string();
    h.cache.save(&unparsable).await.unwrap();
    assert_eq!(h.manager.remaining_validity_seconds().await, None);

    h.cache.put_raw("[]");
    assert_eq!(h.manager.remaining_validity_seconds().await, None);
}

#[tokio::test]
async fn flattened_segments_bypass_cache() {
    let h = harness(StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]));
    h.cache.save(&booking("CACHED", NOW + 3600)).await.unwrap();
    let mut sub = h.manager.subscribe();

    let segments = h.manager.flattened_segments().await;

    assert_eq!(h.source.calls(), 1);
    assert_eq!(
        segments.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![1, 2]
    );
    // Neither the cache nor the published result is touched
    assert_eq!(
        h.cache.load().await.unwrap().unwrap().ship_reference,
        "CACHED"
    );
    assert_eq!(describe(&drain(&mut sub)), vec!["P"]);
}

#[tokio::test]
async fn flattened_segments_swallow_errors() {
    let h = harness(StubSource::new(vec![Reply::Fail(500)]));

    assert!(h.manager.flattened_segments().await.is_empty());
    assert!(matches!(h.manager.current(), FetchResult::Pending));
}

#[tokio::test(start_paused = true)]
async fn overlapping_fetches_do_not_interleave() {
    let h = harness(
        StubSource::new(vec![
            Reply::Booking(booking("FIRST", NOW + 60)),
            Reply::Booking(booking("SECOND", NOW + 60)),
        ])
        .with_delay(Duration::from_millis(500)),
    );
    let mut sub = h.manager.subscribe();

    let a = h.manager.clone();
    let b = h.manager.clone();
    let (first, second) = tokio::join!(a.fetch(true), b.fetch(true));

    assert_eq!(h.source.calls(), 2);
    let refs: Vec<_> = [first, second]
        .iter()
        .map(|r| r.booking().unwrap().ship_reference.clone())
        .collect();
    assert!(refs.contains(&"FIRST".to_string()));
    assert!(refs.contains(&"SECOND".to_string()));
    assert_eq!(
        describe(&drain(&mut sub)),
        vec!["P", "P", "S:FIRST", "P", "S:SECOND"]
    );
    assert_eq!(
        h.cache.load().await.unwrap().unwrap().ship_reference,
        "SECOND"
    );
}

#[tokio::test(start_paused = true)]
async fn abandoned_fetch_still_completes() {
    let h = harness(
        StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))])
            .with_delay(Duration::from_secs(1)),
    );
    let mut sub = h.manager.subscribe();

    let gave_up = tokio::time::timeout(Duration::from_millis(100), h.manager.fetch(true)).await;
    assert!(gave_up.is_err());

    let outcome = sub.wait_for(FetchResult::is_terminal).await.unwrap();
    assert_eq!(outcome.booking().unwrap().ship_reference, "NEW");
    assert_eq!(
        h.cache.load().await.unwrap().unwrap().ship_reference,
        "NEW"
    );
}

#[tokio::test]
async fn late_subscriber_gets_latest_then_updates() {
    let h = harness(StubSource::new(vec![
        Reply::Booking(booking("ONE", NOW + 60)),
        Reply::Booking(booking("TWO", NOW + 60)),
        Reply::Booking(booking("THREE", NOW + 60)),
    ]));
    h.manager.fetch(true).await;
    h.manager.fetch(true).await;

    let mut late = h.manager.subscribe();
    h.manager.fetch(true).await;

    assert_eq!(describe(&drain(&mut late)), vec!["S:TWO", "P", "S:THREE"]);
}

/// Memory cache that counts reads.
struct CountingCache {
    inner: MemoryBookingCache,
    loads: AtomicUsize,
}

#[async_trait]
impl BookingCache for CountingCache {
    async fn save(&self, record: &BookingRecord) -> Result<(), CacheError> {
        self.inner.save(record).await
    }

    async fn load(&self) -> Result<Option<BookingRecord>, CacheError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear().await
    }

    fn now_epoch_secs(&self) -> i64 {
        self.inner.now_epoch_secs()
    }
}

#[tokio::test]
async fn cache_first_decision_reads_cache_once() {
    let clock = Arc::new(ManualClock::new(NOW));
    let cache = Arc::new(CountingCache {
        inner: MemoryBookingCache::new(clock.clone()),
        loads: AtomicUsize::new(0),
    });
    cache.inner.save(&booking("CACHED", NOW + 60)).await.unwrap();
    let source = Arc::new(StubSource::new(vec![]));
    let manager = BookingManager::new(source.clone(), cache.clone(), clock);

    let outcome = manager.fetch(false).await;

    assert_eq!(outcome.booking().unwrap().ship_reference, "CACHED");
    assert_eq!(cache.loads.load(Ordering::SeqCst), 1);
    assert_eq!(source.calls(), 0);
}

fn file_manager(
    path: &Path,
    source: StubSource,
) -> (BookingManager, Arc<StubSource>, Arc<FileBookingCache>) {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(NOW));
    let source = Arc::new(source);
    let cache = Arc::new(FileBookingCache::new(
        FileCacheConfig::new(path),
        Arc::clone(&clock),
    ));
    let manager = BookingManager::new(source.clone(), cache.clone(), clock);
    (manager, source, cache)
}

fn other_slot(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).unwrap();
    let slots: std::collections::BTreeMap<String, String> =
        serde_json::from_str(&contents).unwrap();
    slots.get("theme").cloned()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clear_waits_for_fetch_in_progress() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booking.json");
    std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
    let (manager, source, cache) = file_manager(
        &path,
        StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))])
            .with_delay(Duration::from_millis(100)),
    );

    let fetching = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.fetch(true).await })
    };
    while source.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    manager.clear_cache().await.unwrap();

    let outcome = fetching.await.unwrap();
    assert_eq!(outcome.booking().unwrap().ship_reference, "NEW");
    // The clear ran after the write-through
    assert!(cache.load().await.unwrap().is_none());
    assert_eq!(other_slot(&path).as_deref(), Some("dark"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_fetch_and_clear_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booking.json");
    std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
    let (manager, source, cache) = file_manager(
        &path,
        StubSource::new(vec![Reply::Booking(booking("NEW", NOW + 60))]),
    );

    for _ in 0..100 {
        let fetching = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.fetch(true).await })
        };
        let clearing = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.clear_cache().await })
        };
        assert!(fetching.await.unwrap().booking().is_some());
        clearing.await.unwrap().unwrap();
    }

    assert_eq!(source.calls(), 100);
    assert!(cache.load().await.is_ok());
    assert_eq!(other_slot(&path).as_deref(), Some("dark"));
}
