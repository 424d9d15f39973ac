//! Booking data manager.
//!
//! Decides on each request whether to serve the cached booking, fetch a
//! fresh one, or report a failure, and publishes the outcome as the single
//! current [`FetchResult`].
//!
//! Fetches are serialised: the whole "check cache, call source, write
//! cache, publish" sequence runs under one lock, so two fetches never
//! interleave their cache writes or publish out of order. Each fetch runs
//! on its own task and completes even if the caller stops waiting for it.

mod result;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::cache::{BookingCache, CacheError};
use crate::clock::Clock;
use crate::domain::{BookingRecord, Segment};
use crate::publish::{Latest, Subscription};
use crate::source::BookingSource;

pub use result::FetchResult;

/// Owner of the current booking result.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct BookingManager {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn BookingSource>,
    cache: Arc<dyn BookingCache>,
    clock: Arc<dyn Clock>,
    result: Latest<FetchResult>,
    fetch_lock: Mutex<()>,
}

impl BookingManager {
    pub fn new(
        source: Arc<dyn BookingSource>,
        cache: Arc<dyn BookingCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache,
                clock,
                result: Latest::new(FetchResult::Pending),
                fetch_lock: Mutex::new(()),
            }),
        }
    }

    /// The most recently published result.
    pub fn current(&self) -> FetchResult {
        self.inner.result.get()
    }

    /// Observe results: the current one first, then every later one.
    pub fn subscribe(&self) -> Subscription<FetchResult> {
        self.inner.result.subscribe()
    }

    /// Publish the cached booking if it is still valid.
    ///
    /// Does nothing on a miss, an expired entry or an unreadable cache.
    pub async fn prime_from_cache(&self) {
        let _guard = self.inner.fetch_lock.lock().await;
        match self.inner.fresh_cached().await {
            Some(record) => {
                info!(ship_reference = %record.ship_reference, "primed booking from cache");
                self.inner
                    .result
                    .publish(FetchResult::Success(Arc::new(record)));
            }
            None => debug!("no valid cached booking to prime from"),
        }
    }

    /// Fetch the booking and publish the outcome.
    ///
    /// Without `force_refresh` a valid cached booking is served as is. With
    /// it, [`FetchResult::Pending`] is published first and the source is
    /// always called. Returns the published outcome.
    pub async fn fetch(&self, force_refresh: bool) -> FetchResult {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.fetch(force_refresh).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "booking fetch task failed");
                self.current()
            }
        }
    }

    /// Remove the cached booking. The published result is left alone.
    ///
    /// Waits for any fetch in progress, so a write-through never lands
    /// after the clear.
    pub async fn clear_cache(&self) -> Result<(), CacheError> {
        let _guard = self.inner.fetch_lock.lock().await;
        self.inner.cache.clear().await?;
        info!("booking cache cleared");
        Ok(())
    }

    /// Seconds until the cached booking expires, never below zero.
    ///
    /// `None` when nothing usable is cached or the expiry is not a number.
    pub async fn remaining_validity_seconds(&self) -> Option<u64> {
        let record = match self.inner.cache.load().await {
            Ok(record) => record?,
            Err(e) => {
                debug!(error = %e, "no remaining validity for unreadable cache");
                return None;
            }
        };
        record.remaining_secs_at(self.inner.clock.now_epoch_secs())
    }

    /// Segments of a freshly fetched booking.
    ///
    /// Always goes to the source, ignoring the cache and the published
    /// result. Any failure yields an empty list.
    pub async fn flattened_segments(&self) -> Vec<Segment> {
        match self.inner.source.get_booking_details().await {
            Ok(record) => {
                debug!(count = record.segments.len(), "fetched booking segments");
                record.segments
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch booking segments");
                Vec::new()
            }
        }
    }
}

impl Inner {
    async fn fetch(&self, force_refresh: bool) -> FetchResult {
        let _guard = self.fetch_lock.lock().await;
        debug!(force_refresh, "fetching booking");

        if force_refresh {
            self.result.publish(FetchResult::Pending);
        } else if let Some(record) = self.fresh_cached().await {
            debug!("using cached booking");
            let outcome = FetchResult::Success(Arc::new(record));
            self.result.publish(outcome.clone());
            return outcome;
        }

        let outcome = match self.source.get_booking_details().await {
            Ok(record) => {
                info!(ship_reference = %record.ship_reference, "fetched booking from source");
                if let Err(e) = self.cache.save(&record).await {
                    warn!(error = %e, "failed to write booking to cache");
                }
                FetchResult::Success(Arc::new(record))
            }
            Err(e) => {
                warn!(error = %e, "booking fetch failed");
                FetchResult::Failure(Arc::new(e))
            }
        };

        self.result.publish(outcome.clone());
        debug!(
            subscribers = self.result.subscriber_count(),
            "published booking result"
        );
        outcome
    }

    /// The cached booking, if present, readable and unexpired.
    async fn fresh_cached(&self) -> Option<BookingRecord> {
        match self.cache.load().await {
            Ok(Some(record)) if !record.is_expired_at(self.clock.now_epoch_secs()) => {
                Some(record)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "failed to read booking cache");
                None
            }
        }
    }
}

#[cfg(test)]
mod manager_tests;
