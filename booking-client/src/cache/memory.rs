//! In-process booking cache.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::clock::Clock;
use crate::domain::BookingRecord;

use super::BookingCache;
use super::error::CacheError;

/// Cache that keeps the booking's JSON text in memory.
///
/// Stores the encoded form rather than the value so loads go through the
/// same decode path as the disk cache.
#[derive(Clone)]
pub struct MemoryBookingCache {
    slot: Arc<Mutex<Option<String>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryBookingCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            clock,
        }
    }

    /// Store raw text in the slot, bypassing encoding.
    pub fn put_raw(&self, json: impl Into<String>) {
        *self.lock() = Some(json.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BookingCache for MemoryBookingCache {
    async fn save(&self, record: &BookingRecord) -> Result<(), CacheError> {
        let json = serde_json::to_string(record).map_err(CacheError::Encode)?;
        *self.lock() = Some(json);
        Ok(())
    }

    async fn load(&self) -> Result<Option<BookingRecord>, CacheError> {
        let json = self.lock().clone();
        json.map(|json| serde_json::from_str(&json).map_err(CacheError::Decode))
            .transpose()
    }

    async fn clear(&self) -> Result<(), CacheError> {
        *self.lock() = None;
        Ok(())
    }

    fn now_epoch_secs(&self) -> i64 {
        self.clock.now_epoch_secs()
    }
}
