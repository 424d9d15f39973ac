//! Single-record booking cache.
//!
//! The cache holds at most one booking. It has no timestamp of its own:
//! whether the stored booking is still usable is decided from the
//! booking's `expiryTime` against the clock at read time.

mod error;
mod file;
mod memory;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::BookingRecord;

pub use error::CacheError;
pub use file::{FileBookingCache, FileCacheConfig};
pub use memory::MemoryBookingCache;

/// Storage for the one cached booking.
///
/// Operations may block on I/O; callers should not assume in-memory speed.
#[async_trait]
pub trait BookingCache: Send + Sync {
    /// Overwrite the stored booking.
    async fn save(&self, record: &BookingRecord) -> Result<(), CacheError>;

    /// Read the stored booking.
    ///
    /// Returns `Ok(None)` when nothing is stored and `Err(CacheError::Decode)`
    /// when something is stored but cannot be read back.
    async fn load(&self) -> Result<Option<BookingRecord>, CacheError>;

    /// Remove the stored booking. Clearing an empty cache is not an error.
    async fn clear(&self) -> Result<(), CacheError>;

    /// Current time in epoch seconds, as seen by this cache.
    fn now_epoch_secs(&self) -> i64;

    /// Whether the cache has nothing usable.
    ///
    /// True when empty, unreadable, when the expiry is not an integer, or
    /// when the clock has reached the expiry.
    async fn is_expired(&self) -> bool {
        match self.load().await {
            Ok(Some(record)) => record.is_expired_at(self.now_epoch_secs()),
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "unreadable booking cache treated as expired");
                true
            }
        }
    }
}
