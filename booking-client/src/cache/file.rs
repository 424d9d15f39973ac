//! Disk-based booking cache.
//!
//! The file is a small key/value JSON document. The booking lives in a
//! single slot as JSON text, so the file can hold unrelated slots without
//! the cache caring about them.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::clock::Clock;
use crate::domain::BookingRecord;

use super::BookingCache;
use super::error::CacheError;

/// Default cache file, relative to the working directory.
const DEFAULT_PATH: &str = "booking_cache.json";

/// Slot holding the booking JSON.
const BOOKING_KEY: &str = "booking_data";

type Slots = BTreeMap<String, String>;

/// Configuration for the booking disk cache.
#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    /// Path to the cache file.
    pub path: PathBuf,
}

impl FileCacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PATH)
    }
}

/// Disk cache for the booking.
#[derive(Clone)]
pub struct FileBookingCache {
    config: FileCacheConfig,
    clock: Arc<dyn Clock>,
}

impl FileBookingCache {
    pub fn new(config: FileCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Read every slot. A missing file is an empty document.
    async fn read_slots(&self) -> Result<Slots, CacheError> {
        match tokio::fs::read_to_string(&self.config.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(CacheError::Decode),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Slots::new()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    /// Replace the document. Writes a fresh temporary file next to the
    /// cache and renames it over the old one, so a crash never leaves a
    /// half-written cache and concurrent writers never share a temp file.
    async fn write_slots(&self, slots: &Slots) -> Result<(), CacheError> {
        let path = self.config.path.clone();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;

        let json = serde_json::to_string_pretty(slots).map_err(CacheError::Encode)?;
        tokio::task::spawn_blocking(move || {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(json.as_bytes())?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok::<_, std::io::Error>(())
        })
        .await
        .map_err(std::io::Error::other)??;
        Ok(())
    }

    async fn remove_file(&self) -> Result<(), CacheError> {
        match tokio::fs::remove_file(&self.config.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(CacheError::Io(e)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl BookingCache for FileBookingCache {
    async fn save(&self, record: &BookingRecord) -> Result<(), CacheError> {
        let json = serde_json::to_string(record).map_err(CacheError::Encode)?;

        // A corrupt document is replaced rather than blocking the write
        let mut slots = match self.read_slots().await {
            Ok(slots) => slots,
            Err(CacheError::Decode(_)) => Slots::new(),
            Err(e) => return Err(e),
        };
        slots.insert(BOOKING_KEY.to_string(), json);
        self.write_slots(&slots).await?;

        debug!(path = %self.config.path.display(), "booking written to cache");
        Ok(())
    }

    async fn load(&self) -> Result<Option<BookingRecord>, CacheError> {
        let slots = self.read_slots().await?;
        let Some(json) = slots.get(BOOKING_KEY) else {
            return Ok(None);
        };
        serde_json::from_str(json)
            .map(Some)
            .map_err(CacheError::Decode)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut slots = match self.read_slots().await {
            Ok(slots) => slots,
            Err(CacheError::Decode(_)) => return self.remove_file().await,
            Err(e) => return Err(e),
        };
        if slots.remove(BOOKING_KEY).is_none() {
            return Ok(());
        }
        if slots.is_empty() {
            self.remove_file().await
        } else {
            self.write_slots(&slots).await
        }
    }

    fn now_epoch_secs(&self) -> i64 {
        self.clock.now_epoch_secs()
    }
}
