//! Mock booking source for running without a backend.
//!
//! Reads a booking from a JSON fixture on every call, after a fixed delay
//! that stands in for network latency.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::BookingRecord;

use super::BookingSource;
use super::error::SourceError;

/// Default fixture path, relative to the working directory.
const DEFAULT_FIXTURE: &str = "data/booking.json";

/// Default artificial latency.
const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Configuration for the mock source.
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// JSON file holding one booking.
    pub fixture_path: PathBuf,
    /// Delay before each response.
    pub delay: Duration,
}

impl MockSourceConfig {
    pub fn new(fixture_path: impl Into<PathBuf>) -> Self {
        Self {
            fixture_path: fixture_path.into(),
            delay: DEFAULT_DELAY,
        }
    }

    /// Set a custom delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE)
    }
}

/// Source that serves a booking from a JSON file.
#[derive(Debug, Clone)]
pub struct MockBookingSource {
    config: MockSourceConfig,
}

impl MockBookingSource {
    pub fn new(config: MockSourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BookingSource for MockBookingSource {
    async fn get_booking_details(&self) -> Result<BookingRecord, SourceError> {
        tokio::time::sleep(self.config.delay).await;

        let path = &self.config.fixture_path;
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;

        let record: BookingRecord =
            serde_json::from_str(&json).map_err(|e| SourceError::Json {
                message: format!("{}: {}", path.display(), e),
            })?;

        debug!(ship_reference = %record.ship_reference, "served mock booking");
        Ok(record)
    }
}
