//! HTTP booking source.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::BookingRecord;

use super::BookingSource;
use super::error::SourceError;

/// Configuration for the HTTP booking source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL of the booking backend
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpSourceConfig {
    /// Create a new config for the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Booking source backed by `GET {base_url}/booking`.
#[derive(Debug, Clone)]
pub struct HttpBookingSource {
    http: reqwest::Client,
    url: String,
}

impl HttpBookingSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: booking_url(&config.base_url),
        })
    }

    /// The URL the booking is fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn booking_url(base_url: &str) -> String {
    format!("{}/booking", base_url.trim_end_matches('/'))
}

#[async_trait]
impl BookingSource for HttpBookingSource {
    async fn get_booking_details(&self) -> Result<BookingRecord, SourceError> {
        debug!(url = %self.url, "requesting booking");
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Json {
            message: e.to_string(),
        })
    }
}
