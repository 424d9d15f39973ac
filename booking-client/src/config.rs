//! Application configuration and wiring.
//!
//! [`AppConfig`] gathers the settings for every component; [`AppConfig::build_manager`]
//! is the composition root that turns them into a ready [`BookingManager`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::{FileBookingCache, FileCacheConfig};
use crate::clock::{Clock, SystemClock};
use crate::manager::BookingManager;
use crate::source::{
    BookingSource, HttpBookingSource, HttpSourceConfig, MockBookingSource, MockSourceConfig,
    SourceError,
};
use crate::ui::ViewModelConfig;

const ENV_CACHE_PATH: &str = "BOOKING_CACHE_PATH";
const ENV_FIXTURE_PATH: &str = "BOOKING_FIXTURE_PATH";
const ENV_SOURCE_URL: &str = "BOOKING_SOURCE_URL";
const ENV_SOURCE_DELAY_MS: &str = "BOOKING_SOURCE_DELAY_MS";
const ENV_AUTO_REFRESH: &str = "BOOKING_AUTO_REFRESH";

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Where bookings come from.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Mock(MockSourceConfig),
    Http(HttpSourceConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Mock(MockSourceConfig::default())
    }
}

/// Settings for the whole client.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub cache: FileCacheConfig,
    pub source: SourceConfig,
    pub view: ViewModelConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from a variable lookup, starting from defaults.
    ///
    /// `BOOKING_SOURCE_URL` selects the HTTP source; otherwise the mock
    /// source is used with the fixture path and delay from the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_CACHE_PATH) {
            config.cache = FileCacheConfig::new(path);
        }

        config.source = match lookup(ENV_SOURCE_URL) {
            Some(url) => SourceConfig::Http(HttpSourceConfig::new(url)),
            None => {
                let mut mock = MockSourceConfig::default();
                if let Some(path) = lookup(ENV_FIXTURE_PATH) {
                    mock.fixture_path = PathBuf::from(path);
                }
                if let Some(value) = lookup(ENV_SOURCE_DELAY_MS) {
                    let millis = value.parse::<u64>().map_err(|e| ConfigError {
                        var: ENV_SOURCE_DELAY_MS,
                        value: value.clone(),
                        reason: e.to_string(),
                    })?;
                    mock = mock.with_delay(Duration::from_millis(millis));
                }
                SourceConfig::Mock(mock)
            }
        };

        if let Some(value) = lookup(ENV_AUTO_REFRESH) {
            let enabled = parse_flag(&value).ok_or_else(|| ConfigError {
                var: ENV_AUTO_REFRESH,
                value: value.clone(),
                reason: "expected true/false".to_string(),
            })?;
            config.view = config.view.with_auto_refresh(enabled);
        }

        Ok(config)
    }

    /// Wire source, cache and clock into a manager.
    pub fn build_manager(&self) -> Result<BookingManager, SourceError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let source: Arc<dyn BookingSource> = match &self.source {
            SourceConfig::Mock(mock) => {
                info!(fixture = %mock.fixture_path.display(), "using mock booking source");
                Arc::new(MockBookingSource::new(mock.clone()))
            }
            SourceConfig::Http(http) => {
                let source = HttpBookingSource::new(http.clone())?;
                info!(url = source.url(), "using HTTP booking source");
                Arc::new(source)
            }
        };
        let cache = Arc::new(FileBookingCache::new(self.cache.clone(), Arc::clone(&clock)));
        info!(path = %cache.path().display(), "using booking cache file");
        Ok(BookingManager::new(source, cache, clock))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
