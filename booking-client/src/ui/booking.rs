//! View model for the booking screen.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::manager::{BookingManager, FetchResult};
use crate::publish::{Latest, Subscription};

use super::state::{BookingUiState, refreshing_after};
use super::task::ScopedTask;

/// Default interval between expiry checks.
const DEFAULT_EXPIRY_POLL: Duration = Duration::from_secs(1);

/// Configuration for [`BookingViewModel`].
#[derive(Debug, Clone)]
pub struct ViewModelConfig {
    /// How often the remaining validity is recomputed.
    pub expiry_poll_interval: Duration,

    /// Start a refresh when the cached booking runs out.
    pub auto_refresh_on_expiry: bool,
}

impl ViewModelConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.expiry_poll_interval = interval;
        self
    }

    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh_on_expiry = enabled;
        self
    }
}

impl Default for ViewModelConfig {
    fn default() -> Self {
        Self {
            expiry_poll_interval: DEFAULT_EXPIRY_POLL,
            auto_refresh_on_expiry: false,
        }
    }
}

/// Observable state plus the commands that change it.
#[derive(Clone)]
struct Controller {
    manager: BookingManager,
    ui_state: Latest<BookingUiState>,
    is_refreshing: Latest<bool>,
    remaining: Latest<Option<u64>>,
}

impl Controller {
    fn observe(&self, result: &FetchResult) {
        debug!(terminal = result.is_terminal(), "received booking result");
        self.ui_state.publish(BookingUiState::from(result));
        self.is_refreshing
            .update(|refreshing| refreshing_after(*refreshing, result));
    }

    async fn refresh(&self) {
        info!("refreshing booking");
        self.is_refreshing.publish_if_changed(true);
        self.manager.fetch(true).await;
    }

    async fn tick(&self, auto_refresh: bool, previous: Option<u64>) -> Option<u64> {
        let remaining = self.manager.remaining_validity_seconds().await;
        self.remaining.publish_if_changed(remaining);
        if auto_refresh && remaining == Some(0) && previous != Some(0) {
            info!("cached booking expired");
            self.refresh().await;
        }
        remaining
    }
}

/// Booking screen state: UI state, refresh flag and remaining validity.
///
/// Owns two background tasks, a result collector and an expiry ticker.
/// Both run until [`BookingViewModel::shutdown`] or until the view model
/// is dropped.
pub struct BookingViewModel {
    controller: Controller,
    tasks: Vec<ScopedTask>,
}

impl BookingViewModel {
    /// Create the view model and start its background tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(manager: BookingManager, config: ViewModelConfig) -> Self {
        let controller = Controller {
            manager,
            ui_state: Latest::new(BookingUiState::Loading),
            is_refreshing: Latest::new(false),
            remaining: Latest::new(None),
        };

        let mut results = controller.manager.subscribe();
        let collector = {
            let controller = controller.clone();
            ScopedTask::spawn("booking-results", move |mut cancel| async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        next = results.next() => match next {
                            Some(result) => controller.observe(&result),
                            None => break,
                        },
                    }
                }
            })
        };

        let ticker = {
            let controller = controller.clone();
            ScopedTask::spawn("expiry-check", move |mut cancel| async move {
                let mut interval = tokio::time::interval(config.expiry_poll_interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut previous = None;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = interval.tick() => {
                            previous = controller
                                .tick(config.auto_refresh_on_expiry, previous)
                                .await;
                        }
                    }
                }
            })
        };

        Self {
            controller,
            tasks: vec![collector, ticker],
        }
    }

    /// Show the cached booking if valid, otherwise fetch one.
    pub async fn load_initial(&self) {
        let manager = &self.controller.manager;
        manager.prime_from_cache().await;
        if matches!(manager.current(), FetchResult::Pending) {
            debug!("no cached booking, fetching from source");
            manager.fetch(false).await;
        }
    }

    /// Pull-to-refresh: always contacts the source.
    pub async fn refresh(&self) {
        self.controller.refresh().await;
    }

    /// Retry after an error: shows loading straight away, then refetches.
    pub async fn retry(&self) {
        info!("retrying booking fetch");
        self.controller.ui_state.publish(BookingUiState::Loading);
        self.controller.manager.fetch(true).await;
    }

    pub fn ui_state(&self) -> BookingUiState {
        self.controller.ui_state.get()
    }

    pub fn subscribe_ui_state(&self) -> Subscription<BookingUiState> {
        self.controller.ui_state.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.controller.is_refreshing.get()
    }

    pub fn subscribe_refreshing(&self) -> Subscription<bool> {
        self.controller.is_refreshing.subscribe()
    }

    /// Seconds until the cached booking expires, as of the last check.
    pub fn remaining_time(&self) -> Option<u64> {
        self.controller.remaining.get()
    }

    pub fn subscribe_remaining_time(&self) -> Subscription<Option<u64>> {
        self.controller.remaining.subscribe()
    }

    /// Stop the background tasks and wait for them to finish.
    pub async fn shutdown(self) {
        for task in self.tasks {
            task.shutdown().await;
        }
    }
}
