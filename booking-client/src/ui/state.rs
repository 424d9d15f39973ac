//! UI state derived from fetch results.

use std::sync::Arc;

use crate::domain::BookingRecord;
use crate::manager::FetchResult;
use crate::source::SourceError;

/// What the booking screen shows.
#[derive(Debug, Clone)]
pub enum BookingUiState {
    Loading,
    Success(Arc<BookingRecord>),
    Error(Arc<SourceError>),
}

impl BookingUiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, BookingUiState::Loading)
    }
}

impl From<&FetchResult> for BookingUiState {
    fn from(result: &FetchResult) -> Self {
        match result {
            FetchResult::Pending => BookingUiState::Loading,
            FetchResult::Success(record) => BookingUiState::Success(Arc::clone(record)),
            FetchResult::Failure(error) => BookingUiState::Error(Arc::clone(error)),
        }
    }
}

/// Next value of the "refresh in progress" flag after observing `result`.
///
/// Any terminal result ends the refresh. `Pending` leaves the flag alone,
/// since a refresh publishes `Pending` itself.
pub fn refreshing_after(refreshing: bool, result: &FetchResult) -> bool {
    match result {
        FetchResult::Pending => refreshing,
        FetchResult::Success(_) | FetchResult::Failure(_) => false,
    }
}

/// Kind of failure, for choosing what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No response arrived
    Network,
    /// The backend answered with an error status
    Server(u16),
    Generic,
}

impl ErrorCategory {
    pub fn of(error: &SourceError) -> Self {
        if error.is_transport() {
            return ErrorCategory::Network;
        }
        match error.status() {
            Some(status) => ErrorCategory::Server(status),
            None => ErrorCategory::Generic,
        }
    }

    /// Message shown next to the retry control.
    pub fn message(&self, error: &SourceError) -> String {
        match self {
            ErrorCategory::Network => {
                "Network connection error, please check your network settings".to_string()
            }
            ErrorCategory::Server(status) => format!("Server error ({status})"),
            ErrorCategory::Generic => format!("Something went wrong: {error}"),
        }
    }
}

/// Format a remaining-validity countdown as `MM:SS`.
///
/// Minutes are not wrapped into hours.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
