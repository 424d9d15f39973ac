//! Published fetch outcome.

use std::sync::Arc;

use crate::domain::BookingRecord;
use crate::source::SourceError;

/// Latest outcome of the booking manager.
///
/// `Pending` is both the initial value and the marker published when a
/// forced refresh starts.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Pending,
    Success(Arc<BookingRecord>),
    Failure(Arc<SourceError>),
}

impl FetchResult {
    /// Whether this ends a fetch (success or failure).
    pub fn is_terminal(&self) -> bool {
        match self {
            FetchResult::Pending => false,
            FetchResult::Success(_) | FetchResult::Failure(_) => true,
        }
    }

    pub fn booking(&self) -> Option<&BookingRecord> {
        match self {
            FetchResult::Success(record) => Some(record),
            FetchResult::Pending | FetchResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SourceError> {
        match self {
            FetchResult::Failure(error) => Some(error),
            FetchResult::Pending | FetchResult::Success(_) => None,
        }
    }
}
