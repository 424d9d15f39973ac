//! Cache error types.

/// Errors from the booking cache.
///
/// None of these reach the user: the manager treats any cache failure as
/// "no cached booking".
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing the backing store failed
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data exists but is not a valid booking
    #[error("cached booking could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    /// The booking could not be serialized for storage
    #[error("booking could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}
