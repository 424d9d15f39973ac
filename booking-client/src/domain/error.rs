//! Domain error types.

use std::num::ParseIntError;

/// The `expiryTime` of a booking is not an integer number of epoch seconds.
///
/// Never surfaced to the user: a booking whose expiry cannot be read is
/// treated as already expired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid expiry time {value:?}: {source}")]
pub struct ExpiryError {
    pub value: String,
    #[source]
    pub source: ParseIntError,
}
