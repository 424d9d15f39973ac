//! Domain types for the booking client.
//!
//! A booking is an immutable value: it is replaced wholesale on every
//! successful fetch and never edited in place. The JSON field names match
//! the backend payload so the same types serve the source and the cache.

mod booking;
mod error;

pub use booking::{BookingRecord, Location, OriginAndDestinationPair, Segment, parse_expiry};
pub use error::ExpiryError;
