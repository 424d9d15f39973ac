//! Booking sources.
//!
//! A source produces a fresh booking on every call. It may be slow and it
//! may fail; timeouts are its own business, not the caller's.
//!
//! - [`MockBookingSource`] serves a JSON fixture after an artificial delay.
//! - [`HttpBookingSource`] fetches the booking from a backend over HTTP.

mod client;
mod error;
mod mock;
#[cfg(test)]
pub(crate) mod stub;

use async_trait::async_trait;

use crate::domain::BookingRecord;

pub use client::{HttpBookingSource, HttpSourceConfig};
pub use error::SourceError;
pub use mock::{MockBookingSource, MockSourceConfig};

/// Provider of fresh booking data.
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn get_booking_details(&self) -> Result<BookingRecord, SourceError>;
}
