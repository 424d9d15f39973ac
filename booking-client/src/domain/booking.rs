//! Booking record and its segments.

use serde::{Deserialize, Serialize};

use super::error::ExpiryError;

/// A single travel booking as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub ship_reference: String,
    pub ship_token: String,
    pub can_issue_ticket_checking: bool,
    /// Epoch seconds, encoded as text by the backend.
    pub expiry_time: String,
    #[serde(rename = "duration")]
    pub duration_seconds: i64,
    /// Legs in display order.
    pub segments: Vec<Segment>,
}

impl BookingRecord {
    /// Parse `expiry_time` as epoch seconds.
    pub fn expiry_epoch_secs(&self) -> Result<i64, ExpiryError> {
        parse_expiry(&self.expiry_time)
    }

    /// Whether the booking is unusable at `now` (epoch seconds).
    ///
    /// A booking with an unreadable expiry is always expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expiry_epoch_secs() {
            Ok(expiry) => now >= expiry,
            Err(_) => true,
        }
    }

    /// Seconds of validity left at `now`, clamped at zero.
    ///
    /// Returns `None` if the expiry cannot be parsed.
    pub fn remaining_secs_at(&self, now: i64) -> Option<u64> {
        let expiry = self.expiry_epoch_secs().ok()?;
        let remaining = (i128::from(expiry) - i128::from(now)).max(0);
        Some(u64::try_from(remaining).unwrap_or(u64::MAX))
    }
}

/// One origin → destination leg of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: i64,
    pub origin_and_destination_pair: OriginAndDestinationPair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginAndDestinationPair {
    pub origin: Location,
    pub origin_city: String,
    pub destination: Location,
    pub destination_city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub code: String,
    pub display_name: String,
    pub url: String,
}

/// Parse an epoch-seconds expiry string.
pub fn parse_expiry(value: &str) -> Result<i64, ExpiryError> {
    value.parse::<i64>().map_err(|source| ExpiryError {
        value: value.to_string(),
        source,
    })
}
