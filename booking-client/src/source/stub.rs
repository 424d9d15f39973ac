//! Scripted source for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{BookingRecord, Location, OriginAndDestinationPair, Segment};

use super::BookingSource;
use super::error::SourceError;

/// Outcome a [`StubSource`] hands out on one call.
pub(crate) enum Reply {
    Booking(BookingRecord),
    Fail(u16),
}

/// Source that replays scripted replies, repeating the last one forever.
pub(crate) struct StubSource {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubSource {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Result<BookingRecord, SourceError> {
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            *last = Some(reply);
        }
        match last.as_ref() {
            Some(Reply::Booking(record)) => Ok(record.clone()),
            Some(Reply::Fail(status)) => Err(SourceError::Api {
                status: *status,
                message: "scripted failure".to_string(),
            }),
            None => Err(SourceError::Json {
                message: "no scripted reply".to_string(),
            }),
        }
    }
}

#[async_trait]
impl BookingSource for StubSource {
    async fn get_booking_details(&self) -> Result<BookingRecord, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.next_reply()
    }
}

/// A booking with two segments (ids 1 and 2) and the given reference and expiry.
pub(crate) fn booking(reference: &str, expiry: i64) -> BookingRecord {
    let location = |code: &str| Location {
        code: code.to_string(),
        display_name: format!("{code} DisplayName"),
        url: "www.ship.com".to_string(),
    };
    BookingRecord {
        ship_reference: reference.to_string(),
        ship_token: format!("{reference}-TOKEN"),
        can_issue_ticket_checking: false,
        expiry_time: expiry.to_string(),
        duration_seconds: 2430,
        segments: vec![
            Segment {
                id: 1,
                origin_and_destination_pair: OriginAndDestinationPair {
                    origin: location("AAA"),
                    origin_city: "AAA".to_string(),
                    destination: location("BBB"),
                    destination_city: "BBB".to_string(),
                },
            },
            Segment {
                id: 2,
                origin_and_destination_pair: OriginAndDestinationPair {
                    origin: location("BBB"),
                    origin_city: "BBB".to_string(),
                    destination: location("CCC"),
                    destination_city: "CCC".to_string(),
                },
            },
        ],
    }
}
