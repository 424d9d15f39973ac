//! Booking client.
//!
//! Fetches a single travel booking, keeps it in a local cache until the
//! booking's own expiry time, and publishes the latest result to any
//! number of observers for display.

pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod manager;
pub mod publish;
pub mod source;
pub mod ui;
