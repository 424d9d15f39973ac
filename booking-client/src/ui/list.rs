//! View model for the segment list screen.

use tracing::info;

use crate::domain::Segment;
use crate::manager::BookingManager;
use crate::publish::{Latest, Subscription};

/// Segment list with a loading flag.
///
/// Always shows freshly fetched segments; a failed fetch shows an empty list.
pub struct SegmentListViewModel {
    manager: BookingManager,
    segments: Latest<Vec<Segment>>,
    is_loading: Latest<bool>,
}

impl SegmentListViewModel {
    pub fn new(manager: BookingManager) -> Self {
        Self {
            manager,
            segments: Latest::new(Vec::new()),
            is_loading: Latest::new(false),
        }
    }

    pub async fn load_data(&self) {
        self.is_loading.publish_if_changed(true);
        let segments = self.manager.flattened_segments().await;
        info!(count = segments.len(), "loaded segments");
        self.segments.publish(segments);
        self.is_loading.publish_if_changed(false);
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.segments.get()
    }

    pub fn subscribe_segments(&self) -> Subscription<Vec<Segment>> {
        self.segments.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.get()
    }

    pub fn subscribe_loading(&self) -> Subscription<bool> {
        self.is_loading.subscribe()
    }
}
