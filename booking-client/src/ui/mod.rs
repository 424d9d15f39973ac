//! Presentation layer: what a screen needs to render the booking.
//!
//! Nothing here draws anything. The view models turn manager results into
//! observable UI state and expose the commands a screen can issue.

mod booking;
mod list;
mod state;
mod task;

pub use booking::{BookingViewModel, ViewModelConfig};
pub use list::SegmentListViewModel;
pub use state::{BookingUiState, ErrorCategory, format_remaining, refreshing_after};
pub use task::{CancelSignal, ScopedTask};
