//! Station data refresh: single-flight coordination and the periodic timer.

mod coordinator;
mod scheduler;

pub use coordinator::{DEFAULT_MIN_DISPLAY, RefreshCoordinator, RefreshOutcome, RefreshStats};
pub use scheduler::{DEFAULT_REFRESH_INTERVAL, MIN_REFRESH_INTERVAL, PeriodicScheduler};
