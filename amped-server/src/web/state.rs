//! Application state for the web layer.

use std::sync::Arc;

use crate::publisher::AnnotationPublisher;
use crate::refresh::RefreshCoordinator;
use crate::stations::FeedSource;
use crate::walking::WalkingTimes;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Single-flight refresh of the published snapshot
    pub coordinator: Arc<RefreshCoordinator<FeedSource>>,

    /// Cached walking-time estimates
    pub walking: Arc<WalkingTimes>,

    /// Default for the "show empty stations" filter
    pub show_empty_stations: bool,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        coordinator: Arc<RefreshCoordinator<FeedSource>>,
        walking: WalkingTimes,
        show_empty_stations: bool,
    ) -> Self {
        Self {
            coordinator,
            walking: Arc::new(walking),
            show_empty_stations,
        }
    }

    /// The published map state.
    pub fn publisher(&self) -> &AnnotationPublisher {
        self.coordinator.publisher()
    }
}
