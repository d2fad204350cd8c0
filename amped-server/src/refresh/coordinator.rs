//! Single-flight refresh of station data into the published map state.
//!
//! Both the periodic timer and user actions funnel through
//! [`RefreshCoordinator::refresh`]. At most one fetch-and-publish cycle runs
//! at a time; a request that arrives while a cycle is running is coalesced
//! into it and returns immediately.
//!
//! User-triggered (non-silent) refreshes show the loading indicator for at
//! least the configured minimum duration so a fast reply doesn't flicker.
//! Silent refreshes never touch the indicator and are never delayed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::publisher::{AnnotationPublisher, AnnotationSet};
use crate::stations::{StationError, StationSource, categorize};

/// Default minimum time the loading indicator stays up for a user refresh.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_secs(1);

/// Bookkeeping guarded by the coordinator's lock.
///
/// Holding the lock *is* the in-flight flag.
#[derive(Debug, Default)]
struct RefreshState {
    /// When the running cycle began.
    started_at: Option<Instant>,
    /// Timestamp of the last successful publish.
    last_published: Option<DateTime<Utc>>,
    /// Cycles run to completion, successful or not.
    completed_cycles: u64,
}

/// Result of one call to [`RefreshCoordinator::refresh`].
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A fresh annotation set was published.
    Published {
        /// Number of stations in the new set.
        stations: usize,
        /// How long the fetch itself took (excluding any display delay).
        elapsed: Duration,
    },
    /// Another refresh was already running; this request was folded into it.
    Coalesced,
    /// The fetch failed; published state is unchanged.
    Failed(StationError),
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RefreshOutcome::Published { .. })
    }
}

/// Diagnostic view of the coordinator's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshStats {
    pub last_published: Option<DateTime<Utc>>,
    pub completed_cycles: u64,
}

/// Holds the loading indicator up for a user refresh.
///
/// Lowered on drop, including when the refresh future is cancelled.
struct LoadingGuard<'a> {
    publisher: &'a AnnotationPublisher,
}

impl<'a> LoadingGuard<'a> {
    fn raise(publisher: &'a AnnotationPublisher) -> Self {
        publisher.set_loading(true);
        Self { publisher }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.publisher.set_loading(false);
    }
}

/// Coordinates fetching, categorizing and publishing station data.
pub struct RefreshCoordinator<S> {
    source: S,
    publisher: Arc<AnnotationPublisher>,
    min_display: Duration,
    state: Mutex<RefreshState>,
}

impl<S: StationSource> RefreshCoordinator<S> {
    /// Create a coordinator that publishes into `publisher`.
    pub fn new(source: S, publisher: Arc<AnnotationPublisher>, min_display: Duration) -> Self {
        Self {
            source,
            publisher,
            min_display,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// The publisher this coordinator writes to.
    pub fn publisher(&self) -> &Arc<AnnotationPublisher> {
        &self.publisher
    }

    /// Run one refresh cycle, or coalesce into the one already running.
    ///
    /// Errors never escape as `Err`: a failed fetch is logged, the loading
    /// indicator is cleared, and the previously published data stays in
    /// place. The next scheduled tick acts as the retry.
    pub async fn refresh(&self, silent: bool) -> RefreshOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            debug!(silent, "refresh already in flight; coalescing");
            return RefreshOutcome::Coalesced;
        };

        let loading = (!silent).then(|| LoadingGuard::raise(&self.publisher));

        let started = Instant::now();
        state.started_at = Some(started);

        let result = self.source.fetch_stations().await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(stations) => {
                let categories = categorize(stations);

                // Only the visible transition waits; the fetch already finished.
                if !silent && elapsed < self.min_display {
                    if let Some(deadline) = started.checked_add(self.min_display) {
                        tokio::time::sleep_until(deadline).await;
                    }
                }

                let count = categories.len();
                let now = Utc::now();
                let set = AnnotationSet::from_categories(categories, now);
                info!(
                    stations = count,
                    ebike_only = set.ebike_only_count(),
                    empty = set.empty_count(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    silent,
                    "published station snapshot"
                );
                self.publisher.publish(set);
                state.last_published = Some(now);

                RefreshOutcome::Published {
                    stations: count,
                    elapsed,
                }
            }
            Err(e) => {
                warn!(error = %e, silent, "station refresh failed; keeping previous snapshot");
                RefreshOutcome::Failed(e)
            }
        };

        drop(loading);

        if let Some(began) = state.started_at.take() {
            debug!(cycle_ms = began.elapsed().as_millis() as u64, silent, "refresh cycle finished");
        }
        state.completed_cycles += 1;
        outcome
    }

    /// Whether a refresh cycle is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.state.try_lock().is_err()
    }

    /// Snapshot of the coordinator's counters.
    ///
    /// Waits for any running cycle to finish first.
    pub async fn stats(&self) -> RefreshStats {
        let state = self.state.lock().await;
        RefreshStats {
            last_published: state.last_published,
            completed_cycles: state.completed_cycles,
        }
    }
}
