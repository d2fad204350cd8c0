//! Mock station feed for development and testing without network access.
//!
//! Serves a fixed station list (in memory or loaded from a JSON file in the
//! feed's wire format). Latency and failures can be injected, and the mock
//! records how many fetches ran and how many overlapped.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::Station;

use super::client::parse_stations;
use super::error::StationError;
use super::source::StationSource;

#[derive(Default)]
struct MockState {
    stations: RwLock<Vec<Station>>,
    /// Failure messages served (in order) by the next fetches.
    scripted_failures: Mutex<VecDeque<String>>,
    fetch_count: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Mock station feed.
#[derive(Clone, Default)]
pub struct MockStationClient {
    state: Arc<MockState>,
    delay: Duration,
}

impl MockStationClient {
    /// Create a mock serving the given stations.
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            state: Arc::new(MockState {
                stations: RwLock::new(stations),
                ..MockState::default()
            }),
            delay: Duration::ZERO,
        }
    }

    /// Create a mock by loading a JSON file in the feed's wire format.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StationError> {
        Ok(Self::new(load_file(path.as_ref())?))
    }

    /// Simulate network latency on every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the served station list.
    pub async fn set_stations(&self, stations: Vec<Station>) {
        *self.state.stations.write().await = stations;
    }

    /// Make the next fetch fail with the given message.
    ///
    /// Calls queue up: N calls fail the next N fetches.
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut queue) = self.state.scripted_failures.lock() {
            queue.push_back(message.into());
        }
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        self.state.fetch_count.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that were ever running at once.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_failure(&self) -> Option<String> {
        self.state
            .scripted_failures
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
    }
}

fn load_file(path: &Path) -> Result<Vec<Station>, StationError> {
    let json = std::fs::read_to_string(path).map_err(|e| StationError::Mock {
        message: format!("failed to read {:?}: {}", path, e),
    })?;
    parse_stations(&json)
}

impl StationSource for MockStationClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, StationError> {
        self.state.fetch_count.fetch_add(1, Ordering::SeqCst);
        let running = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match self.next_failure() {
            Some(message) => Err(StationError::Mock { message }),
            None => Ok(self.state.stations.read().await.clone()),
        };

        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
