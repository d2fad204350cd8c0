//! Periodic silent refresh.
//!
//! The scheduler owns one background task that calls
//! `RefreshCoordinator::refresh(true)` every interval. Each tick's refresh is
//! awaited before the next tick is considered, so the scheduler never
//! overlaps itself; overlap with user refreshes is the coordinator's job.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::stations::StationSource;

use super::coordinator::{RefreshCoordinator, RefreshOutcome};

/// Default interval between silent refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Shortest interval the scheduler accepts; shorter requests are clamped.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Handles for a running timer task.
struct RunningTimer {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Fires silent refreshes on a fixed interval until stopped.
pub struct PeriodicScheduler<S: StationSource> {
    coordinator: Arc<RefreshCoordinator<S>>,
    running: Mutex<Option<RunningTimer>>,
}

impl<S: StationSource> PeriodicScheduler<S> {
    pub fn new(coordinator: Arc<RefreshCoordinator<S>>) -> Self {
        Self {
            coordinator,
            running: Mutex::new(None),
        }
    }

    /// Start firing silent refreshes every `interval`.
    ///
    /// The first refresh happens one full interval from now. Starting an
    /// already-running scheduler replaces the old timer. Must be called from
    /// within a Tokio runtime.
    pub fn start(&self, interval: Duration) {
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = running.take() {
            previous.shutdown();
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let coordinator = self.coordinator.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    changed = shutdown_rx.changed() => {
                        // Sender dropped or shutdown requested.
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        debug!("periodic refresh tick");
                        if let RefreshOutcome::Coalesced = coordinator.refresh(true).await {
                            debug!("periodic refresh coalesced into running cycle");
                        }
                    }
                }
            }
            debug!("periodic refresh task exiting");
        });

        info!(interval_secs = interval.as_secs_f64(), "periodic refresh started");
        *running = Some(RunningTimer {
            shutdown_tx,
            handle,
        });
    }

    /// Stop the timer. Safe to call repeatedly, or without `start`.
    ///
    /// A refresh already running on the timer task is allowed to finish.
    pub fn stop(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = running.take() {
            timer.shutdown();
            info!("periodic refresh stopped");
        }
    }

    /// Whether a timer task is active.
    pub fn is_running(&self) -> bool {
        let running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        running.as_ref().is_some_and(|t| !t.handle.is_finished())
    }
}

impl RunningTimer {
    fn shutdown(self) {
        // The task may already have exited; either way it sees the signal or a closed channel.
        let _ = self.shutdown_tx.send(true);
        drop(self.handle);
    }
}

impl<S: StationSource> Drop for PeriodicScheduler<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::AnnotationPublisher;
    use crate::refresh::DEFAULT_MIN_DISPLAY;
    use crate::stations::MockStationClient;
    use crate::stations::test_support::station;

    fn scheduler(mock: MockStationClient) -> PeriodicScheduler<MockStationClient> {
        PeriodicScheduler::new(Arc::new(RefreshCoordinator::new(
            mock,
            Arc::new(AnnotationPublisher::new()),
            DEFAULT_MIN_DISPLAY,
        )))
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_interval() {
        let mock = MockStationClient::new(vec![station("1", 0), station("2", 4)]);
        let scheduler = scheduler(mock.clone());

        scheduler.start(Duration::from_secs(10));
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(mock.fetch_count(), 2);

        let snapshot = scheduler.coordinator.publisher().current();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.data.ebike_only_count(), 1);

        scheduler.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(mock.fetch_count(), 2);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn no_refresh_before_first_interval() {
        let mock = MockStationClient::new(vec![station("1", 1)]);
        let scheduler = scheduler(mock.clone());

        scheduler.start(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_millis(9_900)).await;
        assert_eq!(mock.fetch_count(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(mock.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_safe_unstarted() {
        let mock = MockStationClient::new(vec![station("1", 1)]);
        let scheduler = scheduler(mock.clone());

        scheduler.stop();
        assert!(!scheduler.is_running());

        scheduler.start(Duration::from_secs(10));
        scheduler.stop();
        scheduler.stop();
        scheduler.stop();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(mock.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_timer() {
        let mock = MockStationClient::new(vec![station("1", 1)]);
        let scheduler = scheduler(mock.clone());

        scheduler.start(Duration::from_secs(10));
        scheduler.start(Duration::from_secs(4));

        tokio::time::sleep(Duration::from_secs(9)).await;
        // Only the 4s timer is live: ticks at 4 and 8.
        assert_eq!(mock.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_timer() {
        let mock = MockStationClient::new(vec![station("1", 1)]);
        mock.fail_next("offline");
        let scheduler = scheduler(mock.clone());

        scheduler.start(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(mock.fetch_count(), 1);
        assert!(scheduler.coordinator.publisher().current().data.last_update_time().is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(mock.fetch_count(), 2);
        assert!(scheduler.coordinator.publisher().current().data.last_update_time().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_is_clamped() {
        let mock = MockStationClient::new(vec![station("1", 1)]);
        let scheduler = scheduler(mock.clone());

        scheduler.start(Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(mock.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_user_refresh_absorbs_tick() {
        let mock =
            MockStationClient::new(vec![station("1", 1)]).with_delay(Duration::from_secs(3));
        let scheduler = scheduler(mock.clone());
        let coordinator = scheduler.coordinator.clone();

        scheduler.start(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(9)).await;

        // User refresh spans the t=10 tick, which is coalesced.
        assert!(coordinator.refresh(false).await.is_published());
        assert_eq!(mock.fetch_count(), 1);

        tokio::time::sleep(Duration::from_secs(9)).await;
        // t=21: the t=20 tick ran its own fetch (done at t=23).
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(mock.fetch_count(), 2);
    }
}
