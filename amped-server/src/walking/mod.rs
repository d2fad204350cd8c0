//! Walking-time estimates from the user to a station.
//!
//! Runs alongside the refresh cycle: lookups read the currently published
//! snapshot to find the station but never write to it. Estimates use
//! straight-line distance scaled by a street-grid detour factor, cached per
//! station and coarse origin cell so repeated taps on the map are free.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Coordinate, StationId};
use crate::publisher::MapSnapshot;

/// Average walking speed in metres per second.
pub const WALKING_SPEED_MPS: f64 = 1.4;

/// Ratio of street distance to straight-line distance in a city grid.
pub const DETOUR_FACTOR: f64 = 1.3;

/// Errors from a walking-time lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkingError {
    /// The caller's location is unknown
    #[error("current location unavailable")]
    NoLocation,

    /// The station is not in the published snapshot
    #[error("unknown station: {0}")]
    UnknownStation(StationId),
}

/// Estimate walking time between two points.
pub fn estimate(from: &Coordinate, to: &Coordinate) -> Duration {
    let metres = from.distance_m(to) * DETOUR_FACTOR;
    Duration::from_secs_f64(metres / WALKING_SPEED_MPS)
}

/// Format a duration as whole minutes, rounding up (e.g. `"7"`).
///
/// A zero duration formats as `"0"`; anything else is at least one minute.
pub fn format_minutes(duration: Duration) -> String {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.div_ceil(60).to_string()
}

/// Cache key: station plus the origin snapped to a grid cell.
type WalkKey = (StationId, i32, i32);

/// Configuration for the walking-time cache.
#[derive(Debug, Clone)]
pub struct WalkingConfig {
    /// TTL for cached estimates.
    pub ttl: Duration,

    /// Maximum number of cached estimates.
    pub max_capacity: u64,

    /// Origin grid cell size in degrees (0.001° ≈ 110 m of latitude).
    pub cell_deg: f64,
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
            cell_deg: 0.001,
        }
    }
}

/// Cached walking-time lookups against the published map.
pub struct WalkingTimes {
    cache: MokaCache<WalkKey, Duration>,
    cell_deg: f64,
}

impl WalkingTimes {
    pub fn new(config: &WalkingConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            cache,
            cell_deg: config.cell_deg,
        }
    }

    /// Snap a coordinate to its grid cell.
    fn cell(&self, c: &Coordinate) -> (i32, i32) {
        (
            (c.lat() / self.cell_deg).round() as i32,
            (c.lng() / self.cell_deg).round() as i32,
        )
    }

    /// Walking time from `origin` to the station `id` in `snapshot`.
    ///
    /// Origins in the same grid cell share a cached estimate.
    pub async fn lookup(
        &self,
        origin: Option<Coordinate>,
        snapshot: &MapSnapshot,
        id: &StationId,
    ) -> Result<Duration, WalkingError> {
        let origin = origin.ok_or(WalkingError::NoLocation)?;
        let target = snapshot
            .data
            .find(id)
            .map(|a| a.coordinate)
            .ok_or_else(|| WalkingError::UnknownStation(id.clone()))?;

        let (lat_cell, lng_cell) = self.cell(&origin);
        let key = (id.clone(), lat_cell, lng_cell);

        Ok(self
            .cache
            .get_with(key, async move { estimate(&origin, &target) })
            .await)
    }

    /// Number of cached estimates (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for WalkingTimes {
    fn default() -> Self {
        Self::new(&WalkingConfig::default())
    }
}
