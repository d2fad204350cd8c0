//! Data transfer objects for web requests and responses.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::publisher::{Annotation, AnnotationKind, MapSnapshot};
use crate::refresh::RefreshOutcome;

/// Query for the snapshot endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotQuery {
    /// Include stations without e-bikes (defaults to the server setting)
    pub show_empty: Option<bool>,
}

/// The published map state.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    /// Annotations to draw, after the empty-station filter
    pub annotations: Vec<AnnotationResult>,

    /// Stations with at least one e-bike
    pub ebike_only_count: usize,

    /// Stations with no e-bikes
    pub empty_count: usize,

    /// RFC 3339 time of the last successful refresh
    pub last_update_time: Option<String>,

    /// Whether a user-triggered refresh is showing its loading indicator
    pub is_loading: bool,
}

impl SnapshotResponse {
    pub fn from_snapshot(snapshot: &MapSnapshot, show_empty: bool) -> Self {
        Self {
            annotations: snapshot
                .visible_annotations(show_empty)
                .map(AnnotationResult::from)
                .collect(),
            ebike_only_count: snapshot.data.ebike_only_count(),
            empty_count: snapshot.data.empty_count(),
            last_update_time: snapshot
                .data
                .last_update_time()
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            is_loading: snapshot.is_loading,
        }
    }
}

/// One station pin on the map.
#[derive(Debug, Serialize)]
pub struct AnnotationResult {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub kind: AnnotationKind,
    pub ebikes_available: u32,
    pub total_bikes_available: u32,
    pub is_offline: bool,
}

impl From<&Annotation> for AnnotationResult {
    fn from(a: &Annotation) -> Self {
        Self {
            station_id: a.id().to_string(),
            name: a.station.name.clone(),
            lat: a.coordinate.lat(),
            lng: a.coordinate.lng(),
            kind: a.kind,
            ebikes_available: a.station.ebikes_available,
            total_bikes_available: a.station.total_bikes_available,
            is_offline: a.station.is_offline,
        }
    }
}

/// Result of a user-triggered refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// "published", "coalesced" or "failed"
    pub status: &'static str,

    /// Stations in the new snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stations: Option<usize>,

    /// Fetch duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,

    /// Why the refresh failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RefreshOutcome> for RefreshResponse {
    fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Published { stations, elapsed } => Self {
                status: "published",
                stations: Some(stations),
                elapsed_ms: Some(elapsed.as_millis() as u64),
                error: None,
            },
            RefreshOutcome::Coalesced => Self {
                status: "coalesced",
                stations: None,
                elapsed_ms: None,
                error: None,
            },
            RefreshOutcome::Failed(e) => Self {
                status: "failed",
                stations: None,
                elapsed_ms: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// The caller's location for a walking-time lookup.
#[derive(Debug, Default, Deserialize)]
pub struct WalkQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Walking time to a station.
#[derive(Debug, Serialize)]
pub struct WalkResponse {
    pub station_id: String,

    /// Estimated walk in seconds
    pub seconds: u64,

    /// Whole minutes, rounded up, for display
    pub minutes: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
