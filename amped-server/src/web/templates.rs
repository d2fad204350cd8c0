//! Askama templates for the status page.

use askama::Template;
use chrono::Local;

use crate::publisher::MapSnapshot;

/// Shown before the first successful refresh.
const NEVER_UPDATED: &str = "00:00";

/// Status page: counts, last update time and loading state.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub ebike_only_count: usize,
    pub empty_count: usize,
    pub last_updated: String,
    pub is_loading: bool,
    pub stations: Vec<StationView>,
}

/// One row in the station table.
#[derive(Debug, Clone)]
pub struct StationView {
    pub name: String,
    pub ebikes_available: u32,
    pub is_empty: bool,
    pub is_offline: bool,
}

impl IndexTemplate {
    /// Build the page for a snapshot, honouring the empty-station filter.
    pub fn from_snapshot(snapshot: &MapSnapshot, show_empty: bool) -> Self {
        let last_updated = snapshot
            .data
            .last_update_time()
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| NEVER_UPDATED.to_string());

        let stations = snapshot
            .visible_annotations(show_empty)
            .map(|a| StationView {
                name: a.station.name.clone(),
                ebikes_available: a.station.ebikes_available,
                is_empty: !a.station.has_ebikes(),
                is_offline: a.station.is_offline,
            })
            .collect();

        Self {
            ebike_only_count: snapshot.data.ebike_only_count(),
            empty_count: snapshot.data.empty_count(),
            last_updated,
            is_loading: snapshot.is_loading,
            stations,
        }
    }
}
