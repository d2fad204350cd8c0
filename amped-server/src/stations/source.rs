//! Abstraction over where station snapshots come from.

use std::future::Future;

use crate::domain::Station;

use super::client::StationClient;
use super::error::StationError;
use super::mock::MockStationClient;

/// A source of station availability snapshots.
///
/// This abstraction allows the refresh coordinator to be tested with mock
/// data. The returned future must be `Send` so refreshes can run on spawned
/// tasks.
pub trait StationSource: Send + Sync + 'static {
    /// Fetch the full current station list.
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, StationError>> + Send;
}

/// The feed the server runs against, chosen at start-up.
#[derive(Clone)]
pub enum FeedSource {
    /// Live HTTP feed.
    Http(StationClient),
    /// Static data, for development without network access.
    Mock(MockStationClient),
}

impl StationSource for FeedSource {
    async fn fetch_stations(&self) -> Result<Vec<Station>, StationError> {
        match self {
            FeedSource::Http(client) => client.fetch_all().await,
            FeedSource::Mock(mock) => mock.fetch_stations().await,
        }
    }
}
