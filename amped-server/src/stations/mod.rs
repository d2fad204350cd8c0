//! Bike-share station feed client and categorization.
//!
//! Fetches the full station availability list from the remote feed and
//! splits it into empty-dock and e-bike stations for the map.

mod categorize;
mod client;
mod error;
mod mock;
mod source;

pub use categorize::{StationCategories, categorize};
pub use client::{LocationDto, StationClient, StationClientConfig, StationDto};
pub use error::StationError;
pub use mock::MockStationClient;
pub use source::{FeedSource, StationSource};

#[cfg(test)]
pub(crate) use categorize::test_support;
