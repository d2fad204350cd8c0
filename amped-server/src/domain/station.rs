//! Station identity and availability snapshot types.

use std::fmt;

use serde::Serialize;

use super::{Coordinate, DomainError};

/// A non-empty bike-share station identifier.
///
/// The feed uses opaque strings (usually UUIDs or short numerics). Leading
/// and trailing whitespace is trimmed on parse.
///
/// # Examples
///
/// ```
/// use amped_server::domain::StationId;
///
/// let id = StationId::parse(" 66db2a1f ").unwrap();
/// assert_eq!(id.as_str(), "66db2a1f");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier, rejecting blank input.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidStationId("must not be blank"));
        }
        Ok(StationId(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One station as reported by the availability feed.
///
/// Immutable once received; a refresh replaces stations wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub location: Coordinate,
    /// Total bikes the feed reports at the dock.
    pub total_bikes_available: u32,
    pub ebikes_available: u32,
    pub is_offline: bool,
}

impl Station {
    /// Whether the station has at least one e-bike to rent.
    pub fn has_ebikes(&self) -> bool {
        self.ebikes_available > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id = StationId::parse("  72  ").unwrap();
        assert_eq!(id.as_str(), "72");
    }

    #[test]
    fn reject_blank() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse(" \t\n").is_err());
    }

    #[test]
    fn display_and_debug() {
        let id = StationId::parse("abc").unwrap();
        assert_eq!(format!("{}", id), "abc");
        assert_eq!(format!("{:?}", id), "StationId(abc)");
    }

    #[test]
    fn has_ebikes() {
        let mut station = Station {
            id: StationId::parse("1").unwrap(),
            name: "W 52 St & 11 Ave".to_string(),
            location: Coordinate::new(40.7673, -73.9939).unwrap(),
            total_bikes_available: 4,
            ebikes_available: 0,
            is_offline: false,
        };
        assert!(!station.has_ebikes());

        station.ebikes_available = 2;
        assert!(station.has_ebikes());
    }
}
