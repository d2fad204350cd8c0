//! Map annotations derived from a categorized station snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Coordinate, Station, StationId};
use crate::stations::StationCategories;

/// Which map category a station falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// No e-bikes available.
    Empty,
    /// At least one e-bike available.
    EbikeOnly,
}

/// A map-displayable projection of one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub coordinate: Coordinate,
    pub kind: AnnotationKind,
    pub station: Arc<Station>,
}

impl Annotation {
    fn new(station: Arc<Station>, kind: AnnotationKind) -> Self {
        Self {
            coordinate: station.location,
            kind,
            station,
        }
    }

    pub fn id(&self) -> &StationId {
        &self.station.id
    }
}

/// Everything one completed refresh cycle produces for the map.
///
/// Annotations, counts and the timestamp are built together and can only be
/// replaced together, so a reader never sees counts from one cycle with
/// annotations from another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
    ebike_only_count: usize,
    empty_count: usize,
    last_update_time: Option<DateTime<Utc>>,
}

impl AnnotationSet {
    /// Build the annotation set for a categorized snapshot.
    ///
    /// Empty-dock annotations come first, then e-bike annotations, each in
    /// feed order.
    pub fn from_categories(categories: StationCategories, updated_at: DateTime<Utc>) -> Self {
        let empty_count = categories.empty_stations.len();
        let ebike_only_count = categories.ebike_only_stations.len();

        let annotations = categories
            .empty_stations
            .into_iter()
            .map(|s| Annotation::new(s, AnnotationKind::Empty))
            .chain(
                categories
                    .ebike_only_stations
                    .into_iter()
                    .map(|s| Annotation::new(s, AnnotationKind::EbikeOnly)),
            )
            .collect();

        Self {
            annotations,
            ebike_only_count,
            empty_count,
            last_update_time: Some(updated_at),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn ebike_only_count(&self) -> usize {
        self.ebike_only_count
    }

    pub fn empty_count(&self) -> usize {
        self.empty_count
    }

    /// When this set was published; `None` before the first successful refresh.
    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        self.last_update_time
    }

    /// Look up a station annotation by id.
    pub fn find(&self, id: &StationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::categorize;
    use crate::stations::test_support::station;

    #[test]
    fn builds_counts_and_order() {
        let now = Utc::now();
        let set = AnnotationSet::from_categories(
            categorize(vec![station("1", 0), station("2", 3), station("3", 0)]),
            now,
        );

        assert_eq!(set.empty_count(), 2);
        assert_eq!(set.ebike_only_count(), 1);
        assert_eq!(set.last_update_time(), Some(now));

        let order: Vec<(&str, AnnotationKind)> = set
            .annotations()
            .iter()
            .map(|a| (a.id().as_str(), a.kind))
            .collect();
        assert_eq!(
            order,
            vec![
                ("1", AnnotationKind::Empty),
                ("3", AnnotationKind::Empty),
                ("2", AnnotationKind::EbikeOnly),
            ]
        );
    }

    #[test]
    fn annotation_uses_station_location() {
        let set = AnnotationSet::from_categories(categorize(vec![station("9", 1)]), Utc::now());
        let annotation = &set.annotations()[0];
        assert_eq!(annotation.coordinate, annotation.station.location);
    }

    #[test]
    fn default_is_unpublished() {
        let set = AnnotationSet::default();
        assert!(set.annotations().is_empty());
        assert_eq!(set.empty_count(), 0);
        assert_eq!(set.ebike_only_count(), 0);
        assert!(set.last_update_time().is_none());
    }

    #[test]
    fn find_by_id() {
        let set = AnnotationSet::from_categories(
            categorize(vec![station("1", 0), station("2", 3)]),
            Utc::now(),
        );
        let id = StationId::parse("2").unwrap();
        assert_eq!(set.find(&id).map(|a| a.kind), Some(AnnotationKind::EbikeOnly));

        let missing = StationId::parse("404").unwrap();
        assert!(set.find(&missing).is_none());
    }
}
