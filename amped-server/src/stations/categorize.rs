//! Partitioning of a station snapshot by e-bike availability.

use std::sync::Arc;

use crate::domain::Station;

/// A station snapshot split by e-bike availability.
///
/// Every input station lands in exactly one of the two lists. Input order is
/// preserved within each list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationCategories {
    /// Stations with no e-bikes available.
    pub empty_stations: Vec<Arc<Station>>,
    /// Stations with at least one e-bike available.
    pub ebike_only_stations: Vec<Arc<Station>>,
}

impl StationCategories {
    /// Total number of categorized stations.
    pub fn len(&self) -> usize {
        self.empty_stations.len() + self.ebike_only_stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition stations into empty and e-bike-only sets.
pub fn categorize(stations: Vec<Station>) -> StationCategories {
    let mut categories = StationCategories::default();
    for station in stations {
        let station = Arc::new(station);
        if station.has_ebikes() {
            categories.ebike_only_stations.push(station);
        } else {
            categories.empty_stations.push(station);
        }
    }
    categories
}


#[cfg(test)]
mod tests {
    use super::test_support::station;
    use super::*;

    fn ids(list: &[Arc<Station>]) -> Vec<&str> {
        list.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn splits_by_ebike_count() {
        let categories = categorize(vec![station("1", 0), station("2", 3)]);

        assert_eq!(ids(&categories.empty_stations), vec!["1"]);
        assert_eq!(ids(&categories.ebike_only_stations), vec!["2"]);
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn preserves_input_order() {
        let categories = categorize(vec![
            station("a", 1),
            station("b", 0),
            station("c", 5),
            station("d", 0),
            station("e", 2),
        ]);

        assert_eq!(ids(&categories.empty_stations), vec!["b", "d"]);
        assert_eq!(ids(&categories.ebike_only_stations), vec!["a", "c", "e"]);
    }

    #[test]
    fn empty_input() {
        let categories = categorize(Vec::new());
        assert!(categories.is_empty());
        assert!(categories.empty_stations.is_empty());
        assert!(categories.ebike_only_stations.is_empty());
    }

    #[test]
    fn offline_stations_are_still_categorized() {
        let mut offline = station("x", 4);
        offline.is_offline = true;

        let categories = categorize(vec![offline]);
        assert_eq!(ids(&categories.ebike_only_stations), vec!["x"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::test_support::station;
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every station appears in exactly one category.
        #[test]
        fn total_partition(counts in proptest::collection::vec(0u32..6, 0..64)) {
            let input: Vec<Station> = counts
                .iter()
                .enumerate()
                .map(|(i, &n)| station(&i.to_string(), n))
                .collect();
            let n = input.len();

            let categories = categorize(input);

            let total = categories.empty_stations.len() + categories.ebike_only_stations.len();
            prop_assert_eq!(total, n);
            prop_assert!(categories.empty_stations.iter().all(|s| s.ebikes_available == 0));
            prop_assert!(categories.ebike_only_stations.iter().all(|s| s.ebikes_available > 0));

            let expected_empty = counts.iter().filter(|&&c| c == 0).count();
            prop_assert_eq!(categories.empty_stations.len(), expected_empty);
        }
    }
}
