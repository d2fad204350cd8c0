//! Observable map state shared with the presentation layer.

use std::sync::Arc;

use tokio::sync::watch;

use super::annotation::{Annotation, AnnotationKind, AnnotationSet};

/// The map state a UI renders: the latest annotation set plus whether the
/// loading indicator is showing.
///
/// Cloning is cheap; the annotation set is shared.
#[derive(Debug, Clone, Default)]
pub struct MapSnapshot {
    pub data: Arc<AnnotationSet>,
    pub is_loading: bool,
}

impl MapSnapshot {
    /// Annotations to draw, honouring the "show empty stations" setting.
    pub fn visible_annotations(&self, show_empty: bool) -> impl Iterator<Item = &Annotation> {
        self.data
            .annotations()
            .iter()
            .filter(move |a| show_empty || a.kind != AnnotationKind::Empty)
    }
}

/// Single-cell observable holding the current [`MapSnapshot`].
///
/// Writers replace the data set wholesale, so readers see either the old
/// or the new set, never a mix. The loading flag is toggled separately.
/// Observers can poll [`current`](Self::current) or wait for changes on a
/// [`subscribe`](Self::subscribe) receiver.
#[derive(Debug)]
pub struct AnnotationPublisher {
    tx: watch::Sender<MapSnapshot>,
}

impl AnnotationPublisher {
    /// Create a publisher holding an empty, not-loading snapshot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MapSnapshot::default());
        Self { tx }
    }

    /// Replace the published annotation set.
    pub fn publish(&self, set: AnnotationSet) {
        let set = Arc::new(set);
        self.tx.send_modify(|snapshot| snapshot.data = set);
    }

    /// Show or hide the loading indicator without touching the data.
    ///
    /// Observers are only notified when the flag actually changes.
    pub fn set_loading(&self, loading: bool) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.is_loading == loading {
                return false;
            }
            snapshot.is_loading = loading;
            true
        });
    }

    /// The current snapshot.
    pub fn current(&self) -> MapSnapshot {
        self.tx.borrow().clone()
    }

    /// Receive change notifications for every publish and loading toggle.
    pub fn subscribe(&self) -> watch::Receiver<MapSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for AnnotationPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::stations::categorize;
    use crate::stations::test_support::station;

    fn set_of(ebike_counts: &[u32]) -> AnnotationSet {
        let stations = ebike_counts
            .iter()
            .enumerate()
            .map(|(i, &n)| station(&i.to_string(), n))
            .collect();
        AnnotationSet::from_categories(categorize(stations), Utc::now())
    }

    #[test]
    fn starts_empty_and_idle() {
        let publisher = AnnotationPublisher::new();
        let snapshot = publisher.current();
        assert!(!snapshot.is_loading);
        assert!(snapshot.data.annotations().is_empty());
        assert!(snapshot.data.last_update_time().is_none());
    }

    #[test]
    fn publish_replaces_data_and_keeps_loading_flag() {
        let publisher = AnnotationPublisher::new();
        publisher.set_loading(true);
        publisher.publish(set_of(&[0, 3]));

        let snapshot = publisher.current();
        assert!(snapshot.is_loading);
        assert_eq!(snapshot.data.empty_count(), 1);
        assert_eq!(snapshot.data.ebike_only_count(), 1);

        publisher.publish(set_of(&[1, 1, 1]));
        let snapshot = publisher.current();
        assert_eq!(snapshot.data.empty_count(), 0);
        assert_eq!(snapshot.data.ebike_only_count(), 3);
        assert_eq!(snapshot.data.annotations().len(), 3);
    }

    #[test]
    fn set_loading_leaves_data_alone() {
        let publisher = AnnotationPublisher::new();
        publisher.publish(set_of(&[0]));
        let before = publisher.current().data;

        publisher.set_loading(true);
        publisher.set_loading(false);

        assert!(Arc::ptr_eq(&before, &publisher.current().data));
    }

    #[tokio::test]
    async fn subscribers_are_notified() {
        let publisher = AnnotationPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish(set_of(&[2]));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().data.ebike_only_count(), 1);

        publisher.set_loading(true);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_loading);
    }

    #[test]
    fn redundant_loading_toggle_does_not_notify() {
        let publisher = AnnotationPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.set_loading(false);
        assert!(!rx.has_changed().unwrap());

        publisher.set_loading(true);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        publisher.set_loading(true);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn visible_annotations_filters_empty() {
        let publisher = AnnotationPublisher::new();
        publisher.publish(set_of(&[0, 2, 0, 5]));
        let snapshot = publisher.current();

        assert_eq!(snapshot.visible_annotations(true).count(), 4);

        let shown: Vec<AnnotationKind> =
            snapshot.visible_annotations(false).map(|a| a.kind).collect();
        assert_eq!(shown, vec![AnnotationKind::EbikeOnly, AnnotationKind::EbikeOnly]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn readers_never_see_torn_snapshots() {
        let publisher = Arc::new(AnnotationPublisher::new());

        let writer = {
            let publisher = publisher.clone();
            tokio::spawn(async move {
                for round in 0..200u32 {
                    let counts: Vec<u32> = (0..(round % 7 + 1)).map(|i| (round + i) % 3).collect();
                    publisher.publish(set_of(&counts));
                    tokio::task::yield_now().await;
                }
            })
        };

        let reader = {
            let publisher = publisher.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    let snapshot = publisher.current();
                    let data = &snapshot.data;
                    let empty = data
                        .annotations()
                        .iter()
                        .filter(|a| a.kind == AnnotationKind::Empty)
                        .count();
                    assert_eq!(empty, data.empty_count());
                    assert_eq!(
                        data.annotations().len(),
                        data.empty_count() + data.ebike_only_count()
                    );
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }
}
