//! Published map state: annotations, counts and the loading indicator.

mod annotation;
mod snapshot;

pub use annotation::{Annotation, AnnotationKind, AnnotationSet};
pub use snapshot::{AnnotationPublisher, MapSnapshot};
