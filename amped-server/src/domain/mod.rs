//! Domain types for bike-share station availability.
//!
//! All types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod coordinate;
mod error;
mod station;

pub use coordinate::Coordinate;
pub use error::DomainError;
pub use station::{Station, StationId};
