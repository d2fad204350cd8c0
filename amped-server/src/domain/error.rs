//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from feed and network errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Station identifier failed validation
    #[error("invalid station id: {0}")]
    InvalidStationId(&'static str),

    /// Latitude/longitude failed validation
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidStationId("must not be blank");
        assert_eq!(err.to_string(), "invalid station id: must not be blank");

        let err = DomainError::InvalidCoordinate("latitude out of range");
        assert_eq!(err.to_string(), "invalid coordinate: latitude out of range");
    }
}
