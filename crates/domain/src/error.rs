//! Domain error types.

use thiserror::Error;

/// Errors surfaced by the geofence tracking core.
///
/// Pure computations never fail on well-formed input; everything here
/// originates at validation or at an I/O boundary.
#[derive(Debug, Error)]
pub enum GeofenceError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid geofence: {0}")]
    InvalidGeofence(String),

    #[error("Invalid location report: {0}")]
    InvalidReport(String),

    #[error("Spatial engine failure: {0}")]
    SpatialEngine(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl GeofenceError {
    /// Wraps a store error, keeping only its message.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        GeofenceError::Persistence(err.to_string())
    }
}

pub type GeofenceResult<T> = Result<T, GeofenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            GeofenceError::InvalidCoordinate("latitude 91".into()).to_string(),
            "Invalid coordinate: latitude 91"
        );
        assert_eq!(
            GeofenceError::persistence("connection reset").to_string(),
            "Persistence failure: connection reset"
        );
    }
}
