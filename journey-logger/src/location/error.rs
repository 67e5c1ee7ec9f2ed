//! Location error types.

/// Errors from acquiring a position fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The user has not granted location access
    #[error("location permission denied")]
    PermissionDenied,

    /// The provider could not produce a fix
    #[error("location fix unavailable: {0}")]
    FixUnavailable(String),
}
