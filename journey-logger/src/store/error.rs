//! Store error types.

/// Errors from a journey store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed before a response arrived
    #[error("network transport problem: {0}; check connectivity to the store")]
    Http(#[from] reqwest::Error),

    /// Credentials rejected or the write was refused by security rules
    #[error("permission denied: check FIREBASE_ID_TOKEN and Firestore rules")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The document to update does not exist
    #[error("document not found: {0}")]
    NotFound(String),

    /// The store refused to take writes
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
