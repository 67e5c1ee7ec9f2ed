//! Station registry error types.

use std::path::PathBuf;

use crate::domain::StationId;

/// Errors that can occur when loading the station registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The station file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The station file is not a valid station list
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Two stations share an id
    #[error("duplicate station id: {0}")]
    DuplicateStation(StationId),

    /// The station list is empty
    #[error("station list is empty")]
    Empty,
}
