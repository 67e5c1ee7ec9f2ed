//! Station registry loading and lookup.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::domain::{Station, StationId};

use super::error::RegistryError;

/// Ordered, immutable list of known stations.
///
/// Cheap to clone; clones share the same list.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Arc<Vec<Station>>,
}

impl StationRegistry {
    /// Build a registry from stations, keeping their order.
    ///
    /// Rejects empty lists and duplicate ids.
    pub fn new(stations: Vec<Station>) -> Result<Self, RegistryError> {
        if stations.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for station in &stations {
            if !seen.insert(&station.station_id) {
                return Err(RegistryError::DuplicateStation(station.station_id.clone()));
            }
        }

        Ok(Self {
            stations: Arc::new(stations),
        })
    }

    /// Parse a registry from a JSON array of stations.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let stations: Vec<Station> =
            serde_json::from_str(json).map_err(|e| RegistryError::Json {
                message: e.to_string(),
            })?;
        Self::new(stations)
    }

    /// Load a registry from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// All stations, in file order.
    pub fn all(&self) -> &[Station] {
        &self.stations
    }

    /// Look up a station by id.
    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.stations.iter().find(|s| &s.station_id == id)
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Always false for a constructed registry; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
