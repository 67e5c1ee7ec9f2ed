//! Device position samples.

use serde::{Deserialize, Serialize};

/// A single location fix.
///
/// Produced fresh for every sample and never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Reported horizontal accuracy in metres, if the provider has one
    pub accuracy_m: Option<f64>,
}

impl Position {
    /// Creates a position without an accuracy estimate.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            accuracy_m: None,
        }
    }

    /// Sets the accuracy estimate.
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }
}
