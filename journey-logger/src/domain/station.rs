//! Station reference data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// Identifier of a station in the static registry (e.g. `KJ15`).
///
/// Station ids are non-empty and contain no whitespace. This type guarantees
/// that any `StationId` value is valid by construction.
///
/// # Examples
///
/// ```
/// use journey_logger::domain::StationId;
///
/// let id = StationId::parse("KJ15").unwrap();
/// assert_eq!(id.as_str(), "KJ15");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("KJ 15").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(InvalidStationId {
                reason: "must not contain whitespace",
            });
        }

        Ok(StationId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidStationId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StationId::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station a journey can start, stop or end at.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Unique station identifier
    pub station_id: StationId,
    /// Display name
    pub name: String,
    /// Line the station belongs to (e.g. `KJL`)
    pub line_id: String,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Radius of the station's geofence in metres
    #[serde(rename = "geofenceRadiusM")]
    pub geofence_radius_m: f64,
}

impl Station {
    /// Creates a station.
    pub fn new(
        station_id: StationId,
        name: impl Into<String>,
        line_id: impl Into<String>,
        lat: f64,
        lon: f64,
        geofence_radius_m: f64,
    ) -> Self {
        Self {
            station_id,
            name: name.into(),
            line_id: line_id.into(),
            lat,
            lon,
            geofence_radius_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StationId::parse("KJ15").is_ok());
        assert!(StationId::parse("A").is_ok());
        assert!(StationId::parse("kl-sentral").is_ok());
    }

    #[test]
    fn reject_empty() {
        let err = StationId::parse("").unwrap_err();
        assert_eq!(err.to_string(), "invalid station id: must not be empty");
    }

    #[test]
    fn reject_whitespace() {
        assert!(StationId::parse("KJ 15").is_err());
        assert!(StationId::parse(" KJ15").is_err());
        assert!(StationId::parse("KJ15\n").is_err());
    }

    #[test]
    fn display_and_debug() {
        let id = StationId::parse("KJ14").unwrap();
        assert_eq!(format!("{}", id), "KJ14");
        assert_eq!(format!("{:?}", id), "StationId(KJ14)");
    }

    #[test]
    fn deserialize_station() {
        let json = r#"{
            "stationId": "KJ15",
            "name": "KL Sentral",
            "lineId": "KJL",
            "lat": 3.1343,
            "lon": 101.6866,
            "geofenceRadiusM": 150
        }"#;

        let station: Station = serde_json::from_str(json).unwrap();
        assert_eq!(station.station_id.as_str(), "KJ15");
        assert_eq!(station.line_id, "KJL");
        assert_eq!(station.geofence_radius_m, 150.0);
    }

    #[test]
    fn deserialize_rejects_empty_id() {
        let json = r#"{
            "stationId": "",
            "name": "Nowhere",
            "lineId": "KJL",
            "lat": 0.0,
            "lon": 0.0,
            "geofenceRadiusM": 10
        }"#;

        assert!(serde_json::from_str::<Station>(json).is_err());
    }
}
