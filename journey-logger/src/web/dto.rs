//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Journey, Position, RecentEvent, Station};
use crate::geo::StationMatch;
use crate::machine::JourneyState;

/// All known stations, in registry order.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<Station>,
}

/// Request to pick a station by hand.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickStationRequest {
    /// Registry id of the station
    pub station_id: String,

    /// Also start a journey from it if none is open
    #[serde(default)]
    pub start: bool,
}

/// Result of picking a station.
#[derive(Debug, Serialize)]
pub struct PickStationResponse {
    pub station: Station,

    /// The journey started from the pick, if one was
    pub journey: Option<Journey>,
}

/// Optional new position to move to before refreshing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshLocationRequest {
    pub lat: f64,
    pub lon: f64,
    pub accuracy_m: Option<f64>,
}

impl RefreshLocationRequest {
    pub fn position(&self) -> Position {
        let position = Position::new(self.lat, self.lon);
        match self.accuracy_m {
            Some(accuracy) => position.with_accuracy(accuracy),
            None => position,
        }
    }
}

/// Result of a location refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshLocationResponse {
    pub position: Option<Position>,
    pub nearest_station: Option<StationMatch>,
}

/// A journey together with the session state after the action.
#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    pub journey: Journey,
    pub state: JourneyState,
}

/// Session state after a door action.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: JourneyState,
}

/// Recently recorded events, most recent first.
#[derive(Debug, Serialize)]
pub struct RecentEventsResponse {
    pub events: Vec<RecentEvent>,
}

/// Configuration sanity check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub project_id: String,
    pub weather_configured: bool,
    pub user_id: String,
}

/// Result of a store ping.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub ok: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
