//! Journey events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JourneyId, StationId, Weather};

/// Kind of a journey event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Start,
    DoorsOpen,
    DoorsClose,
    End,
}

impl EventType {
    /// Wire name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Start => "start",
            EventType::DoorsOpen => "doors_open",
            EventType::DoorsClose => "doors_close",
            EventType::End => "end",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-assigned identifier of an appended event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable record of something that happened during a journey.
///
/// `timestamp_ms` is the device wall clock at assembly time; the store adds
/// its own creation timestamp on write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyEvent {
    pub journey_id: JourneyId,
    pub event_type: EventType,
    pub timestamp_ms: i64,
    pub station_id: Option<StationId>,
    pub line_id: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "gpsAccuracyM")]
    pub gps_accuracy_m: Option<f64>,
    pub weather: Weather,
}

/// Display projection of a recorded event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEvent {
    pub event_type: EventType,
    pub recorded_at: DateTime<Utc>,
    pub station_id: Option<StationId>,
}

impl RecentEvent {
    /// Projects a recorded event for display.
    pub fn from_event(event: &JourneyEvent, recorded_at: DateTime<Utc>) -> Self {
        Self {
            event_type: event.event_type,
            recorded_at,
            station_id: event.station_id.clone(),
        }
    }
}
