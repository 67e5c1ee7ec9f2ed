//! Journey records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StationId;

/// Store-assigned identifier of a journey.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JourneyId(String);

impl JourneyId {
    /// Wraps a store-assigned id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JourneyId({})", self.0)
    }
}

impl fmt::Display for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A journey from one station to another.
///
/// Created when the rider starts a journey and mutated exactly once when it
/// ends. The end fields are `None` while the journey is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub journey_id: JourneyId,
    pub user_id: String,
    pub start_station_id: Option<StationId>,
    pub start_time: DateTime<Utc>,
    pub end_station_id: Option<StationId>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Journey {
    /// Creates an open journey.
    pub fn open(
        journey_id: JourneyId,
        user_id: impl Into<String>,
        start_station_id: Option<StationId>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            journey_id,
            user_id: user_id.into(),
            start_station_id,
            start_time,
            end_station_id: None,
            end_time: None,
        }
    }

    /// Returns true until the journey has been closed.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Closes the journey, setting the end fields.
    ///
    /// Returns `false` and leaves the journey untouched if it was already
    /// closed.
    pub fn close(&mut self, end_station_id: Option<StationId>, end_time: DateTime<Utc>) -> bool {
        if !self.is_open() {
            return false;
        }
        self.end_station_id = end_station_id;
        self.end_time = Some(end_time);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey() -> Journey {
        Journey::open(
            JourneyId::new("j1"),
            "rider",
            Some(StationId::parse("KJ15").unwrap()),
            Utc::now(),
        )
    }

    #[test]
    fn new_journey_is_open() {
        let j = journey();
        assert!(j.is_open());
        assert!(j.end_station_id.is_none());
    }

    #[test]
    fn close_only_once() {
        let mut j = journey();
        let end = StationId::parse("KJ10").unwrap();

        assert!(j.close(Some(end.clone()), Utc::now()));
        assert!(!j.is_open());
        assert_eq!(j.end_station_id, Some(end));

        let first_end = j.end_time;
        assert!(!j.close(None, Utc::now()));
        assert_eq!(j.end_time, first_end);
        assert!(j.end_station_id.is_some());
    }

    #[test]
    fn journey_id_display() {
        let id = JourneyId::new("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(format!("{:?}", id), "JourneyId(abc)");
    }
}
