//! Event assembly and persistence.
//!
//! The recorder turns "something happened" into a [`JourneyEvent`]: it takes
//! a fresh position fix, classifies it against the station registry, attaches
//! weather, stamps the wall clock, and appends the record to the store. Every
//! call does exactly one location read, one weather read and one store write.
//! Nothing is batched, deduplicated or retried.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{EventId, EventType, JourneyEvent, JourneyId, Position, RecentEvent, Station};
use crate::geo::{AMBIENT_RADIUS_M, StationMatch, nearest_to};
use crate::location::{LocationError, LocationProvider};
use crate::stations::StationRegistry;
use crate::store::{JourneyStore, StoreError};
use crate::weather::WeatherLookup;

/// How many recent events are kept for display.
pub const RECENT_EVENTS_CAP: usize = 20;

/// Most-recent-first projection of recorded events, bounded in size.
#[derive(Debug, Clone)]
pub struct RecentEvents {
    events: VecDeque<RecentEvent>,
    cap: usize,
}

impl RecentEvents {
    /// Create an empty projection holding at most `cap` events.
    pub fn new(cap: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Add an event at the front, dropping the oldest beyond the cap.
    pub fn push(&mut self, event: RecentEvent) {
        self.events.push_front(event);
        self.events.truncate(self.cap);
    }

    /// Events, most recent first.
    pub fn to_vec(&self) -> Vec<RecentEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for RecentEvents {
    fn default() -> Self {
        Self::new(RECENT_EVENTS_CAP)
    }
}

/// Errors from recording an event.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// No position could be acquired
    #[error(transparent)]
    Location(#[from] LocationError),

    /// The store refused the event
    #[error("failed to append event: {0}")]
    Persistence(#[source] StoreError),
}

/// An event that has been written to the store.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    /// Store-assigned id
    pub event_id: EventId,
    /// The record as written
    pub event: JourneyEvent,
    /// Position the event was recorded at
    pub position: Position,
    /// Station within the ambient radius, if any (not the manual fallback)
    pub ambient: Option<StationMatch>,
}

/// Assembles and persists journey events.
pub struct EventRecorder {
    location: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherLookup>,
    store: Arc<dyn JourneyStore>,
    stations: StationRegistry,
    recent: Mutex<RecentEvents>,
}

impl EventRecorder {
    /// Create a recorder over the given collaborators.
    pub fn new(
        location: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherLookup>,
        store: Arc<dyn JourneyStore>,
        stations: StationRegistry,
    ) -> Self {
        Self {
            location,
            weather,
            store,
            stations,
            recent: Mutex::new(RecentEvents::default()),
        }
    }

    /// Record one event against an open journey.
    ///
    /// `fallback` is the manually picked station, used when no station is
    /// within the ambient radius of the fix. The timestamp is taken after the
    /// location and weather lookups have completed.
    pub async fn record_event(
        &self,
        journey_id: &JourneyId,
        event_type: EventType,
        fallback: Option<&Station>,
    ) -> Result<RecordedEvent, RecordError> {
        let position = self.location.current_position().await?;

        let ambient = nearest_to(&position, self.stations.all(), AMBIENT_RADIUS_M);
        let station = ambient.as_ref().map(|m| &m.station).or(fallback);

        let weather = self.weather.lookup(position.lat, position.lon).await;

        let now = Utc::now();
        let event = JourneyEvent {
            journey_id: journey_id.clone(),
            event_type,
            timestamp_ms: now.timestamp_millis(),
            station_id: station.map(|s| s.station_id.clone()),
            line_id: station.map(|s| s.line_id.clone()),
            lat: position.lat,
            lon: position.lon,
            gps_accuracy_m: position.accuracy_m,
            weather,
        };

        debug!(
            %journey_id,
            %event_type,
            station = ?event.station_id,
            ambient = ambient.is_some(),
            weather = event.weather.is_observed(),
            "assembled event"
        );

        let event_id = self
            .store
            .append_event(&event)
            .await
            .map_err(RecordError::Persistence)?;

        self.recent
            .lock()
            .await
            .push(RecentEvent::from_event(&event, now));

        info!(%journey_id, %event_type, %event_id, "recorded event");

        Ok(RecordedEvent {
            event_id,
            event,
            position,
            ambient,
        })
    }

    /// Recently recorded events, most recent first.
    pub async fn recent_events(&self) -> Vec<RecentEvent> {
        self.recent.lock().await.to_vec()
    }

    /// The station registry events are matched against.
    pub fn stations(&self) -> &StationRegistry {
        &self.stations
    }
}
