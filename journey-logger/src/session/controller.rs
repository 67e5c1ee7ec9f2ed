//! The session controller.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::domain::{EventType, Journey, JourneyId, Position, RecentEvent, Station, StationId};
use crate::geo::{AMBIENT_RADIUS_M, StationMatch, nearest_to};
use crate::location::LocationProvider;
use crate::machine::{Action, JourneyMachine, JourneyState};
use crate::recorder::{EventRecorder, RecordedEvent};
use crate::stations::StationRegistry;
use crate::store::{JourneyStore, StoreOp};
use crate::weather::WeatherLookup;

use super::error::SessionError;

/// How concurrent user actions are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionGuard {
    /// One action at a time; later triggers wait for earlier ones.
    #[default]
    Serialized,
    /// Actions interleave at their suspension points. Two quick triggers of
    /// the same action can both pass validation and both write.
    Unguarded,
}

impl FromStr for ActionGuard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serialized" => Ok(ActionGuard::Serialized),
            "unguarded" => Ok(ActionGuard::Unguarded),
            other => Err(format!("expected 'serialized' or 'unguarded', got '{other}'")),
        }
    }
}

/// Mutable session state. Never held across a collaborator call.
#[derive(Debug, Default)]
struct SessionState {
    machine: JourneyMachine,
    journey: Option<Journey>,
    ambient: Option<StationMatch>,
    manual: Option<Station>,
    last_position: Option<Position>,
}

impl SessionState {
    /// Ambient match first, then the manual pick.
    fn current_station(&self) -> Option<&Station> {
        self.ambient
            .as_ref()
            .map(|m| &m.station)
            .or(self.manual.as_ref())
    }

    /// Open journey id, or `NoActiveJourney`.
    fn open_journey_id(&self) -> Result<JourneyId, SessionError> {
        self.journey
            .as_ref()
            .map(|j| j.journey_id.clone())
            .ok_or(SessionError::NoActiveJourney)
    }

    /// Commit a transition whose remote write has already succeeded.
    fn commit(&mut self, action: Action) {
        if let Err(e) = self.machine.apply(action) {
            // Only reachable when unguarded actions interleave.
            warn!(error = %e, "state moved while {action} was in flight");
        }
    }

    fn note_recorded(&mut self, recorded: &RecordedEvent) {
        self.last_position = Some(recorded.position);
        if let Some(ambient) = &recorded.ambient {
            self.ambient = Some(ambient.clone());
        }
    }
}

/// Read-only view of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: JourneyState,
    pub journey: Option<Journey>,
    pub nearest_station: Option<StationMatch>,
    pub manual_station: Option<Station>,
    pub last_position: Option<Position>,
    pub recent_events: Vec<RecentEvent>,
}

/// Orchestrates one rider's journey logging.
pub struct SessionController {
    user_id: String,
    stations: StationRegistry,
    location: Arc<dyn LocationProvider>,
    store: Arc<dyn JourneyStore>,
    recorder: EventRecorder,
    state: Mutex<SessionState>,
    guard: Option<Mutex<()>>,
}

impl SessionController {
    /// Create a controller for `user_id` over the given collaborators.
    pub fn new(
        user_id: impl Into<String>,
        stations: StationRegistry,
        location: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherLookup>,
        store: Arc<dyn JourneyStore>,
        guard: ActionGuard,
    ) -> Self {
        let recorder = EventRecorder::new(
            Arc::clone(&location),
            weather,
            Arc::clone(&store),
            stations.clone(),
        );

        Self {
            user_id: user_id.into(),
            stations,
            location,
            store,
            recorder,
            state: Mutex::new(SessionState::default()),
            guard: match guard {
                ActionGuard::Serialized => Some(Mutex::new(())),
                ActionGuard::Unguarded => None,
            },
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn stations(&self) -> &StationRegistry {
        &self.stations
    }

    async fn acquire(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.guard {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    fn find_station(&self, station_id: &str) -> Result<Station, SessionError> {
        StationId::parse(station_id)
            .ok()
            .and_then(|id| self.stations.get(&id).cloned())
            .ok_or_else(|| SessionError::UnknownStation(station_id.to_string()))
    }

    /// Take a fresh fix and update the ambient nearest station.
    ///
    /// A successful ambient match replaces any manual pick.
    pub async fn refresh_location(&self) -> Result<Option<StationMatch>, SessionError> {
        let _permit = self.acquire().await;

        let position = self.location.current_position().await?;
        let ambient = nearest_to(&position, self.stations.all(), AMBIENT_RADIUS_M);

        let mut state = self.state.lock().await;
        state.last_position = Some(position);
        state.ambient = ambient.clone();
        if ambient.is_some() {
            state.manual = None;
        }

        Ok(ambient)
    }

    /// Select a station by hand.
    pub async fn pick_station(&self, station_id: &str) -> Result<Station, SessionError> {
        let station = self.find_station(station_id)?;
        let _permit = self.acquire().await;

        self.state.lock().await.manual = Some(station.clone());
        Ok(station)
    }

    /// Select a station by hand and start a journey from it if none is open.
    ///
    /// Returns the new journey, or `None` if one was already open.
    pub async fn pick_and_start(&self, station_id: &str) -> Result<Option<Journey>, SessionError> {
        let station = self.find_station(station_id)?;
        let _permit = self.acquire().await;

        {
            let mut state = self.state.lock().await;
            state.manual = Some(station.clone());
            if state.journey.is_some() {
                return Ok(None);
            }
        }

        self.start_from(Some(station)).await.map(Some)
    }

    /// Start a journey at the current station.
    ///
    /// Blocked without any remote call if no station is resolvable and none
    /// was picked. Once the store has created the journey it is open, even if
    /// recording the `start` event then fails.
    pub async fn start_journey(&self) -> Result<Journey, SessionError> {
        let _permit = self.acquire().await;
        self.start_from(None).await
    }

    /// Start from `picked`, or from the current station if `None`.
    async fn start_from(&self, picked: Option<Station>) -> Result<Journey, SessionError> {
        let (station, manual) = {
            let state = self.state.lock().await;
            if let Some(journey) = &state.journey {
                return Err(SessionError::JourneyAlreadyOpen(journey.journey_id.clone()));
            }
            state.machine.check(Action::Start)?;
            let station = picked
                .or_else(|| state.current_station().cloned())
                .ok_or(SessionError::NoStationSelected)?;
            (station, state.manual.clone())
        };

        let journey_id = self
            .store
            .create_journey(&self.user_id, Some(&station.station_id))
            .await
            .map_err(|source| {
                warn!(error = %source, "create journey failed");
                SessionError::Persistence {
                    op: StoreOp::Create,
                    source,
                }
            })?;

        let journey = Journey::open(
            journey_id.clone(),
            self.user_id.clone(),
            Some(station.station_id.clone()),
            Utc::now(),
        );

        {
            let mut state = self.state.lock().await;
            state.journey = Some(journey.clone());
            state.commit(Action::Start);
        }
        info!(%journey_id, station = %station.station_id, "journey started");

        let recorded = self
            .recorder
            .record_event(&journey_id, EventType::Start, manual.as_ref())
            .await
            .inspect_err(|e| warn!(%journey_id, error = %e, "start event not recorded"))?;
        self.state.lock().await.note_recorded(&recorded);

        Ok(journey)
    }

    /// Record that the doors opened.
    pub async fn open_doors(&self) -> Result<JourneyState, SessionError> {
        self.door_action(Action::DoorsOpen).await
    }

    /// Record that the doors closed.
    pub async fn close_doors(&self) -> Result<JourneyState, SessionError> {
        self.door_action(Action::DoorsClose).await
    }

    /// Door actions are ordering-checked first, so from `Idle` they fail
    /// with `OrderingViolation` like any other out-of-order tap.
    async fn door_action(&self, action: Action) -> Result<JourneyState, SessionError> {
        let _permit = self.acquire().await;

        let (journey_id, manual) = {
            let state = self.state.lock().await;
            state.machine.check(action)?;
            let journey_id = state.open_journey_id()?;
            (journey_id, state.manual.clone())
        };

        let recorded = self
            .recorder
            .record_event(&journey_id, action.event_type(), manual.as_ref())
            .await?;

        let mut state = self.state.lock().await;
        state.commit(action);
        state.note_recorded(&recorded);
        Ok(state.machine.state())
    }

    /// End the open journey.
    ///
    /// The `end` event is recorded first; if that fails the journey stays
    /// open. The journey is then closed in the store and cleared locally
    /// whether or not the close succeeds, so a close failure leaves the event
    /// log ahead of the journey record. That failure is still returned.
    pub async fn end_journey(&self) -> Result<Journey, SessionError> {
        let _permit = self.acquire().await;

        let (journey_id, manual) = {
            let state = self.state.lock().await;
            let journey_id = state.open_journey_id()?;
            state.machine.check(Action::End)?;
            (journey_id, state.manual.clone())
        };

        let recorded = self
            .recorder
            .record_event(&journey_id, EventType::End, manual.as_ref())
            .await?;

        let end_station = {
            let mut state = self.state.lock().await;
            state.note_recorded(&recorded);
            state.current_station().map(|s| s.station_id.clone())
        };

        let closed = self
            .store
            .close_journey(&journey_id, end_station.as_ref())
            .await;

        let ended = {
            let mut state = self.state.lock().await;
            let ended = state.journey.take_if(|j| j.journey_id == journey_id);
            if ended.is_some() {
                state.commit(Action::End);
            }
            ended
        };

        match closed {
            Ok(()) => {
                let mut journey = ended.ok_or(SessionError::NoActiveJourney)?;
                journey.close(end_station, Utc::now());
                info!(%journey_id, "journey ended");
                Ok(journey)
            }
            Err(source) => {
                warn!(%journey_id, error = %source, "journey cleared locally but not closed in store");
                Err(SessionError::Persistence {
                    op: StoreOp::Close,
                    source,
                })
            }
        }
    }

    /// Write a throwaway document to check the store accepts writes.
    pub async fn ping_store(&self) -> Result<(), SessionError> {
        self.store.ping().await.map_err(|source| {
            warn!(error = %source, "store ping failed");
            SessionError::Persistence {
                op: StoreOp::Ping,
                source,
            }
        })?;
        info!("store ping succeeded");
        Ok(())
    }

    /// The open journey, if any.
    pub async fn journey(&self) -> Option<Journey> {
        self.state.lock().await.journey.clone()
    }

    /// Current door/transit state.
    pub async fn state(&self) -> JourneyState {
        self.state.lock().await.machine.state()
    }

    /// Recently recorded events, most recent first.
    pub async fn recent_events(&self) -> Vec<RecentEvent> {
        self.recorder.recent_events().await
    }

    /// Everything the session currently knows.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let recent_events = self.recorder.recent_events().await;
        let state = self.state.lock().await;

        SessionSnapshot {
            state: state.machine.state(),
            journey: state.journey.clone(),
            nearest_station: state.ambient.clone(),
            manual_station: state.manual.clone(),
            last_position: state.last_position,
            recent_events,
        }
    }
}
