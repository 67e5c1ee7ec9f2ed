//! Journey door/transit state machine.
//!
//! Tracks where a single journey is in its lifecycle and rejects actions
//! that arrive out of order. The machine knows nothing about I/O: callers
//! check a transition, perform the remote write, then apply it.

use std::fmt;

use serde::Serialize;

use crate::domain::EventType;

/// Door/transit state of the session's journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum JourneyState {
    /// No journey is open.
    #[default]
    Idle,
    DoorsClosed,
    DoorsOpen,
}

impl JourneyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JourneyState::Idle => "Idle",
            JourneyState::DoorsClosed => "DoorsClosed",
            JourneyState::DoorsOpen => "DoorsOpen",
        }
    }
}

impl fmt::Display for JourneyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user action that moves the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    DoorsOpen,
    DoorsClose,
    End,
}

impl Action {
    /// The event recorded for this action.
    pub fn event_type(&self) -> EventType {
        match self {
            Action::Start => EventType::Start,
            Action::DoorsOpen => EventType::DoorsOpen,
            Action::DoorsClose => EventType::DoorsClose,
            Action::End => EventType::End,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_type().as_str())
    }
}

/// An action that is not legal from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{action} is not allowed while {state}")]
pub struct InvalidTransition {
    pub state: JourneyState,
    pub action: Action,
}

/// The state machine for one session.
#[derive(Debug, Clone, Default)]
pub struct JourneyMachine {
    state: JourneyState,
}

impl JourneyMachine {
    /// Create a machine in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> JourneyState {
        self.state
    }

    /// Validate `action` without changing state.
    ///
    /// Returns the state the machine would move to.
    pub fn check(&self, action: Action) -> Result<JourneyState, InvalidTransition> {
        use JourneyState::*;

        let next = match (self.state, action) {
            (Idle, Action::Start) => DoorsClosed,
            (DoorsClosed, Action::DoorsOpen) => DoorsOpen,
            (DoorsOpen, Action::DoorsClose) => DoorsClosed,
            (DoorsClosed | DoorsOpen, Action::End) => Idle,
            (state, action) => return Err(InvalidTransition { state, action }),
        };

        Ok(next)
    }

    /// Validate and commit `action`.
    ///
    /// A rejected action leaves the state untouched.
    pub fn apply(&mut self, action: Action) -> Result<JourneyState, InvalidTransition> {
        let next = self.check(action)?;
        self.state = next;
        Ok(next)
    }
}
