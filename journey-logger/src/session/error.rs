//! Session error types.

use crate::domain::JourneyId;
use crate::location::LocationError;
use crate::machine::InvalidTransition;
use crate::recorder::RecordError;
use crate::store::{StoreError, StoreOp};

/// Errors surfaced by session actions.
///
/// `Location` and `Persistence` come from collaborators and are never
/// retried. The rest are local validation failures raised before any remote
/// call is made.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No position could be acquired
    #[error(transparent)]
    Location(#[from] LocationError),

    /// A store write failed
    #[error("failed to {op}: {source}")]
    Persistence {
        op: StoreOp,
        #[source]
        source: StoreError,
    },

    /// A door action arrived out of order
    #[error("out of order: {0}")]
    OrderingViolation(#[from] InvalidTransition),

    /// No station is resolvable and none was picked
    #[error("no station selected: pick a station to start a journey")]
    NoStationSelected,

    /// The action needs an open journey
    #[error("no journey is open: start a journey first")]
    NoActiveJourney,

    /// A journey is already open in this session
    #[error("journey {0} is already open")]
    JourneyAlreadyOpen(JourneyId),

    /// The picked station is not in the registry
    #[error("unknown station: {0}")]
    UnknownStation(String),
}

impl SessionError {
    /// Returns true for failures raised before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionError::OrderingViolation(_)
                | SessionError::NoStationSelected
                | SessionError::NoActiveJourney
                | SessionError::JourneyAlreadyOpen(_)
                | SessionError::UnknownStation(_)
        )
    }
}

impl From<RecordError> for SessionError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Location(e) => SessionError::Location(e),
            RecordError::Persistence(source) => SessionError::Persistence {
                op: StoreOp::Append,
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Action, JourneyState};

    #[test]
    fn error_display() {
        let err = SessionError::Persistence {
            op: StoreOp::Close,
            source: StoreError::Unauthorized,
        };
        assert_eq!(
            err.to_string(),
            "failed to close journey: permission denied: check FIREBASE_ID_TOKEN and Firestore rules"
        );

        let err = SessionError::from(InvalidTransition {
            state: JourneyState::DoorsClosed,
            action: Action::DoorsClose,
        });
        assert_eq!(
            err.to_string(),
            "out of order: doors_close is not allowed while DoorsClosed"
        );
        assert!(err.is_validation());

        let err = SessionError::from(LocationError::PermissionDenied);
        assert_eq!(err.to_string(), "location permission denied");
        assert!(!err.is_validation());
    }

    #[test]
    fn record_errors_map_to_append() {
        let err = SessionError::from(RecordError::Persistence(StoreError::NotFound("x".into())));
        assert!(matches!(
            err,
            SessionError::Persistence {
                op: StoreOp::Append,
                ..
            }
        ));
    }
}
