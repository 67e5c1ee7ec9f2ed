//! Remote persistence for journeys and events.
//!
//! Journeys and events are append-only documents. Every write is a single
//! attempt; failures are reported to the caller, never retried here.

mod error;
mod firestore;
mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{EventId, JourneyEvent, JourneyId, StationId};

pub use error::StoreError;
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::{MemoryStore, StoredEvent, StoredJourney};

/// The store operation a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOp {
    Create,
    Close,
    Append,
    Ping,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreOp::Create => "create journey",
            StoreOp::Close => "close journey",
            StoreOp::Append => "append event",
            StoreOp::Ping => "ping store",
        };
        f.write_str(s)
    }
}

/// Remote store for journey records.
///
/// Implementations stamp every record with their own creation time,
/// independent of the client-supplied event timestamp.
#[async_trait]
pub trait JourneyStore: Send + Sync {
    /// Create an open journey and return its id.
    async fn create_journey(
        &self,
        user_id: &str,
        start_station_id: Option<&StationId>,
    ) -> Result<JourneyId, StoreError>;

    /// Set the end station and end timestamp of a journey.
    async fn close_journey(
        &self,
        journey_id: &JourneyId,
        end_station_id: Option<&StationId>,
    ) -> Result<(), StoreError>;

    /// Append an event record and return its id.
    async fn append_event(&self, event: &JourneyEvent) -> Result<EventId, StoreError>;

    /// Write a throwaway document to check that writes get through.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Generate a document id on the client, as Firestore SDKs do.
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
