//! In-process journey store.
//!
//! Keeps documents in memory in write order. Used when no remote store is
//! configured and as the store double in tests, where individual operations
//! can be made to fail.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{EventId, JourneyEvent, JourneyId, StationId};

use super::{JourneyStore, StoreError, StoreOp, new_document_id};

/// A journey document as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJourney {
    pub journey_id: JourneyId,
    pub user_id: String,
    pub start_station_id: Option<StationId>,
    pub end_station_id: Option<StationId>,
    pub created_at: DateTime<Utc>,
    pub end_timestamp: Option<DateTime<Utc>>,
}

/// An event document as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
    pub event: JourneyEvent,
}

#[derive(Debug, Default)]
struct Inner {
    journeys: Vec<StoredJourney>,
    events: Vec<StoredEvent>,
    pings: Vec<DateTime<Utc>>,
    failing: HashSet<StoreOp>,
}

/// Journey store that lives in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    latency: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency` before it takes effect.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent `op` fail until [`MemoryStore::recover`] is called.
    pub async fn fail(&self, op: StoreOp) {
        self.inner.write().await.failing.insert(op);
    }

    /// Stop failing `op`.
    pub async fn recover(&self, op: StoreOp) {
        self.inner.write().await.failing.remove(&op);
    }

    /// All journeys, in creation order.
    pub async fn journeys(&self) -> Vec<StoredJourney> {
        self.inner.read().await.journeys.clone()
    }

    /// All events, in append order.
    pub async fn events(&self) -> Vec<StoredEvent> {
        self.inner.read().await.events.clone()
    }

    /// Events for one journey, in append order.
    pub async fn events_for(&self, journey_id: &JourneyId) -> Vec<StoredEvent> {
        let guard = self.inner.read().await;
        guard
            .events
            .iter()
            .filter(|e| &e.event.journey_id == journey_id)
            .cloned()
            .collect()
    }

    /// Times of successful pings, oldest first.
    pub async fn pings(&self) -> Vec<DateTime<Utc>> {
        self.inner.read().await.pings.clone()
    }

    async fn settle(&self, op: StoreOp) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.inner.read().await.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op} is failing")));
        }
        Ok(())
    }
}

#[async_trait]
impl JourneyStore for MemoryStore {
    async fn create_journey(
        &self,
        user_id: &str,
        start_station_id: Option<&StationId>,
    ) -> Result<JourneyId, StoreError> {
        self.settle(StoreOp::Create).await?;

        let journey_id = JourneyId::new(new_document_id());
        let mut guard = self.inner.write().await;
        guard.journeys.push(StoredJourney {
            journey_id: journey_id.clone(),
            user_id: user_id.to_string(),
            start_station_id: start_station_id.cloned(),
            end_station_id: None,
            created_at: Utc::now(),
            end_timestamp: None,
        });

        Ok(journey_id)
    }

    async fn close_journey(
        &self,
        journey_id: &JourneyId,
        end_station_id: Option<&StationId>,
    ) -> Result<(), StoreError> {
        self.settle(StoreOp::Close).await?;

        let mut guard = self.inner.write().await;
        let journey = guard
            .journeys
            .iter_mut()
            .find(|j| &j.journey_id == journey_id)
            .ok_or_else(|| StoreError::NotFound(format!("journeys/{journey_id}")))?;

        journey.end_station_id = end_station_id.cloned();
        journey.end_timestamp = Some(Utc::now());
        Ok(())
    }

    async fn append_event(&self, event: &JourneyEvent) -> Result<EventId, StoreError> {
        self.settle(StoreOp::Append).await?;

        let event_id = EventId::new(new_document_id());
        let mut guard = self.inner.write().await;
        guard.events.push(StoredEvent {
            event_id: event_id.clone(),
            created_at: Utc::now(),
            event: event.clone(),
        });

        Ok(event_id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.settle(StoreOp::Ping).await?;
        self.inner.write().await.pings.push(Utc::now());
        Ok(())
    }
}
