//! Location provider backed by configuration.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::Position;

use super::{LocationError, LocationProvider};

/// A provider that reports a configured position.
///
/// Used on hosts without a GNSS receiver. The position can be moved at
/// runtime, which is how the HTTP surface simulates the rider travelling.
#[derive(Debug)]
pub struct FixedLocation {
    position: RwLock<Option<Position>>,
    permitted: bool,
}

impl FixedLocation {
    /// A provider that always reports `position`.
    pub fn new(position: Position) -> Self {
        Self {
            position: RwLock::new(Some(position)),
            permitted: true,
        }
    }

    /// A provider with no fix yet.
    pub fn unset() -> Self {
        Self {
            position: RwLock::new(None),
            permitted: true,
        }
    }

    /// A provider whose permission has been refused.
    pub fn denied() -> Self {
        Self {
            position: RwLock::new(None),
            permitted: false,
        }
    }

    /// Move the reported position.
    pub async fn set(&self, position: Position) {
        *self.position.write().await = Some(position);
    }

    /// Drop the fix, as when the receiver loses signal.
    pub async fn clear(&self) {
        *self.position.write().await = None;
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Position, LocationError> {
        if !self.permitted {
            return Err(LocationError::PermissionDenied);
        }

        let position = *self.position.read().await;
        position.ok_or_else(|| LocationError::FixUnavailable("no position configured".to_string()))
    }
}
