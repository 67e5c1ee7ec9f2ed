//! Device location providers.
//!
//! The session asks a [`LocationProvider`] for a fresh fix whenever it needs
//! one. Providers never cache and never retry.

mod error;
mod fixed;

use async_trait::async_trait;

use crate::domain::Position;

pub use error::LocationError;
pub use fixed::FixedLocation;

/// Source of current device positions.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Take a fresh fix.
    async fn current_position(&self) -> Result<Position, LocationError>;
}
