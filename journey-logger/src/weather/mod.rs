//! Ambient weather lookup.
//!
//! Weather is decoration on journey events, so a lookup never fails the
//! caller: an unconfigured or broken upstream yields
//! [`Weather::Unavailable`](crate::domain::Weather::Unavailable).

mod client;
mod error;

use async_trait::async_trait;

use crate::domain::Weather;

pub use client::{OpenWeatherClient, OpenWeatherConfig};
pub use error::WeatherError;

/// Source of current weather at a position.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn lookup(&self, lat: f64, lon: f64) -> Weather;
}
