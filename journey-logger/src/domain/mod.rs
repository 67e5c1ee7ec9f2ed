//! Domain types for the journey logger.
//!
//! Stations, positions, journeys and the events recorded against them.
//! Identifier types enforce their invariants at construction time.

mod event;
mod journey;
mod position;
mod station;
mod weather;

pub use event::{EventId, EventType, JourneyEvent, RecentEvent};
pub use journey::{Journey, JourneyId};
pub use position::Position;
pub use station::{InvalidStationId, Station, StationId};
pub use weather::{UnavailableReason, Weather, WeatherData};
