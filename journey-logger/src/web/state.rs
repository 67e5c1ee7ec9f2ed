//! Application state for the web layer.

use std::sync::Arc;

use crate::location::FixedLocation;
use crate::session::SessionController;

/// Non-secret settings shown for a configuration sanity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    /// Firebase project journeys are written to
    pub project_id: String,

    /// Whether an OpenWeather key is set
    pub weather_configured: bool,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The rider's session
    pub session: Arc<SessionController>,

    /// Movable position source, when location is enabled
    pub location: Option<Arc<FixedLocation>>,

    /// Settings reported by `GET /config`
    pub config: Arc<ConfigSummary>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        session: Arc<SessionController>,
        location: Option<Arc<FixedLocation>>,
        config: ConfigSummary,
    ) -> Self {
        Self {
            session,
            location,
            config: Arc::new(config),
        }
    }
}
