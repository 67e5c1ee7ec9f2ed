use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use journey_logger::config::{Config, LocationSetting, StoreBackend};
use journey_logger::location::{FixedLocation, LocationProvider};
use journey_logger::session::SessionController;
use journey_logger::stations::StationRegistry;
use journey_logger::store::{FirestoreConfig, FirestoreStore, JourneyStore, MemoryStore};
use journey_logger::weather::{OpenWeatherClient, OpenWeatherConfig};
use journey_logger::web::{AppState, ConfigSummary, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("journey_logger=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    // Missing credentials are fatal before anything is served
    let config = Config::from_env().map_err(|e| e.to_string())?;

    let stations = StationRegistry::load(&config.stations_path).map_err(|e| e.to_string())?;
    info!(
        count = stations.len(),
        path = %config.stations_path.display(),
        "loaded stations"
    );

    let store: Arc<dyn JourneyStore> = match config.store {
        StoreBackend::Firestore => {
            let mut firestore =
                FirestoreConfig::new(&config.firebase.project_id, &config.firebase.api_key);
            match &config.firebase.id_token {
                Some(token) => firestore = firestore.with_id_token(token),
                None => warn!("FIREBASE_ID_TOKEN not set; writes will fail unless rules allow them"),
            }
            Arc::new(FirestoreStore::new(firestore).map_err(|e| e.to_string())?)
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; nothing is persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let weather = OpenWeatherClient::new(OpenWeatherConfig::new(config.openweather_api_key.clone()))
        .map_err(|e| e.to_string())?;
    if !weather.is_configured() {
        warn!("OPENWEATHER_API_KEY not set; events will carry no weather");
    }

    let (location, movable) = match config.location {
        LocationSetting::Disabled => (Arc::new(FixedLocation::denied()), None),
        LocationSetting::Fixed(position) => {
            let provider = Arc::new(match position {
                Some(position) => FixedLocation::new(position),
                None => FixedLocation::unset(),
            });
            (Arc::clone(&provider), Some(provider))
        }
    };
    let location: Arc<dyn LocationProvider> = location;

    let session = SessionController::new(
        config.user_id.clone(),
        stations,
        location,
        Arc::new(weather),
        store,
        config.action_guard,
    );

    let summary = ConfigSummary {
        project_id: config.firebase.project_id.clone(),
        weather_configured: config.openweather_api_key.is_some(),
    };
    let app = create_router(AppState::new(Arc::new(session), movable, summary));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;
    info!(
        addr = %config.bind_addr,
        user = %config.user_id,
        guard = ?config.action_guard,
        "journey logger listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {e}"))
}
