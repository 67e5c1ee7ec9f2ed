//! HTTP route handlers.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{debug, warn};

use crate::session::SessionError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations))
        .route("/session", get(session_snapshot))
        .route("/events/recent", get(recent_events))
        .route("/config", get(config_summary))
        .route("/store/ping", post(ping_store))
        .route("/location/refresh", post(refresh_location))
        .route("/stations/pick", post(pick_station))
        .route("/journey/start", post(start_journey))
        .route("/journey/doors/open", post(open_doors))
        .route("/journey/doors/close", post(close_doors))
        .route("/journey/end", post(end_journey))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    Json(StationsResponse {
        stations: state.session.stations().all().to_vec(),
    })
}

async fn session_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.snapshot().await)
}

async fn recent_events(State(state): State<AppState>) -> Json<RecentEventsResponse> {
    Json(RecentEventsResponse {
        events: state.session.recent_events().await,
    })
}

async fn config_summary(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        project_id: state.config.project_id.clone(),
        weather_configured: state.config.weather_configured,
        user_id: state.session.user_id().to_string(),
    })
}

/// Check that the store accepts writes.
async fn ping_store(State(state): State<AppState>) -> Result<Json<PingResponse>, AppError> {
    state.session.ping_store().await?;
    Ok(Json(PingResponse { ok: true }))
}

/// Take a fresh fix, optionally moving the simulated position first.
///
/// An empty body only refreshes. A non-empty body must be a valid move.
async fn refresh_location(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RefreshLocationResponse>, AppError> {
    if !body.is_empty() {
        let req: RefreshLocationRequest =
            serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
                message: format!("invalid location: {e}"),
            })?;
        let location = state.location.as_ref().ok_or_else(|| AppError::BadRequest {
            message: "location is disabled".to_string(),
        })?;
        location.set(req.position()).await;
    }

    let nearest_station = state.session.refresh_location().await?;
    let position = state.session.snapshot().await.last_position;

    Ok(Json(RefreshLocationResponse {
        position,
        nearest_station,
    }))
}

/// Pick a station by hand, optionally starting a journey from it.
async fn pick_station(
    State(state): State<AppState>,
    Json(req): Json<PickStationRequest>,
) -> Result<Json<PickStationResponse>, AppError> {
    if !req.start {
        let station = state.session.pick_station(&req.station_id).await?;
        return Ok(Json(PickStationResponse {
            station,
            journey: None,
        }));
    }

    let journey = state.session.pick_and_start(&req.station_id).await?;
    let station = state
        .session
        .stations()
        .all()
        .iter()
        .find(|s| s.station_id.as_str() == req.station_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown station: {}", req.station_id),
        })?;

    Ok(Json(PickStationResponse { station, journey }))
}

async fn start_journey(State(state): State<AppState>) -> Result<Json<JourneyResponse>, AppError> {
    let journey = state.session.start_journey().await?;
    Ok(Json(JourneyResponse {
        journey,
        state: state.session.state().await,
    }))
}

async fn open_doors(State(state): State<AppState>) -> Result<Json<StateResponse>, AppError> {
    let state = state.session.open_doors().await?;
    Ok(Json(StateResponse { state }))
}

async fn close_doors(State(state): State<AppState>) -> Result<Json<StateResponse>, AppError> {
    let state = state.session.close_doors().await?;
    Ok(Json(StateResponse { state }))
}

async fn end_journey(State(state): State<AppState>) -> Result<Json<JourneyResponse>, AppError> {
    let journey = state.session.end_journey().await?;
    Ok(Json(JourneyResponse {
        journey,
        state: state.session.state().await,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    /// The position source failed
    LocationUnavailable { message: String },
    /// The remote store failed
    BadGateway { message: String },
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        let message = e.to_string();
        match e {
            SessionError::Location(_) => AppError::LocationUnavailable { message },
            SessionError::Persistence { .. } => AppError::BadGateway { message },
            SessionError::NoStationSelected => AppError::BadRequest { message },
            SessionError::UnknownStation(_) => AppError::NotFound { message },
            SessionError::OrderingViolation(_)
            | SessionError::NoActiveJourney
            | SessionError::JourneyAlreadyOpen(_) => AppError::Conflict { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::LocationUnavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
        };

        if status.is_server_error() {
            warn!(%status, "{message}");
        } else {
            debug!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
