//! Web layer for the journey logger.
//!
//! Exposes the session's user actions and read-only views as a JSON API.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, ConfigSummary};
