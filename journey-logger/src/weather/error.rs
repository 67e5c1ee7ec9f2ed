//! Weather client error types.

/// Errors from the OpenWeatherMap client.
///
/// These never leave the weather module's [`WeatherLookup`](super::WeatherLookup)
/// implementation; they are logged and turned into an unavailable reading.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API key rejected
    #[error("unauthorized: check OPENWEATHER_API_KEY")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
