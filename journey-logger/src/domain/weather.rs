//! Ambient weather attached to journey events.

use serde::{Deserialize, Serialize};

/// Current conditions at a position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherData {
    /// Air temperature in degrees Celsius
    #[serde(rename = "tempC")]
    pub temp_c: Option<f64>,
    /// Relative humidity in percent
    #[serde(rename = "humidityPct")]
    pub humidity_pct: Option<f64>,
    /// Rain volume over the last hour in millimetres (0 when not reported)
    #[serde(rename = "rain1hMm")]
    pub rain_1h_mm: f64,
    /// Short condition label (e.g. "Rain", "Clouds")
    pub condition: Option<String>,
}

/// Why no weather observation is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No weather API key is configured.
    NotConfigured,
    /// The weather service could not be reached or returned garbage.
    RequestFailed,
}

/// Result of a weather lookup.
///
/// Lookups never fail outright; a missing key or a broken upstream shows up
/// as `Unavailable`, which is still a valid event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "WeatherData")]
pub enum Weather {
    Observed(WeatherData),
    Unavailable(UnavailableReason),
}

impl Weather {
    /// Returns true if an observation is present.
    pub fn is_observed(&self) -> bool {
        matches!(self, Weather::Observed(_))
    }

    /// The record written to the store.
    ///
    /// `Unavailable` becomes the all-null record with zero rain.
    pub fn record(&self) -> WeatherData {
        match self {
            Weather::Observed(data) => data.clone(),
            Weather::Unavailable(_) => WeatherData::default(),
        }
    }
}

impl From<Weather> for WeatherData {
    fn from(weather: Weather) -> Self {
        weather.record()
    }
}
