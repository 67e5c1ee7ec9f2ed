//! OpenWeatherMap current-conditions client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{UnavailableReason, Weather, WeatherData};

use super::WeatherLookup;
use super::error::WeatherError;

/// Default base URL for the OpenWeatherMap API.
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Configuration for the OpenWeatherMap client.
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    /// API key; lookups report `NotConfigured` without one
    pub api_key: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenWeatherConfig {
    /// Create a config. Blank keys count as missing.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Subset of the `/data/2.5/weather` response we use.
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: Option<MainBlock>,
    rain: Option<RainBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: Option<String>,
}

impl From<CurrentResponse> for WeatherData {
    fn from(r: CurrentResponse) -> Self {
        WeatherData {
            temp_c: r.main.as_ref().and_then(|m| m.temp),
            humidity_pct: r.main.as_ref().and_then(|m| m.humidity),
            rain_1h_mm: r.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
            condition: r.weather.into_iter().next().and_then(|w| w.main),
        }
    }
}

/// Client for OpenWeatherMap current conditions.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    /// Create a new client.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    /// Returns true if an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch current conditions in metric units.
    pub async fn fetch(
        &self,
        api_key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherData, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(WeatherError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let parsed: CurrentResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Json {
                message: e.to_string(),
            })?;

        Ok(parsed.into())
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    async fn lookup(&self, lat: f64, lon: f64) -> Weather {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("weather lookup skipped: no API key");
            return Weather::Unavailable(UnavailableReason::NotConfigured);
        };

        match self.fetch(api_key, lat, lon).await {
            Ok(data) => Weather::Observed(data),
            Err(e) => {
                warn!(error = %e, lat, lon, "weather lookup failed");
                Weather::Unavailable(UnavailableReason::RequestFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: Option<&str>) -> OpenWeatherClient {
        let config = OpenWeatherConfig::new(key.map(String::from)).with_base_url(server.uri());
        OpenWeatherClient::new(config).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = OpenWeatherConfig::new(Some("key".into()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn blank_key_is_missing() {
        let config = OpenWeatherConfig::new(Some("  ".into()));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn parse_full_response() {
        let json = r#"{
            "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
            "main": {"temp": 27.4, "humidity": 88},
            "rain": {"1h": 0.6}
        }"#;
        let r: CurrentResponse = serde_json::from_str(json).unwrap();
        let data = WeatherData::from(r);

        assert_eq!(data.temp_c, Some(27.4));
        assert_eq!(data.humidity_pct, Some(88.0));
        assert_eq!(data.rain_1h_mm, 0.6);
        assert_eq!(data.condition.as_deref(), Some("Rain"));
    }

    #[test]
    fn parse_dry_response() {
        let json = r#"{"weather": [{"main": "Clouds"}], "main": {"temp": 31.0, "humidity": 60}}"#;
        let r: CurrentResponse = serde_json::from_str(json).unwrap();
        let data = WeatherData::from(r);

        assert_eq!(data.rain_1h_mm, 0.0);
        assert_eq!(data.condition.as_deref(), Some("Clouds"));
    }

    #[tokio::test]
    async fn lookup_without_key_is_not_configured() {
        let server = MockServer::start().await;
        let weather = client(&server, None).lookup(3.1, 101.6).await;

        assert_eq!(
            weather,
            Weather::Unavailable(UnavailableReason::NotConfigured)
        );
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn lookup_observed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": [{"main": "Thunderstorm"}],
                "main": {"temp": 29.0, "humidity": 90},
                "rain": {"1h": 4.2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let weather = client(&server, Some("secret")).lookup(3.1, 101.6).await;

        let Weather::Observed(data) = weather else {
            panic!("expected observation, got {weather:?}");
        };
        assert_eq!(data.temp_c, Some(29.0));
        assert_eq!(data.rain_1h_mm, 4.2);
        assert_eq!(data.condition.as_deref(), Some("Thunderstorm"));
    }

    #[tokio::test]
    async fn lookup_degrades_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let weather = client(&server, Some("secret")).lookup(3.1, 101.6).await;
        assert_eq!(
            weather,
            Weather::Unavailable(UnavailableReason::RequestFailed)
        );
    }

    #[tokio::test]
    async fn fetch_reports_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client(&server, Some("bad")).fetch("bad", 0.0, 0.0).await;
        assert!(matches!(result, Err(WeatherError::Unauthorized)));
    }
}
