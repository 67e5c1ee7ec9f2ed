//! Runtime configuration from environment variables.
//!
//! The Firebase keys are mandatory: the process refuses to start if any is
//! missing or still holds the `REPLACE_ME` placeholder from the sample env
//! file. Everything else has a default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::Position;
use crate::session::ActionGuard;

/// Placeholder value shipped in the sample env file.
const PLACEHOLDER: &str = "REPLACE_ME";

const DEFAULT_USER_ID: &str = "local-rider";
const DEFAULT_STATIONS_PATH: &str = "data/stations.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Firebase keys that must be present.
pub const REQUIRED_KEYS: [&str; 6] = [
    "FIREBASE_API_KEY",
    "FIREBASE_AUTH_DOMAIN",
    "FIREBASE_PROJECT_ID",
    "FIREBASE_STORAGE_BUCKET",
    "FIREBASE_MESSAGING_SENDER_ID",
    "FIREBASE_APP_ID",
];

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required keys are absent or still placeholders
    #[error("missing configuration: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// A value is present but unusable
    #[error("invalid {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Firebase project settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    /// ID token of an already signed-in user, sent as a bearer token
    pub id_token: Option<String>,
}

/// Where journeys and events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Firestore,
    /// In-process only; nothing survives a restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("expected 'firestore' or 'memory', got '{other}'")),
        }
    }
}

/// How the position source is set up at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationSetting {
    /// Every fix is refused as if permission were denied
    Disabled,
    /// Fixed position, or no fix until one is pushed over HTTP
    Fixed(Option<Position>),
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub firebase: FirebaseConfig,
    pub openweather_api_key: Option<String>,
    pub user_id: String,
    pub stations_path: PathBuf,
    pub location: LocationSetting,
    pub action_guard: ActionGuard,
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    ///
    /// Blank values count as unset. All missing required keys are reported
    /// together.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<String> = REQUIRED_KEYS
            .into_iter()
            .filter(|&key| get(key).is_none_or(|v| v == PLACEHOLDER))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let required = |key: &str| get(key).unwrap_or_default();
        let firebase = FirebaseConfig {
            api_key: required("FIREBASE_API_KEY"),
            auth_domain: required("FIREBASE_AUTH_DOMAIN"),
            project_id: required("FIREBASE_PROJECT_ID"),
            storage_bucket: required("FIREBASE_STORAGE_BUCKET"),
            messaging_sender_id: required("FIREBASE_MESSAGING_SENDER_ID"),
            app_id: required("FIREBASE_APP_ID"),
            id_token: get("FIREBASE_ID_TOKEN"),
        };

        let location = if parse_flag("LOGGER_LOCATION_DISABLED", get("LOGGER_LOCATION_DISABLED"))? {
            LocationSetting::Disabled
        } else {
            LocationSetting::Fixed(parse_position(&get)?)
        };

        let action_guard = match get("LOGGER_ACTION_GUARD") {
            Some(v) => v
                .parse()
                .map_err(|e| ConfigError::invalid("LOGGER_ACTION_GUARD", e))?,
            None => ActionGuard::default(),
        };

        let store = match get("LOGGER_STORE") {
            Some(v) => v.parse().map_err(|e| ConfigError::invalid("LOGGER_STORE", e))?,
            None => StoreBackend::default(),
        };

        let bind_addr = get("LOGGER_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::invalid("LOGGER_BIND_ADDR", e.to_string())
            })?;

        Ok(Self {
            firebase,
            openweather_api_key: get("OPENWEATHER_API_KEY").filter(|v| v != PLACEHOLDER),
            user_id: get("LOGGER_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            stations_path: get("LOGGER_STATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIONS_PATH)),
            location,
            action_guard,
            bind_addr,
            store,
        })
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("0" | "false" | "no") => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some(other) => Err(ConfigError::invalid(key, format!("not a boolean: '{other}'"))),
    }
}

fn parse_coord(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::invalid(key, format!("not a number: '{value}'")))
}

/// `LOGGER_LAT` and `LOGGER_LON` must be set together.
fn parse_position(get: &impl Fn(&str) -> Option<String>) -> Result<Option<Position>, ConfigError> {
    let (lat, lon) = match (get("LOGGER_LAT"), get("LOGGER_LON")) {
        (None, None) => return Ok(None),
        (Some(lat), Some(lon)) => (
            parse_coord("LOGGER_LAT", &lat)?,
            parse_coord("LOGGER_LON", &lon)?,
        ),
        (Some(_), None) => return Err(ConfigError::invalid("LOGGER_LON", "required with LOGGER_LAT")),
        (None, Some(_)) => return Err(ConfigError::invalid("LOGGER_LAT", "required with LOGGER_LON")),
    };

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ConfigError::invalid("LOGGER_LAT", "out of range"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ConfigError::invalid("LOGGER_LON", "out of range"));
    }

    let position = Position::new(lat, lon);
    match get("LOGGER_ACCURACY_M") {
        Some(v) => Ok(Some(
            position.with_accuracy(parse_coord("LOGGER_ACCURACY_M", &v)?),
        )),
        None => Ok(Some(position)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn firebase_env() -> HashMap<&'static str, String> {
        REQUIRED_KEYS
            .iter()
            .map(|k| (*k, format!("{}-value", k.to_ascii_lowercase())))
            .collect()
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&firebase_env()).unwrap();

        assert_eq!(config.firebase.project_id, "firebase_project_id-value");
        assert!(config.firebase.id_token.is_none());
        assert!(config.openweather_api_key.is_none());
        assert_eq!(config.user_id, DEFAULT_USER_ID);
        assert_eq!(config.stations_path, PathBuf::from(DEFAULT_STATIONS_PATH));
        assert_eq!(config.location, LocationSetting::Fixed(None));
        assert_eq!(config.action_guard, ActionGuard::Serialized);
        assert_eq!(config.store, StoreBackend::Firestore);
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn reports_every_missing_key() {
        let mut env = firebase_env();
        env.remove("FIREBASE_API_KEY");
        env.insert("FIREBASE_APP_ID", PLACEHOLDER.to_string());
        env.insert("FIREBASE_AUTH_DOMAIN", "   ".to_string());

        let err = load(&env).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingKeys(vec![
                "FIREBASE_API_KEY".to_string(),
                "FIREBASE_AUTH_DOMAIN".to_string(),
                "FIREBASE_APP_ID".to_string(),
            ])
        );
        assert!(err.to_string().contains("FIREBASE_APP_ID"));
    }

    #[test]
    fn empty_environment_is_fatal() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKeys(keys) if keys.len() == REQUIRED_KEYS.len()));
    }

    #[test]
    fn optional_settings() {
        let mut env = firebase_env();
        env.insert("FIREBASE_ID_TOKEN", "token".to_string());
        env.insert("OPENWEATHER_API_KEY", "ow-key".to_string());
        env.insert("LOGGER_USER_ID", "rider-7".to_string());
        env.insert("LOGGER_ACTION_GUARD", "unguarded".to_string());
        env.insert("LOGGER_STORE", "Memory".to_string());
        env.insert("LOGGER_BIND_ADDR", "0.0.0.0:8080".to_string());
        env.insert("LOGGER_LAT", "3.1343".to_string());
        env.insert("LOGGER_LON", "101.6866".to_string());
        env.insert("LOGGER_ACCURACY_M", "12.5".to_string());

        let config = load(&env).unwrap();

        assert_eq!(config.firebase.id_token.as_deref(), Some("token"));
        assert_eq!(config.openweather_api_key.as_deref(), Some("ow-key"));
        assert_eq!(config.user_id, "rider-7");
        assert_eq!(config.action_guard, ActionGuard::Unguarded);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.location,
            LocationSetting::Fixed(Some(Position::new(3.1343, 101.6866).with_accuracy(12.5)))
        );
    }

    #[test]
    fn placeholder_weather_key_is_unset() {
        let mut env = firebase_env();
        env.insert("OPENWEATHER_API_KEY", PLACEHOLDER.to_string());
        assert!(load(&env).unwrap().openweather_api_key.is_none());
    }

    #[test]
    fn location_disabled() {
        let mut env = firebase_env();
        env.insert("LOGGER_LOCATION_DISABLED", "true".to_string());
        env.insert("LOGGER_LAT", "3.0".to_string());
        env.insert("LOGGER_LON", "101.0".to_string());

        assert_eq!(load(&env).unwrap().location, LocationSetting::Disabled);
    }

    #[test]
    fn half_a_position_is_invalid() {
        let mut env = firebase_env();
        env.insert("LOGGER_LAT", "3.0".to_string());

        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "LOGGER_LON"));
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            ("LOGGER_ACTION_GUARD", "sometimes"),
            ("LOGGER_STORE", "postgres"),
            ("LOGGER_BIND_ADDR", "localhost"),
            ("LOGGER_LOCATION_DISABLED", "maybe"),
        ];

        for (key, value) in cases {
            let mut env = firebase_env();
            env.insert(key, value.to_string());
            let err = load(&env).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: ref k, .. } if k == key),
                "{key}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let mut env = firebase_env();
        env.insert("LOGGER_LAT", "91".to_string());
        env.insert("LOGGER_LON", "0".to_string());
        assert!(load(&env).is_err());

        env.insert("LOGGER_LAT", "NaN".to_string());
        assert!(load(&env).is_err());
    }
}
