//! Firestore REST journey store.
//!
//! Writes go through `documents:commit` so that the server can stamp
//! `createdAt`, `startTimestamp` and `endTimestamp` with its own clock
//! (`REQUEST_TIME` transforms). Document ids are generated client-side.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::{EventId, JourneyEvent, JourneyId, StationId};

use super::{JourneyStore, StoreError, new_document_id};

/// Default base URL for the Firestore REST API.
const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

const JOURNEYS: &str = "journeys";
const EVENTS: &str = "events";
const PINGS: &str = "__ping";

/// Configuration for the Firestore store.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Firebase project id
    pub project_id: String,
    /// Web API key, sent as the `key` query parameter
    pub api_key: String,
    /// Pre-issued Firebase ID token for rules that require auth
    pub id_token: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FirestoreConfig {
    /// Create a new config for a project.
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            id_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Authenticate writes with an ID token.
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Journey store backed by Cloud Firestore.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    database: String,
}

impl FirestoreStore {
    /// Create a new Firestore store.
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.id_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                StoreError::Api {
                    status: 0,
                    message: "Invalid ID token format".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            database: format!("projects/{}/databases/(default)", config.project_id),
        })
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{collection}/{id}", self.database)
    }

    /// Send a single-write commit.
    async fn commit(&self, write: Value) -> Result<(), StoreError> {
        let url = format!("{}/v1/{}/documents:commit", self.base_url, self.database);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "writes": [write] }))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::NotFound(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Value>(&body).map_err(|e| StoreError::Json {
            message: e.to_string(),
        })?;

        Ok(())
    }
}

/// Encode a JSON value as a Firestore typed value.
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore encodes int64 as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(fields)
}

fn server_time(field: &str) -> Value {
    json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" })
}

fn station_value(id: Option<&StationId>) -> Value {
    id.map_or(Value::Null, |s| Value::String(s.as_str().to_string()))
}

#[async_trait]
impl JourneyStore for FirestoreStore {
    async fn create_journey(
        &self,
        user_id: &str,
        start_station_id: Option<&StationId>,
    ) -> Result<JourneyId, StoreError> {
        let id = new_document_id();
        let mut fields = Map::new();
        fields.insert("userId".into(), Value::String(user_id.to_string()));
        fields.insert("startStationId".into(), station_value(start_station_id));

        let write = json!({
            "update": {
                "name": self.document_name(JOURNEYS, &id),
                "fields": encode_fields(&fields),
            },
            "currentDocument": { "exists": false },
            "updateTransforms": [server_time("startTimestamp"), server_time("createdAt")],
        });

        self.commit(write).await?;
        debug!(journey_id = %id, "created journey document");
        Ok(JourneyId::new(id))
    }

    async fn close_journey(
        &self,
        journey_id: &JourneyId,
        end_station_id: Option<&StationId>,
    ) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert("endStationId".into(), station_value(end_station_id));

        let write = json!({
            "update": {
                "name": self.document_name(JOURNEYS, journey_id.as_str()),
                "fields": encode_fields(&fields),
            },
            "updateMask": { "fieldPaths": ["endStationId"] },
            "currentDocument": { "exists": true },
            "updateTransforms": [server_time("endTimestamp")],
        });

        self.commit(write).await?;
        debug!(%journey_id, "closed journey document");
        Ok(())
    }

    async fn append_event(&self, event: &JourneyEvent) -> Result<EventId, StoreError> {
        let id = new_document_id();
        let payload = serde_json::to_value(event).map_err(|e| StoreError::Json {
            message: e.to_string(),
        })?;
        let Value::Object(fields) = payload else {
            return Err(StoreError::Json {
                message: "event did not serialize to an object".to_string(),
            });
        };

        let write = json!({
            "update": {
                "name": self.document_name(EVENTS, &id),
                "fields": encode_fields(&fields),
            },
            "currentDocument": { "exists": false },
            "updateTransforms": [server_time("createdAt")],
        });

        self.commit(write).await?;
        debug!(event_id = %id, event_type = %event.event_type, "appended event document");
        Ok(EventId::new(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let id = new_document_id();
        let write = json!({
            "update": {
                "name": self.document_name(PINGS, &id),
                "fields": {},
            },
            "currentDocument": { "exists": false },
            "updateTransforms": [server_time("at")],
        });

        self.commit(write).await?;
        debug!(ping_id = %id, "ping write succeeded");
        Ok(())
    }
}
