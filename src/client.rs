// Feed client: fetches the live snapshot and per-entity details.
// One request per call; retry policy is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::entities::Coordinates;
use crate::feed::{EntityDetails, LiveSnapshot};
use crate::location_store::LocationStore;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

/// Walt Disney World Resort
pub const DEFAULT_DESTINATION_ID: &str = "e957da41-3552-4cf6-b636-5babc5cbc4e5";
pub const DEFAULT_BASE_URL: &str = "https://api.themeparks.wiki/v1";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub destination_id: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            destination_id: DEFAULT_DESTINATION_ID.to_string(),
            timeout_ms: 10_000,
            user_agent: concat!("park_board/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn live_url(&self) -> String {
        format!(
            "{}/entity/{}/live",
            self.base_url.trim_end_matches('/'),
            self.destination_id
        )
    }

    pub fn entity_url(&self, entity_id: &str) -> String {
        format!("{}/entity/{}", self.base_url.trim_end_matches('/'), entity_id)
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    // Current live snapshot for the configured destination
    async fn fetch_live(&self) -> Result<LiveSnapshot, ApiError>;

    // Detail record of a single entity (used for its location)
    async fn fetch_entity(&self, entity_id: &str) -> Result<EntityDetails, ApiError>;
}

pub struct ThemeParksClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ThemeParksClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::ClientError(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::ApiResponseError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| ApiError::DecodeError(e.to_string()))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.config.timeout_ms)
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

#[async_trait]
impl FeedSource for ThemeParksClient {
    async fn fetch_live(&self) -> Result<LiveSnapshot, ApiError> {
        let url = self.config.live_url();
        let snapshot: LiveSnapshot = self.get_json(&url).await?;
        info!(
            destination = %snapshot.name,
            records = snapshot.live_data.len(),
            "live data loaded"
        );
        Ok(snapshot)
    }

    async fn fetch_entity(&self, entity_id: &str) -> Result<EntityDetails, ApiError> {
        self.get_json(&self.config.entity_url(entity_id)).await
    }
}

// Fetch and store one location; any failure just means "no location yet".
async fn fetch_location<F, S>(source: &F, store: &S, entity_id: &str) -> Option<Coordinates>
where
    F: FeedSource + ?Sized,
    S: LocationStore + ?Sized,
{
    match source.fetch_entity(entity_id).await {
        Ok(details) => match details.coordinates() {
            Some(location) => {
                store.insert(entity_id, location);
                Some(location)
            }
            None => {
                warn!(entity_id, "entity has no location");
                None
            }
        },
        Err(e) => {
            warn!(entity_id, error = %e, "location lookup failed");
            None
        }
    }
}

fn park_entity_ids<'a>(snapshot: &'a LiveSnapshot, park_id: &'a str) -> impl Iterator<Item = &'a str> {
    snapshot
        .live_data
        .iter()
        .filter(move |record| record.park_id() == Some(park_id))
        .filter_map(|record| record.id())
}

/// Look up the first entity of `park_id` that has no stored location yet.
/// Returns the id that was resolved, if any.
pub async fn backfill_location<F, S>(
    source: &F,
    store: &S,
    snapshot: &LiveSnapshot,
    park_id: &str,
) -> Option<String>
where
    F: FeedSource + ?Sized,
    S: LocationStore + ?Sized,
{
    let mut ids = park_entity_ids(snapshot, park_id);
    let entity_id = store.first_missing(&mut ids)?;
    fetch_location(source, store, entity_id)
        .await
        .map(|_| entity_id.to_string())
}

/// Resolve up to `limit` missing locations of `park_id` concurrently.
/// Returns how many were stored.
pub async fn backfill_locations<F, S>(
    source: &F,
    store: &S,
    snapshot: &LiveSnapshot,
    park_id: &str,
    limit: usize,
) -> usize
where
    F: FeedSource + ?Sized,
    S: LocationStore + ?Sized,
{
    let missing: Vec<&str> = park_entity_ids(snapshot, park_id)
        .filter(|id| !store.contains(id))
        .take(limit)
        .collect();

    let lookups = missing
        .iter()
        .map(|entity_id| fetch_location(source, store, entity_id));
    join_all(lookups)
        .await
        .into_iter()
        .filter(Option::is_some)
        .count()
}


#[cfg(test)]
mod tests {
    use super::mock_source::MockSource;
    use super::*;
    use crate::location_store::InMemoryLocationStore;

    const SAMPLE: &str = r#"{
        "id": "dest", "name": "Dest",
        "liveData": [
            {"id": "p1", "name": "Park One", "entityType": "PARK"},
            {"id": "a1", "name": "Ride 1", "entityType": "ATTRACTION", "parkId": "p1"},
            {"id": "a2", "name": "Ride 2", "entityType": "ATTRACTION", "parkId": "p1"},
            {"id": "s1", "name": "Show 1", "entityType": "SHOW", "parkId": "p1"},
            {"id": "b1", "name": "Other Park Ride", "entityType": "ATTRACTION", "parkId": "p2"}
        ]
    }"#;

    fn snapshot() -> LiveSnapshot {
        LiveSnapshot::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn test_urls() {
        let config = ClientConfig {
            base_url: "https://example.test/v1/".to_string(),
            destination_id: "dest".to_string(),
            ..Default::default()
        };
        assert_eq!(config.live_url(), "https://example.test/v1/entity/dest/live");
        assert_eq!(config.entity_url("a1"), "https://example.test/v1/entity/a1");
    }

    #[test]
    fn test_client_builds_from_default_config() {
        let client = ThemeParksClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().destination_id, DEFAULT_DESTINATION_ID);
    }

    #[tokio::test]
    async fn test_backfill_resolves_first_missing_entity() {
        let source = MockSource::new()
            .with_location("a1", Coordinates::new(1.0, 1.0))
            .with_location("a2", Coordinates::new(2.0, 2.0));
        let store = InMemoryLocationStore::new();
        let data = snapshot();

        assert_eq!(
            backfill_location(&source, &store, &data, "p1").await,
            Some("a1".to_string())
        );
        assert_eq!(
            backfill_location(&source, &store, &data, "p1").await,
            Some("a2".to_string())
        );
        assert_eq!(store.get("a2"), Some(Coordinates::new(2.0, 2.0)));
        assert!(!store.contains("b1"));
    }

    #[tokio::test]
    async fn test_backfill_failure_is_not_an_error() {
        let source = MockSource::new();
        let store = InMemoryLocationStore::new();

        assert_eq!(backfill_location(&source, &store, &snapshot(), "p1").await, None);
        assert!(store.is_empty());
        assert_eq!(source.requests(), 1);
    }

    #[tokio::test]
    async fn test_backfill_nothing_missing_makes_no_request() {
        let source = MockSource::new();
        let store: InMemoryLocationStore = ["a1", "a2", "s1"]
            .iter()
            .map(|id| (id.to_string(), Coordinates::new(0.0, 0.0)))
            .collect();

        assert_eq!(backfill_location(&source, &store, &snapshot(), "p1").await, None);
        assert_eq!(source.requests(), 0);
    }

    #[tokio::test]
    async fn test_backfill_many_respects_limit_and_failures() {
        let source = MockSource::new()
            .with_location("a1", Coordinates::new(1.0, 1.0))
            .with_location("s1", Coordinates::new(3.0, 3.0));
        let store = InMemoryLocationStore::new();

        let stored = backfill_locations(&source, &store, &snapshot(), "p1", 10).await;
        assert_eq!(stored, 2);
        assert_eq!(source.requests(), 3);
        assert!(store.contains("a1") && store.contains("s1"));
        assert!(!store.contains("a2"));

        let store = InMemoryLocationStore::new();
        let stored = backfill_locations(&source, &store, &snapshot(), "p1", 1).await;
        assert_eq!(stored, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fetch_live_failure_surfaces_to_caller() {
        let source = MockSource::new();
        let result = tokio_test::block_on(source.fetch_live());
        assert!(matches!(result, Err(ApiError::NetworkError(_))));
    }
}
