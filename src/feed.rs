// Raw live feed structures (themeparks.wiki `/entity/{id}/live` and `/entity/{id}`)

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::entities::Coordinates;
use crate::error::ProcessingError;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default, deserialize_with = "deserialize_records")]
    pub live_data: Vec<LiveRecord>,
}

impl LiveSnapshot {
    pub fn from_json(json: &str) -> Result<Self, ProcessingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProcessingError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// One live status record, tagged by its `entityType`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "entityType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveRecord {
    Park(ParkRecord),
    Attraction(AttractionRecord),
    Show(ShowRecord),
    Restaurant(RestaurantRecord),
    #[serde(other)]
    Other,
}

impl LiveRecord {
    pub fn id(&self) -> Option<&str> {
        match self {
            LiveRecord::Park(r) => Some(&r.id),
            LiveRecord::Attraction(r) => Some(&r.id),
            LiveRecord::Show(r) => Some(&r.id),
            LiveRecord::Restaurant(r) => Some(&r.id),
            LiveRecord::Other => None,
        }
    }

    /// Parks are never themselves assigned to a park.
    pub fn park_id(&self) -> Option<&str> {
        match self {
            LiveRecord::Attraction(r) => r.park_id.as_deref(),
            LiveRecord::Show(r) => r.park_id.as_deref(),
            LiveRecord::Restaurant(r) => r.park_id.as_deref(),
            LiveRecord::Park(_) | LiveRecord::Other => None,
        }
    }
}

// Only `id`, `name` and `entityType` are required. Every other field is read
// leniently: a value of the wrong shape becomes `None` instead of rejecting
// the whole record.

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractionRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub park_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub queue: Option<Queue>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub park_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub queue: Option<Queue>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub showtimes: Option<Vec<Showtime>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub park_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub queue: Option<Queue>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub dining_availability: Option<Vec<DiningAvailability>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Queue {
    #[serde(default, deserialize_with = "lenient")]
    pub standby: Option<Standby>,
    #[serde(default, deserialize_with = "lenient")]
    pub return_time: Option<ReturnTime>,
}

impl Queue {
    pub fn standby_wait(&self) -> Option<u32> {
        self.standby.as_ref().and_then(|s| s.wait_time)
    }

    pub fn return_start(&self) -> Option<&str> {
        self.return_time
            .as_ref()
            .and_then(|r| r.return_start.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standby {
    #[serde(default, deserialize_with = "lenient_count")]
    pub wait_time: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnTime {
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub return_start: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub return_end: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub showtime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningAvailability {
    #[serde(default, deserialize_with = "lenient_count")]
    pub party_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub wait_time: Option<u32>,
}

/// Response of the per-entity detail endpoint; only the location is used.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetails {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<DetailLocation>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct DetailLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl EntityDetails {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location
            .map(|l| Coordinates::new(l.latitude, l.longitude))
    }
}

// A record without a usable id, name or entityType is dropped on its own
// instead of failing the whole snapshot.
fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<LiveRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    let records = raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| {
            let id = value
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("<unknown>")
                .to_string();
            match serde_json::from_value::<LiveRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(entity_id = %id, error = %e, "skipping malformed live record");
                    None
                }
            }
        })
        .collect();
    Ok(records)
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_value(value))
}

fn lenient_value<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(error = %e, "ignoring malformed live field");
            None
        }
    }
}

// Elements that do not parse are dropped; a non-array is treated as absent.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items.into_iter().filter_map(lenient_value).collect())),
        other => {
            warn!(value = %other, "ignoring non-array live field");
            Ok(None)
        }
    }
}

// Minutes and party sizes: non-negative numbers, rounded to the nearest whole.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

fn count_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Null => None,
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 => Some(f.round() as u32),
            _ => {
                warn!(value = %n, "ignoring out of range count");
                None
            }
        },
        other => {
            warn!(value = %other, "ignoring non-numeric count");
            None
        }
    }
}
