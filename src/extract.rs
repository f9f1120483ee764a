// Entity extraction: raw live records -> typed park entities

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

use crate::entities::{Attraction, Park, PartyWait, Restaurant, Show, Timestamp};
use crate::error::ProcessingError;
use crate::feed::{LiveRecord, LiveSnapshot, Queue};

/// Cleans display names before they reach the presentation layer.
pub trait NameNormalizer: Send + Sync {
    fn normalize(&self, name: &str) -> String;
}

/// Marketing phrases stripped from names, applied in this order.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Walt Disney's",
    "Disney's",
    "Water Park",
    "Theme Park",
    "Walt Disney World",
    "Park",
];

#[derive(Debug, Clone)]
pub struct KeywordStripper {
    keywords: Vec<String>,
}

impl KeywordStripper {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for KeywordStripper {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl NameNormalizer for KeywordStripper {
    fn normalize(&self, name: &str) -> String {
        // Only the first occurrence of each phrase is removed
        let stripped = self
            .keywords
            .iter()
            .fold(name.to_string(), |acc, keyword| acc.replacen(keyword.as_str(), "", 1));
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Turns a live snapshot into parks and per-park entity lists.
pub struct FeedProcessor<N: NameNormalizer = KeywordStripper> {
    normalizer: N,
}

impl FeedProcessor<KeywordStripper> {
    pub fn new() -> Self {
        Self {
            normalizer: KeywordStripper::default(),
        }
    }
}

impl Default for FeedProcessor<KeywordStripper> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NameNormalizer> FeedProcessor<N> {
    pub fn with_normalizer(normalizer: N) -> Self {
        Self { normalizer }
    }

    // Helper method to load a saved snapshot from disk
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<LiveSnapshot, ProcessingError> {
        LiveSnapshot::from_path(path)
    }

    pub fn extract_parks(&self, snapshot: &LiveSnapshot) -> Vec<Park> {
        snapshot
            .live_data
            .iter()
            .filter_map(|record| match record {
                LiveRecord::Park(park) => Some(Park {
                    id: park.id.clone(),
                    name: self.normalizer.normalize(&park.name),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn extract_attractions(&self, snapshot: &LiveSnapshot, park_id: &str) -> Vec<Attraction> {
        snapshot
            .live_data
            .iter()
            .filter_map(|record| match record {
                LiveRecord::Attraction(a) if a.park_id.as_deref() == Some(park_id) => {
                    Some(Attraction {
                        id: a.id.clone(),
                        name: self.normalizer.normalize(&a.name),
                        standby_wait: standby_wait(a.queue.as_ref()),
                        return_start: return_start(&a.id, a.queue.as_ref()),
                    })
                }
                _ => None,
            })
            .collect()
    }

    pub fn extract_restaurants(&self, snapshot: &LiveSnapshot, park_id: &str) -> Vec<Restaurant> {
        snapshot
            .live_data
            .iter()
            .filter_map(|record| match record {
                LiveRecord::Restaurant(r) if r.park_id.as_deref() == Some(park_id) => {
                    let party_wait = r
                        .dining_availability
                        .iter()
                        .flatten()
                        .filter_map(|slot| match slot.party_size {
                            Some(party_size) => Some(PartyWait {
                                party_size,
                                wait_minutes: slot.wait_time,
                            }),
                            None => {
                                warn!(entity_id = %r.id, "skipping dining slot without a party size");
                                None
                            }
                        })
                        .collect();

                    Some(Restaurant {
                        id: r.id.clone(),
                        name: self.normalizer.normalize(&r.name),
                        standby_wait: standby_wait(r.queue.as_ref()),
                        party_wait,
                    })
                }
                _ => None,
            })
            .collect()
    }

    pub fn extract_shows(&self, snapshot: &LiveSnapshot, park_id: &str) -> Vec<Show> {
        snapshot
            .live_data
            .iter()
            .filter_map(|record| match record {
                LiveRecord::Show(s) if s.park_id.as_deref() == Some(park_id) => {
                    let show_times = s
                        .showtimes
                        .iter()
                        .flatten()
                        .filter_map(|showtime| {
                            showtime
                                .start_time
                                .as_deref()
                                .and_then(|raw| parse_timestamp(&s.id, "startTime", raw))
                        })
                        .collect();

                    Some(Show {
                        id: s.id.clone(),
                        name: self.normalizer.normalize(&s.name),
                        standby_wait: standby_wait(s.queue.as_ref()),
                        return_start: return_start(&s.id, s.queue.as_ref()),
                        show_times,
                    })
                }
                _ => None,
            })
            .collect()
    }
}

fn standby_wait(queue: Option<&Queue>) -> Option<u32> {
    queue.and_then(Queue::standby_wait)
}

fn return_start(entity_id: &str, queue: Option<&Queue>) -> Option<Timestamp> {
    queue
        .and_then(Queue::return_start)
        .and_then(|raw| parse_timestamp(entity_id, "returnStart", raw))
}

/// A malformed timestamp nulls the field for this entity only.
///
/// Timestamps without an offset (`2024-05-01T10:00:00`) are read as UTC.
pub fn parse_timestamp(entity_id: &str, field: &str, raw: &str) -> Option<Timestamp> {
    let parsed = DateTime::parse_from_rfc3339(raw).or_else(|e| {
        raw.parse::<NaiveDateTime>()
            .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
            .map_err(|_| e)
    });
    match parsed {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!(entity_id, field, value = raw, error = %e, "ignoring malformed timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SAMPLE: &str = r#"{
        "id": "dest", "name": "Dest", "entityType": "DESTINATION", "timezone": "America/New_York",
        "liveData": [
            {"id": "p1", "name": "Magic Kingdom Park", "entityType": "PARK"},
            {"id": "p2", "name": "Disney's Typhoon Lagoon Water Park", "entityType": "PARK"},
            {"id": "a1", "name": "Space Mountain", "entityType": "ATTRACTION", "parkId": "p1",
             "queue": {"STANDBY": {"waitTime": 30},
                       "RETURN_TIME": {"state": "AVAILABLE", "returnStart": "2024-05-01T10:00:00-04:00"}}},
            {"id": "a2", "name": "Haunted Mansion", "entityType": "ATTRACTION", "parkId": "p1",
             "queue": {"STANDBY": {"waitTime": null},
                       "RETURN_TIME": {"state": "AVAILABLE", "returnStart": "half past ten"}}},
            {"id": "a3", "name": "Crush n Gusher", "entityType": "ATTRACTION", "parkId": "p2"},
            {"id": "a4", "name": "Orphan Ride", "entityType": "ATTRACTION"},
            {"id": "r1", "name": "Be Our Guest", "entityType": "RESTAURANT", "parkId": "p1",
             "queue": {"STANDBY": {"waitTime": 20}},
             "diningAvailability": [{"partySize": 2, "waitTime": 15}, {"partySize": 4, "waitTime": 35}]},
            {"id": "r2", "name": "Pinocchio Village Haus", "entityType": "RESTAURANT", "parkId": "p1"},
            {"id": "s1", "name": "Festival of Fantasy", "entityType": "SHOW", "parkId": "p1",
             "showtimes": [
                {"type": "Performance Time", "startTime": "2024-05-01T12:00:00-04:00"},
                {"type": "Performance Time", "startTime": "not a time"},
                {"type": "Performance Time", "startTime": "2024-05-01T15:00:00-04:00"}
             ]},
            {"id": "s2", "name": "Castle Stage", "entityType": "SHOW", "parkId": "p1"},
            {"id": "x1", "name": "Monorail", "entityType": "TRANSPORT", "parkId": "p1"}
        ]
    }"#;

    fn snapshot() -> LiveSnapshot {
        LiveSnapshot::from_json(SAMPLE).unwrap()
    }

    #[test_case("Magic Kingdom Park", "Magic Kingdom"; "#1 trailing park")]
    #[test_case("Disney's Typhoon Lagoon Water Park", "Typhoon Lagoon"; "#2 prefix and water park")]
    #[test_case("Walt Disney's Enchanted Tiki Room", "Enchanted Tiki Room"; "#3 walt disney's prefix")]
    #[test_case("Disney's Hollywood Studios", "Hollywood Studios"; "#4 possessive")]
    #[test_case("  Space   Mountain ", "Space Mountain"; "#5 whitespace collapse")]
    #[test_case("EPCOT", "EPCOT"; "#6 untouched")]
    fn test_keyword_stripper(input: &str, expected: &str) {
        let stripper = KeywordStripper::default();
        assert_eq!(stripper.normalize(input), expected);
    }

    #[test]
    fn test_extract_parks() {
        let processor = FeedProcessor::new();
        let parks = processor.extract_parks(&snapshot());

        assert_eq!(parks.len(), 2);
        assert_eq!(parks[0].id, "p1");
        assert_eq!(parks[0].name, "Magic Kingdom");
        assert_eq!(parks[1].name, "Typhoon Lagoon");
    }

    #[test]
    fn test_extract_attractions_normalizes_optional_fields() {
        let processor = FeedProcessor::new();
        let attractions = processor.extract_attractions(&snapshot(), "p1");

        assert_eq!(attractions.len(), 2);

        let space = &attractions[0];
        assert_eq!(space.id, "a1");
        assert_eq!(space.standby_wait, Some(30));
        assert_eq!(
            space.return_start.map(|t| t.to_rfc3339()),
            Some("2024-05-01T10:00:00-04:00".to_string())
        );

        // Malformed returnStart only affects this entity's field
        let mansion = &attractions[1];
        assert_eq!(mansion.id, "a2");
        assert_eq!(mansion.standby_wait, None);
        assert_eq!(mansion.return_start, None);
    }

    #[test]
    fn test_extract_attractions_is_idempotent() {
        let processor = FeedProcessor::new();
        let data = snapshot();
        assert_eq!(
            processor.extract_attractions(&data, "p1"),
            processor.extract_attractions(&data, "p1")
        );
    }

    #[test]
    fn test_extract_attractions_unknown_park_is_empty() {
        let processor = FeedProcessor::new();
        assert!(processor.extract_attractions(&snapshot(), "nope").is_empty());
    }

    #[test]
    fn test_extract_restaurants() {
        let processor = FeedProcessor::new();
        let restaurants = processor.extract_restaurants(&snapshot(), "p1");

        assert_eq!(restaurants.len(), 2);
        assert_eq!(restaurants[0].standby_wait, Some(20));
        assert_eq!(
            restaurants[0].party_wait,
            vec![
                PartyWait { party_size: 2, wait_minutes: Some(15) },
                PartyWait { party_size: 4, wait_minutes: Some(35) },
            ]
        );
        assert_eq!(restaurants[1].standby_wait, None);
        assert!(restaurants[1].party_wait.is_empty());
    }

    #[test]
    fn test_extract_shows_skips_bad_showtimes() {
        let processor = FeedProcessor::new();
        let shows = processor.extract_shows(&snapshot(), "p1");

        assert_eq!(shows.len(), 2);
        let parade = &shows[0];
        assert_eq!(parade.show_times.len(), 2);
        assert!(parade.show_times[0] < parade.show_times[1]);
        assert_eq!(parade.return_start, None);
        assert!(shows[1].show_times.is_empty());
    }

    const LOOSE: &str = r#"{
        "id": "dest", "name": "Dest",
        "liveData": [
            {"id": "a1", "name": "Slinky Dog Dash", "entityType": "ATTRACTION", "parkId": "p1",
             "queue": {"STANDBY": {"waitTime": 42.6},
                       "RETURN_TIME": {"state": "AVAILABLE", "returnStart": 1714570200}}},
            {"id": "a2", "name": "Toy Story Mania", "entityType": "ATTRACTION", "parkId": "p1",
             "queue": {"STANDBY": {"waitTime": -1},
                       "RETURN_TIME": {"state": "AVAILABLE", "returnStart": "2024-05-01T14:30:00"}}},
            {"id": "r1", "name": "Woody's Lunch Box", "entityType": "RESTAURANT", "parkId": "p1",
             "diningAvailability": [{"partySize": 2, "waitTime": null},
                                    {"waitTime": 10},
                                    {"partySize": 6, "waitTime": 25}]},
            {"id": "s1", "name": "Fantasmic", "entityType": "SHOW", "parkId": "p1",
             "showtimes": [{"type": "Performance Time", "startTime": "2024-05-01T21:00:00"}]}
        ]
    }"#;

    #[test]
    fn test_malformed_leaves_keep_the_entity() {
        let processor = FeedProcessor::new();
        let data = LiveSnapshot::from_json(LOOSE).unwrap();
        let attractions = processor.extract_attractions(&data, "p1");

        assert_eq!(attractions.len(), 2);
        // Fractional waits round, a non-string returnStart is absent
        assert_eq!(attractions[0].standby_wait, Some(43));
        assert_eq!(attractions[0].return_start, None);
        // Negative waits are absent
        assert_eq!(attractions[1].standby_wait, None);
    }

    #[test]
    fn test_null_dining_wait_keeps_the_slot() {
        let processor = FeedProcessor::new();
        let data = LiveSnapshot::from_json(LOOSE).unwrap();
        let restaurants = processor.extract_restaurants(&data, "p1");

        assert_eq!(restaurants.len(), 1);
        // The slot without a party size is dropped
        assert_eq!(
            restaurants[0].party_wait,
            vec![
                PartyWait { party_size: 2, wait_minutes: None },
                PartyWait { party_size: 6, wait_minutes: Some(25) },
            ]
        );
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let processor = FeedProcessor::new();
        let data = LiveSnapshot::from_json(LOOSE).unwrap();

        let attractions = processor.extract_attractions(&data, "p1");
        assert_eq!(
            attractions[1].return_start.map(|t| t.to_rfc3339()),
            Some("2024-05-01T14:30:00+00:00".to_string())
        );

        let shows = processor.extract_shows(&data, "p1");
        assert_eq!(shows[0].show_times.len(), 1);
        assert_eq!(shows[0].show_times[0].to_rfc3339(), "2024-05-01T21:00:00+00:00");
    }

    #[test_case("2024-05-01T10:00:00-04:00" => Some("2024-05-01T10:00:00-04:00".to_string()); "with offset")]
    #[test_case("2024-05-01T14:00:00Z" => Some("2024-05-01T14:00:00+00:00".to_string()); "zulu")]
    #[test_case("2024-05-01T14:00:00.250" => Some("2024-05-01T14:00:00.250+00:00".to_string()); "naive fraction")]
    #[test_case("2024-13-45T99:00:00" => None; "impossible date")]
    #[test_case("half past ten" => None; "free text")]
    fn test_parse_timestamp(raw: &str) -> Option<String> {
        parse_timestamp("e1", "returnStart", raw).map(|t| t.to_rfc3339())
    }

    #[test]
    fn test_custom_normalizer() {
        struct Upper;
        impl NameNormalizer for Upper {
            fn normalize(&self, name: &str) -> String {
                name.to_uppercase()
            }
        }

        let processor = FeedProcessor::with_normalizer(Upper);
        let parks = processor.extract_parks(&snapshot());
        assert_eq!(parks[0].name, "MAGIC KINGDOM PARK");
    }
}
