// Live theme-park feed -> per-park, ranked boards

pub mod aggregate;
pub mod client;
pub mod config;
pub mod distance;
pub mod enrich;
pub mod entities;
pub mod error;
pub mod extract;
pub mod feed;
pub mod location_store;
pub mod ranking;

// Re-export key types for convenience
pub use aggregate::{build_board, organize, BoardSort, OrganizedSnapshot, ParkBoard};
pub use client::{
    backfill_location, backfill_locations, ApiError, ClientConfig, FeedSource, ThemeParksClient,
};
pub use config::AppConfig;
pub use distance::{distance_between, distance_km};
pub use enrich::{attach_distance, attach_location, enrich_all, Enriched};
pub use entities::{Attraction, Coordinates, Park, PartyWait, Restaurant, Show, Timestamp};
pub use error::ProcessingError;
pub use extract::{FeedProcessor, KeywordStripper, NameNormalizer};
pub use feed::{LiveRecord, LiveSnapshot};
pub use location_store::{InMemoryLocationStore, LocationStore, PositionCell};
pub use ranking::{sort_by_distance, sort_by_return, sort_by_wait, DiningSortMode, SortMode};
