// Aggregation: a whole snapshot organized per park, and ranked boards for one park

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enrich::{enrich_all, Enriched};
use crate::entities::{Attraction, Coordinates, Park, Restaurant, Show};
use crate::error::ProcessingError;
use crate::extract::{FeedProcessor, NameNormalizer};
use crate::feed::{LiveRecord, LiveSnapshot};
use crate::location_store::LocationStore;
use crate::ranking::{DiningSortMode, SortMode};

/// Every park in a snapshot with its entities grouped by category.
/// Each map has an entry (possibly empty) for every park id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganizedSnapshot {
    pub parks: Vec<Park>,
    pub park_attractions: HashMap<String, Vec<Attraction>>,
    pub park_restaurants: HashMap<String, Vec<Restaurant>>,
    pub park_shows: HashMap<String, Vec<Show>>,
}

impl OrganizedSnapshot {
    pub fn park(&self, park_id: &str) -> Option<&Park> {
        self.parks.iter().find(|p| p.id == park_id)
    }

    pub fn attractions(&self, park_id: &str) -> &[Attraction] {
        self.park_attractions
            .get(park_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn restaurants(&self, park_id: &str) -> &[Restaurant] {
        self.park_restaurants
            .get(park_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn shows(&self, park_id: &str) -> &[Show] {
        self.park_shows
            .get(park_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl<N: NameNormalizer> FeedProcessor<N> {
    pub fn organize(&self, snapshot: &LiveSnapshot) -> OrganizedSnapshot {
        let parks = self.extract_parks(snapshot);
        let mut organized = OrganizedSnapshot {
            parks,
            ..Default::default()
        };

        for park in &organized.parks {
            organized
                .park_attractions
                .insert(park.id.clone(), self.extract_attractions(snapshot, &park.id));
            organized
                .park_restaurants
                .insert(park.id.clone(), self.extract_restaurants(snapshot, &park.id));
            organized
                .park_shows
                .insert(park.id.clone(), self.extract_shows(snapshot, &park.id));
        }

        log_dropped_records(snapshot, &organized.parks);
        organized
    }
}

/// Organize with the default name normalizer.
pub fn organize(snapshot: &LiveSnapshot) -> OrganizedSnapshot {
    FeedProcessor::new().organize(snapshot)
}

// Unrecognized categories and records whose park is not in the snapshot are
// left out of the organized view; only report how many.
fn log_dropped_records(snapshot: &LiveSnapshot, parks: &[Park]) {
    let park_ids: HashSet<&str> = parks.iter().map(|p| p.id.as_str()).collect();
    let mut unrecognized = 0usize;
    let mut orphaned = 0usize;

    for record in &snapshot.live_data {
        match record {
            LiveRecord::Other => unrecognized += 1,
            LiveRecord::Park(_) => {}
            _ => {
                if !record.park_id().is_some_and(|id| park_ids.contains(id)) {
                    orphaned += 1;
                }
            }
        }
    }

    debug!(
        parks = parks.len(),
        records = snapshot.live_data.len(),
        unrecognized,
        orphaned,
        "organized live snapshot"
    );
}

/// Requested ordering for each list on a park board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSort {
    pub attractions: SortMode,
    pub restaurants: DiningSortMode,
    pub shows: SortMode,
}

/// One park's lists, enriched with location and distance and ranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkBoard {
    pub park: Park,
    pub attractions: Vec<Enriched<Attraction>>,
    pub restaurants: Vec<Enriched<Restaurant>>,
    pub shows: Vec<Enriched<Show>>,
}

/// Build the board for `park_id`, or for the first park when none is selected.
pub fn build_board<S>(
    organized: &OrganizedSnapshot,
    park_id: Option<&str>,
    store: &S,
    current: Option<Coordinates>,
    sort: BoardSort,
) -> Result<ParkBoard, ProcessingError>
where
    S: LocationStore + ?Sized,
{
    let park = match park_id {
        Some(id) => organized
            .park(id)
            .ok_or_else(|| ProcessingError::UnknownPark(id.to_string()))?,
        None => organized.parks.first().ok_or(ProcessingError::NoParks)?,
    };

    let attractions = enrich_all(organized.attractions(&park.id), store, current);
    let restaurants = enrich_all(organized.restaurants(&park.id), store, current);
    let shows = enrich_all(organized.shows(&park.id), store, current);

    Ok(ParkBoard {
        park: park.clone(),
        attractions: sort.attractions.apply(&attractions),
        restaurants: sort.restaurants.apply(&restaurants),
        shows: sort.shows.apply(&shows),
    })
}
