// Location store: entity id -> coordinates, shared between the enrichment
// stage and whatever fetches entity details in the background.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::entities::Coordinates;

#[derive(Debug, Default)]
pub struct LocationStoreStats {
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub insert_count: AtomicUsize,
    pub replace_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocationStoreStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub insert_count: usize,
    pub replace_count: usize,
}

pub trait LocationStore: Send + Sync {
    // Location of the entity, if it has been fetched
    fn get(&self, entity_id: &str) -> Option<Coordinates>;

    // Store a location; returns true when the id was not known before
    fn insert(&self, entity_id: &str, location: Coordinates) -> bool;

    fn contains(&self, entity_id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> LocationStoreStatsReport;

    /// First id in `ids` that has no stored location yet.
    fn first_missing<'a>(&self, ids: &mut dyn Iterator<Item = &'a str>) -> Option<&'a str> {
        for id in ids {
            if !self.contains(id) {
                return Some(id);
            }
        }
        None
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLocationStore {
    locations: DashMap<String, Coordinates>,
    stats: LocationStoreStats,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<(String, Coordinates)> for InMemoryLocationStore {
    fn from_iter<I: IntoIterator<Item = (String, Coordinates)>>(iter: I) -> Self {
        let store = Self::new();
        for (id, location) in iter {
            store.insert(&id, location);
        }
        store
    }
}

impl LocationStore for InMemoryLocationStore {
    fn get(&self, entity_id: &str) -> Option<Coordinates> {
        match self.locations.get(entity_id) {
            Some(location) => {
                self.stats.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(*location)
            }
            None => {
                self.stats.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn insert(&self, entity_id: &str, location: Coordinates) -> bool {
        // The entry guard holds the shard lock for the whole insertion
        match self.locations.entry(entity_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(location);
                self.stats.replace_count.fetch_add(1, Ordering::Relaxed);
                false
            }
            Entry::Vacant(vacant) => {
                vacant.insert(location);
                self.stats.insert_count.fetch_add(1, Ordering::Relaxed);
                debug!(entity_id, lat = location.latitude, lon = location.longitude, "stored location");
                true
            }
        }
    }

    fn contains(&self, entity_id: &str) -> bool {
        self.locations.contains_key(entity_id)
    }

    fn len(&self) -> usize {
        self.locations.len()
    }

    fn stats(&self) -> LocationStoreStatsReport {
        LocationStoreStatsReport {
            items_count: self.locations.len(),
            hit_count: self.stats.hit_count.load(Ordering::Relaxed),
            miss_count: self.stats.miss_count.load(Ordering::Relaxed),
            insert_count: self.stats.insert_count.load(Ordering::Relaxed),
            replace_count: self.stats.replace_count.load(Ordering::Relaxed),
        }
    }
}

/// Latest known position of the user, written by a position provider and read
/// when boards are built. `None` until the first fix arrives.
#[derive(Debug, Default)]
pub struct PositionCell {
    current: RwLock<Option<Coordinates>>,
}

impl PositionCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, position: Coordinates) {
        *self.current.write() = Some(position);
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }

    pub fn current(&self) -> Option<Coordinates> {
        *self.current.read()
    }
}
