// Enrichment: overlay a known location and a distance-from-user onto entities

use std::ops::Deref;

use serde::Serialize;

use crate::distance::distance_between;
use crate::entities::{Coordinates, Identified};
use crate::location_store::LocationStore;

/// An entity together with its optional location and distance from the user.
/// The wrapped entity is a copy; enrichment never touches the source list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enriched<T> {
    #[serde(flatten)]
    pub entity: T,
    pub location: Option<Coordinates>,
    pub distance_km: Option<f64>,
}

impl<T> Deref for Enriched<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entity
    }
}

pub fn attach_location<T, S>(entity: &T, store: &S) -> Enriched<T>
where
    T: Identified + Clone,
    S: LocationStore + ?Sized,
{
    Enriched {
        entity: entity.clone(),
        location: store.get(entity.id()),
        distance_km: None,
    }
}

pub fn attach_distance<T>(enriched: Enriched<T>, current: Option<Coordinates>) -> Enriched<T> {
    let distance_km = match (enriched.location, current) {
        (Some(location), Some(current)) => Some(distance_between(location, current)),
        _ => None,
    };
    Enriched {
        distance_km,
        ..enriched
    }
}

/// Both enrichment stages over a whole list, preserving order.
pub fn enrich_all<T, S>(entities: &[T], store: &S, current: Option<Coordinates>) -> Vec<Enriched<T>>
where
    T: Identified + Clone,
    S: LocationStore + ?Sized,
{
    entities
        .iter()
        .map(|entity| attach_distance(attach_location(entity, store), current))
        .collect()
}
