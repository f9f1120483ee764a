// Great-circle ("as the crow flies") distance

use haversine::{Location, Units};

use crate::entities::Coordinates;

/// Mean earth radius used by `haversine` for `Units::Kilometers`.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine::distance(
        Location {
            latitude: lat1,
            longitude: lon1,
        },
        Location {
            latitude: lat2,
            longitude: lon2,
        },
        Units::Kilometers,
    )
}

pub fn distance_between(from: Coordinates, to: Coordinates) -> f64 {
    distance_km(from.latitude, from.longitude, to.latitude, to.longitude)
}
