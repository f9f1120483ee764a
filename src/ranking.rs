// Ranking: stable orderings by wait, return time and distance.
// Entities missing the sort key always go after those that have it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enrich::Enriched;
use crate::entities::{Attraction, Restaurant, Show, Timestamp};
use crate::error::ProcessingError;

pub trait HasStandbyWait {
    fn standby_wait(&self) -> Option<u32>;
}

pub trait HasReturnStart {
    fn return_start(&self) -> Option<Timestamp>;
}

pub trait HasDistance {
    fn distance_km(&self) -> Option<f64>;
}

impl HasStandbyWait for Attraction {
    fn standby_wait(&self) -> Option<u32> {
        self.standby_wait
    }
}

impl HasStandbyWait for Restaurant {
    fn standby_wait(&self) -> Option<u32> {
        self.standby_wait
    }
}

impl HasStandbyWait for Show {
    fn standby_wait(&self) -> Option<u32> {
        self.standby_wait
    }
}

impl HasReturnStart for Attraction {
    fn return_start(&self) -> Option<Timestamp> {
        self.return_start
    }
}

impl HasReturnStart for Show {
    fn return_start(&self) -> Option<Timestamp> {
        self.return_start
    }
}

impl<T: HasStandbyWait> HasStandbyWait for Enriched<T> {
    fn standby_wait(&self) -> Option<u32> {
        self.entity.standby_wait()
    }
}

impl<T: HasReturnStart> HasReturnStart for Enriched<T> {
    fn return_start(&self) -> Option<Timestamp> {
        self.entity.return_start()
    }
}

impl<T> HasDistance for Enriched<T> {
    fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }
}

fn nulls_last<K>(a: Option<K>, b: Option<K>, cmp: impl FnOnce(&K, &K) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_by_wait<T: HasStandbyWait>(a: &T, b: &T) -> Ordering {
    nulls_last(a.standby_wait(), b.standby_wait(), Ord::cmp)
}

pub fn compare_by_return<T: HasReturnStart>(a: &T, b: &T) -> Ordering {
    nulls_last(a.return_start(), b.return_start(), Ord::cmp)
}

pub fn compare_by_distance<T: HasDistance>(a: &T, b: &T) -> Ordering {
    nulls_last(a.distance_km(), b.distance_km(), f64::total_cmp)
}

// `sort_by` is stable, so equal keys keep their input order
fn sorted<T: Clone>(items: &[T], cmp: fn(&T, &T) -> Ordering) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by(cmp);
    out
}

pub fn sort_by_wait<T: HasStandbyWait + Clone>(items: &[T]) -> Vec<T> {
    sorted(items, compare_by_wait)
}

pub fn sort_by_return<T: HasReturnStart + Clone>(items: &[T]) -> Vec<T> {
    sorted(items, compare_by_return)
}

pub fn sort_by_distance<T: HasDistance + Clone>(items: &[T]) -> Vec<T> {
    sorted(items, compare_by_distance)
}

/// Ordering for attraction and show lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortMode {
    /// Shortest standby wait first
    #[default]
    Shortest,
    /// Earliest return time first
    Soonest,
    /// Closest to the user first
    Nearest,
}

impl SortMode {
    pub fn apply<T>(self, items: &[T]) -> Vec<T>
    where
        T: HasStandbyWait + HasReturnStart + HasDistance + Clone,
    {
        match self {
            SortMode::Shortest => sort_by_wait(items),
            SortMode::Soonest => sort_by_return(items),
            SortMode::Nearest => sort_by_distance(items),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Shortest => "SHORTEST",
            SortMode::Soonest => "SOONEST",
            SortMode::Nearest => "NEAREST",
        }
    }
}

/// Ordering for restaurant lists; restaurants have no return times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DiningSortMode {
    #[default]
    Shortest,
    Nearest,
}

impl DiningSortMode {
    pub fn apply<T>(self, items: &[T]) -> Vec<T>
    where
        T: HasStandbyWait + HasDistance + Clone,
    {
        match self {
            DiningSortMode::Shortest => sort_by_wait(items),
            DiningSortMode::Nearest => sort_by_distance(items),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiningSortMode::Shortest => "SHORTEST",
            DiningSortMode::Nearest => "NEAREST",
        }
    }
}

impl FromStr for SortMode {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHORTEST" => Ok(SortMode::Shortest),
            "SOONEST" => Ok(SortMode::Soonest),
            "NEAREST" => Ok(SortMode::Nearest),
            _ => Err(ProcessingError::InvalidSortMode(s.to_string())),
        }
    }
}

impl FromStr for DiningSortMode {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHORTEST" => Ok(DiningSortMode::Shortest),
            "NEAREST" => Ok(DiningSortMode::Nearest),
            _ => Err(ProcessingError::InvalidSortMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for SortMode {
    type Error = ProcessingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for DiningSortMode {
    type Error = ProcessingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortMode> for String {
    fn from(mode: SortMode) -> Self {
        mode.as_str().to_string()
    }
}

impl From<DiningSortMode> for String {
    fn from(mode: DiningSortMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DiningSortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
