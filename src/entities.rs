// Domain entities built from a live feed snapshot

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Feed timestamps keep the park's local offset; ordering compares instants.
pub type Timestamp = DateTime<FixedOffset>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Anything tracked by the feed under a unique id.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Park {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attraction {
    pub id: String,
    pub name: String,
    pub standby_wait: Option<u32>,
    pub return_start: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartyWait {
    pub party_size: u32,
    /// `None` when the feed lists the party size without a usable wait.
    pub wait_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub standby_wait: Option<u32>,
    pub party_wait: Vec<PartyWait>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    pub standby_wait: Option<u32>,
    pub return_start: Option<Timestamp>,
    pub show_times: Vec<Timestamp>,
}

macro_rules! impl_identified {
    ($($ty:ty),*) => {
        $(
            impl Identified for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_identified!(Park, Attraction, Restaurant, Show);
