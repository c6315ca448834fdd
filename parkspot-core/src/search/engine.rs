//! Repository-backed search.

use std::cmp::Ordering;

use geo::{Coord, Intersects};
use serde::{Deserialize, Serialize};

use super::{LocationMatch, SearchQuery, SortKey};
use crate::store::LocationStore;
use crate::{Coordinates, LocationRepository, ParkingLocation, distance_km};

/// Spot totals across every stored location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityStatus {
    /// Number of locations summed.
    pub location_count: usize,
    /// Combined capacity.
    pub total_spots: u64,
    /// Combined free spots.
    pub available_spots: u64,
    /// `total_spots - available_spots`; negative only after permissive writes.
    pub occupied_spots: i64,
}

/// Answers queries against a [`LocationRepository`].
///
/// Each call reads the full location set once, then filters and sorts it in
/// memory.
///
/// # Examples
///
/// ```rust
/// use parkspot_core::{LocationRepository, SearchEngine, SearchQuery, SortKey};
/// use parkspot_core::store::{KeyValueLocationStore, MemoryKeyValueStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let repository =
///     LocationRepository::new(KeyValueLocationStore::new(MemoryKeyValueStore::default()));
/// repository.initialize().await;
///
/// let engine = SearchEngine::new(&repository);
/// let cheap = engine
///     .search_locations(&SearchQuery::new().with_max_price(20.0).sorted_by(SortKey::Name))
///     .await;
/// let names: Vec<_> = cheap.iter().map(|m| m.location.name.as_str()).collect();
/// assert_eq!(names, ["City Mall", "Estadio Nacional"]);
/// # });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a, S> {
    repository: &'a LocationRepository<S>,
}

impl<'a, S: LocationStore> SearchEngine<'a, S> {
    /// Search through `repository`.
    pub const fn new(repository: &'a LocationRepository<S>) -> Self {
        Self { repository }
    }

    /// Locations satisfying every predicate of `query`, in the requested
    /// order.
    pub async fn search_locations(&self, query: &SearchQuery) -> Vec<LocationMatch> {
        let locations = self.repository.get_all_locations().await;
        apply_query(locations, query)
    }

    /// Locations within `radius_km` of `origin`, nearest first.
    pub async fn nearby_locations(&self, origin: Coordinates, radius_km: f64) -> Vec<LocationMatch> {
        let locations = self.repository.get_all_locations().await;
        nearby(locations, origin, radius_km)
    }

    /// Spot totals across every location, active or not.
    pub async fn availability_status(&self) -> AvailabilityStatus {
        summarise(&self.repository.get_all_locations().await)
    }
}

/// Filter, annotate and sort `locations` in memory.
#[must_use]
pub fn apply_query(locations: Vec<ParkingLocation>, query: &SearchQuery) -> Vec<LocationMatch> {
    let needle = query.needle();
    let mut matches: Vec<LocationMatch> = locations
        .into_iter()
        .map(|location| annotate(location, query.origin.map(|origin| origin.point)))
        .filter(|candidate| query.admits(candidate, needle.as_deref()))
        .collect();
    if let Some(key) = query.sort_by {
        sort_matches(&mut matches, key);
    }
    matches
}

/// Locations within `radius_km` of `origin`, nearest first.
///
/// A bounding box rejects far-away points before the exact distance check.
#[must_use]
pub fn nearby(locations: Vec<ParkingLocation>, origin: Coordinates, radius_km: f64) -> Vec<LocationMatch> {
    let bbox = origin.bounding_box(radius_km);
    let mut matches: Vec<LocationMatch> = locations
        .into_iter()
        .filter(|location| {
            bbox.is_none_or(|rect| rect.intersects(&Coord::from(location.coordinates())))
        })
        .map(|location| annotate(location, Some(origin)))
        .filter(|candidate| candidate.distance_km.is_some_and(|d| d <= radius_km))
        .collect();
    sort_matches(&mut matches, SortKey::Distance);
    matches
}

/// Reduce `locations` to spot totals.
#[must_use]
pub fn summarise(locations: &[ParkingLocation]) -> AvailabilityStatus {
    locations
        .iter()
        .fold(AvailabilityStatus::default(), |mut status, location| {
            status.location_count += 1;
            status.total_spots += u64::from(location.total_spots);
            status.available_spots += u64::from(location.available_spots);
            status.occupied_spots += location.occupied_spots();
            status
        })
}

fn annotate(location: ParkingLocation, origin: Option<Coordinates>) -> LocationMatch {
    let distance_km = origin.map(|point| distance_km(point, location.coordinates()));
    LocationMatch {
        location,
        distance_km,
    }
}

/// Stable sort; ties keep their store order.
fn sort_matches(matches: &mut [LocationMatch], key: SortKey) {
    matches.sort_by(|a, b| compare(key, a, b));
}

fn compare(key: SortKey, a: &LocationMatch, b: &LocationMatch) -> Ordering {
    match key {
        SortKey::Distance => a
            .distance_km
            .unwrap_or(0.0)
            .total_cmp(&b.distance_km.unwrap_or(0.0)),
        SortKey::Price => a.location.hourly_rate.total_cmp(&b.location.hourly_rate),
        SortKey::Availability => b.location.available_spots.cmp(&a.location.available_spots),
        SortKey::Name => a.location.name.cmp(&b.location.name),
    }
}
