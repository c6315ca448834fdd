//! Search query types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Coordinates, ParkingLocation, format_distance};

/// How far from the origin results may lie.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Radius {
    /// No distance limit; results are still annotated with their distance.
    #[default]
    Unbounded,
    /// Only locations at most this many kilometres away.
    WithinKm(f64),
}

/// Reference point for distance annotation and radius filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    /// Position distances are measured from.
    pub point: Coordinates,
    /// Distance limit.
    pub radius: Radius,
}

impl Origin {
    /// Origin without a distance limit.
    pub const fn unbounded(point: Coordinates) -> Self {
        Self {
            point,
            radius: Radius::Unbounded,
        }
    }

    /// Origin limited to `radius_km`.
    pub const fn within_km(point: Coordinates, radius_km: f64) -> Self {
        Self {
            point,
            radius: Radius::WithinKm(radius_km),
        }
    }

    fn admits(&self, distance_km: f64) -> bool {
        match self.radius {
            Radius::Unbounded => true,
            Radius::WithinKm(limit) => distance_km <= limit,
        }
    }
}

/// Result ordering.
///
/// Parses from and displays as its lowercase name.
///
/// # Examples
/// ```
/// use parkspot_core::SortKey;
///
/// let key: SortKey = "availability".parse().unwrap();
/// assert_eq!(key, SortKey::Availability);
/// assert_eq!(SortKey::Price.to_string(), "price");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Nearest first.
    Distance,
    /// Cheapest hourly rate first.
    Price,
    /// Most free spots first.
    Availability,
    /// Name in ascending byte order.
    Name,
}

impl SortKey {
    /// Every key, in declaration order.
    pub const ALL: [Self; 4] = [Self::Distance, Self::Price, Self::Availability, Self::Name];

    /// Lowercase name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Price => "price",
            Self::Availability => "availability",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sort key name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key {0:?}; expected distance, price, availability or name")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSortKeyError(s.to_owned()))
    }
}

/// A conjunction of optional predicates plus an optional ordering.
///
/// An empty query returns every location in store order.
///
/// # Examples
/// ```
/// use parkspot_core::{Coordinates, SearchQuery, SortKey};
///
/// let query = SearchQuery::new()
///     .with_text("mall")
///     .within_km(Coordinates::new(14.07, -87.19), 5.0)
///     .with_max_price(30.0)
///     .sorted_by(SortKey::Distance);
/// assert_eq!(query.sort_by, Some(SortKey::Distance));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against name or address. Empty
    /// text matches everything.
    pub text: Option<String>,
    /// Origin for distance annotation and radius filtering.
    pub origin: Option<Origin>,
    /// Minimum free spots.
    pub min_available_spots: Option<u32>,
    /// Maximum hourly rate.
    pub max_price: Option<f64>,
    /// Ordering applied after filtering.
    pub sort_by: Option<SortKey>,
    /// Drop soft-disabled locations.
    pub active_only: bool,
}

impl SearchQuery {
    /// Query with no predicates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `text` against name or address.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Annotate results with their distance from `point`.
    #[must_use]
    pub const fn from_origin(mut self, point: Coordinates) -> Self {
        self.origin = Some(Origin::unbounded(point));
        self
    }

    /// Keep results within `radius_km` of `point`.
    #[must_use]
    pub const fn within_km(mut self, point: Coordinates, radius_km: f64) -> Self {
        self.origin = Some(Origin::within_km(point, radius_km));
        self
    }

    /// Require at least `spots` free spots.
    #[must_use]
    pub const fn with_min_available_spots(mut self, spots: u32) -> Self {
        self.min_available_spots = Some(spots);
        self
    }

    /// Require an hourly rate of at most `price`.
    #[must_use]
    pub const fn with_max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    /// Order results by `key`.
    #[must_use]
    pub const fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort_by = Some(key);
        self
    }

    /// Drop inactive locations.
    #[must_use]
    pub const fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    /// Lowercased search text, or `None` when absent or empty.
    pub(crate) fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }

    /// Check every supplied predicate against `candidate`.
    pub(crate) fn admits(&self, candidate: &LocationMatch, needle: Option<&str>) -> bool {
        let location = &candidate.location;
        if let Some(needle) = needle
            && !location.name.to_lowercase().contains(needle)
            && !location.address.to_lowercase().contains(needle)
        {
            return false;
        }
        if let (Some(origin), Some(distance)) = (&self.origin, candidate.distance_km)
            && !origin.admits(distance)
        {
            return false;
        }
        if self
            .min_available_spots
            .is_some_and(|min| location.available_spots < min)
        {
            return false;
        }
        if self
            .max_price
            .is_some_and(|max| location.hourly_rate > max)
        {
            return false;
        }
        !(self.active_only && !location.is_active)
    }
}

/// A location returned by a search, with its distance from the origin when
/// one was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMatch {
    /// The matching location.
    #[serde(flatten)]
    pub location: ParkingLocation,
    /// Great-circle distance from the query origin, in kilometres.
    #[serde(rename = "distance", default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl LocationMatch {
    /// Distance rendered for display, e.g. `"850 m"` or `"2.4 km"`.
    #[must_use]
    pub fn formatted_distance(&self) -> Option<String> {
        self.distance_km.map(format_distance)
    }
}
