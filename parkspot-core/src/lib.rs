//! Core of the parking discovery engine.
//!
//! The crate stores parking locations and prepaid packages behind a swappable
//! [`LocationStore`](store::LocationStore), answers geospatial and
//! multi-criteria searches over them, tracks live spot availability and wraps
//! the host's location services behind a permission-aware provider.
//!
//! Constructors validate their input and return `Result`; repository reads
//! and writes absorb storage failures so callers always get a usable, if
//! possibly stale, answer.

#![forbid(unsafe_code)]

mod availability;
mod coordinates;
pub mod geolocation;
mod location;
mod package;
mod repository;
pub mod search;
mod seed;
pub mod store;

#[doc(hidden)]
pub mod test_support;

pub use availability::{
    AvailabilityError, AvailabilityPolicy, AvailabilityUpdater, OccupancySimulator,
};
pub use coordinates::{Coordinates, EARTH_RADIUS_KM, distance_km, format_distance};
pub use geolocation::{
    GeolocationProvider, LocationPlatform, PermissionResponse, PermissionState, WatchSubscription,
};
pub use location::{ParkingLocation, ParkingLocationError};
pub use package::{LocationPackage, UserLocationPackage, UserPackageError};
pub use repository::LocationRepository;
pub use search::{
    AvailabilityStatus, LocationMatch, Origin, Radius, SearchEngine, SearchQuery, SortKey,
};
pub use seed::{SeedDataset, SeedError, seed_locations, seed_packages};
