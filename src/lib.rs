//! Facade crate for the parking discovery engine.
//!
//! This crate re-exports the core domain types and exposes the persistent
//! store backends behind feature flags.
//!
//! Platform adapters can be written against the facade alone:
//!
//! ```rust
//! use parkspot_engine::{
//!     Geocoder, GeolocationProvider, LocationPlatform, PlaceAddress, PlatformError,
//!     WatchOptions,
//! };
//!
//! fn wire<P: LocationPlatform + Geocoder>(platform: P) -> GeolocationProvider<P> {
//!     GeolocationProvider::with_options(platform, WatchOptions::default())
//! }
//!
//! let place = PlaceAddress {
//!     city: Some("Tegucigalpa".into()),
//!     country: Some("Honduras".into()),
//!     ..PlaceAddress::default()
//! };
//! assert_eq!(place.to_string(), "Tegucigalpa, Honduras");
//! assert!(matches!(PlatformError::Timeout, PlatformError::Timeout));
//! # let _ = wire::<parkspot_core::test_support::ScriptedPlatform>;
//! ```

#![forbid(unsafe_code)]

pub use parkspot_core::{
    AvailabilityError, AvailabilityPolicy, AvailabilityStatus, AvailabilityUpdater, Coordinates,
    EARTH_RADIUS_KM, GeolocationProvider, LocationMatch, LocationPackage, LocationPlatform,
    LocationRepository, OccupancySimulator, Origin, ParkingLocation, ParkingLocationError,
    PermissionResponse, PermissionState, Radius, SearchEngine, SearchQuery, SeedDataset, SeedError,
    SortKey, UserLocationPackage, UserPackageError, WatchSubscription, distance_km,
    format_distance,
};
pub use parkspot_core::geolocation::{
    Geocoder, PermissionStatus, PlaceAddress, PlatformError, WatchOptions,
};
pub use parkspot_core::store::{
    KeyValueLocationStore, KeyValueStore, LocationStore, MemoryKeyValueStore, StoreError,
};

#[cfg(feature = "store-sqlite")]
pub use parkspot_core::store::{SqliteKeyValueStore, SqliteKeyValueStoreError};

#[cfg(feature = "store-fs")]
pub use parkspot_core::store::{FsKeyValueStore, FsKeyValueStoreError};
