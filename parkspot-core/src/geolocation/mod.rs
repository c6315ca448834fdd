//! Device position, permission handling and live position updates.
//!
//! The host supplies a [`LocationPlatform`] (and optionally a [`Geocoder`]);
//! [`GeolocationProvider`] layers the permission state machine on top and
//! turns every failure into `None`.

mod platform;
mod provider;
mod subscription;

pub use platform::{
    Geocoder, LocationPlatform, PermissionResponse, PermissionStatus, PlaceAddress, PlatformError,
    WatchOptions,
};
pub use provider::{GeolocationProvider, PermissionState};
pub use subscription::WatchSubscription;
