//! Contracts implemented by the host's location services.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Coordinates;

/// Permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Access allowed.
    Granted,
    /// Access refused.
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

/// Outcome of a permission check or prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    /// Whether location access is allowed.
    pub granted: bool,
    /// Whether prompting again can change the answer. When `false` after a
    /// denial, the user has to change the setting in system preferences.
    pub can_ask_again: bool,
    /// Raw platform status.
    pub status: PermissionStatus,
}

impl PermissionResponse {
    /// A granted response.
    #[must_use]
    pub const fn granted() -> Self {
        Self {
            granted: true,
            can_ask_again: true,
            status: PermissionStatus::Granted,
        }
    }

    /// A denied response.
    #[must_use]
    pub const fn denied(can_ask_again: bool) -> Self {
        Self {
            granted: false,
            can_ask_again,
            status: PermissionStatus::Denied,
        }
    }

    /// The response before the user has been asked.
    #[must_use]
    pub const fn undetermined() -> Self {
        Self {
            granted: false,
            can_ask_again: true,
            status: PermissionStatus::Undetermined,
        }
    }
}

/// Failures raised by a [`LocationPlatform`] or [`Geocoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Location services are switched off or missing.
    #[error("location services are unavailable: {message}")]
    Unavailable {
        /// Platform-supplied detail.
        message: String,
    },
    /// The call needs a permission that has not been granted.
    #[error("location permission has not been granted")]
    PermissionDenied,
    /// No fix arrived in time.
    #[error("timed out waiting for a position fix")]
    Timeout,
    /// A geocoding lookup failed.
    #[error("geocoding failed: {message}")]
    Geocoding {
        /// Platform-supplied detail.
        message: String,
    },
}

/// Cadence requested for live position updates.
///
/// The platform delivers an update once `interval` has elapsed or the device
/// has moved `distance_filter_m` metres, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Longest gap between updates.
    pub interval: Duration,
    /// Movement that triggers an early update, in metres.
    pub distance_filter_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            distance_filter_m: 50.0,
        }
    }
}

/// Device location services.
#[async_trait]
pub trait LocationPlatform: Send + Sync {
    /// Current permission without prompting the user.
    async fn permission_status(&self) -> Result<PermissionResponse, PlatformError>;

    /// Prompt the user for foreground location access.
    async fn request_permission(&self) -> Result<PermissionResponse, PlatformError>;

    /// Read the device position once.
    async fn current_position(&self) -> Result<Coordinates, PlatformError>;

    /// Start a live position feed. The feed ends when the stream is dropped.
    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<BoxStream<'static, Coordinates>, PlatformError>;
}

/// A postal address returned by reverse geocoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceAddress {
    /// Street and number.
    pub street: Option<String>,
    /// City or municipality.
    pub city: Option<String>,
    /// State, department or province.
    pub region: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

impl fmt::Display for PlaceAddress {
    /// Join the present, non-blank parts with `", "`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [&self.street, &self.city, &self.region, &self.country];
        let mut present = parts
            .into_iter()
            .filter_map(Option::as_deref)
            .map(str::trim)
            .filter(|part| !part.is_empty());
        if let Some(first) = present.next() {
            f.write_str(first)?;
            for part in present {
                write!(f, ", {part}")?;
            }
        }
        Ok(())
    }
}

/// Address lookup services, usually backed by the same platform.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Address closest to `position`, if any.
    async fn reverse_geocode(
        &self,
        position: Coordinates,
    ) -> Result<Option<PlaceAddress>, PlatformError>;

    /// Best position for `address`, if any.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, PlatformError>;
}
