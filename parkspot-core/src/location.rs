//! Parking facilities and their live capacity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Coordinates;

/// A parking facility.
///
/// `id` and `total_spots` are fixed once the record is created;
/// `available_spots` changes as cars arrive and leave. Records read back from
/// a store are trusted as-is, so the permissive
/// [`LocationRepository::set_available_spots`](crate::LocationRepository::set_available_spots)
/// path can leave `available_spots` above `total_spots`.
///
/// # Examples
/// ```
/// use parkspot_core::{Coordinates, ParkingLocation};
///
/// # fn main() -> Result<(), parkspot_core::ParkingLocationError> {
/// let location = ParkingLocation::new(
///     "loc-9",
///     "Parqueo Central",
///     Coordinates::new(14.07, -87.19),
///     40,
///     25.0,
/// )?;
/// assert_eq!(location.available_spots, 40);
/// assert!(location.is_active);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLocation {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Capacity of the facility.
    pub total_spots: u32,
    /// Spots currently free.
    pub available_spots: u32,
    /// Price per hour.
    pub hourly_rate: f64,
    /// Soft-disable flag.
    pub is_active: bool,
}

/// Errors returned by [`ParkingLocation::new`], [`ParkingLocation::validate`]
/// and the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParkingLocationError {
    /// The identifier was blank.
    #[error("parking location id must not be empty")]
    EmptyId,
    /// A facility must hold at least one car.
    #[error("parking location must have at least one spot")]
    NoCapacity,
    /// More spots were marked free than exist.
    #[error("available spots {available} exceed total spots {total}")]
    AvailableExceedsTotal {
        /// Requested free spots.
        available: u32,
        /// Facility capacity.
        total: u32,
    },
    /// The hourly rate was negative or not a number.
    #[error("hourly rate {0} must be a finite, non-negative amount")]
    InvalidRate(f64),
}

impl ParkingLocation {
    /// Validate and construct an active, empty facility.
    ///
    /// All spots start available; address and description start blank.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Coordinates,
        total_spots: u32,
        hourly_rate: f64,
    ) -> Result<Self, ParkingLocationError> {
        let location = Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            description: String::new(),
            latitude: position.latitude,
            longitude: position.longitude,
            total_spots,
            available_spots: total_spots,
            hourly_rate,
            is_active: true,
        };
        location.validate()?;
        Ok(location)
    }

    /// Set the street address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the number of free spots, rejecting values above capacity.
    pub fn with_available_spots(mut self, available: u32) -> Result<Self, ParkingLocationError> {
        if available > self.total_spots {
            return Err(ParkingLocationError::AvailableExceedsTotal {
                available,
                total: self.total_spots,
            });
        }
        self.available_spots = available;
        Ok(self)
    }

    /// Check a record that did not come through [`ParkingLocation::new`],
    /// such as one decoded from a seed file.
    ///
    /// The id must not be blank, capacity must be at least one, free spots
    /// must not exceed capacity and the rate must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ParkingLocationError> {
        if self.id.trim().is_empty() {
            return Err(ParkingLocationError::EmptyId);
        }
        if self.total_spots == 0 {
            return Err(ParkingLocationError::NoCapacity);
        }
        if self.available_spots > self.total_spots {
            return Err(ParkingLocationError::AvailableExceedsTotal {
                available: self.available_spots,
                total: self.total_spots,
            });
        }
        if !self.hourly_rate.is_finite() || self.hourly_rate < 0.0 {
            return Err(ParkingLocationError::InvalidRate(self.hourly_rate));
        }
        Ok(())
    }

    /// Mark the facility active or disabled.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Position of the facility.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Spots in use. Negative when a permissive write stored more free spots
    /// than the facility holds.
    #[must_use]
    pub fn occupied_spots(&self) -> i64 {
        i64::from(self.total_spots) - i64::from(self.available_spots)
    }
}
