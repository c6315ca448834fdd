//! Reference dataset written to an empty store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{LocationPackage, ParkingLocation, ParkingLocationError, UserLocationPackage};

/// The three collections written when a store is seeded.
///
/// [`SeedDataset::default`] returns the bundled Tegucigalpa dataset; custom
/// datasets can be deserialised from JSON with the same camelCase layout as
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDataset {
    /// Parking facilities.
    pub locations: Vec<ParkingLocation>,
    /// Packages sold at those facilities.
    #[serde(default)]
    pub packages: Vec<LocationPackage>,
    /// Pre-existing user balances; empty for the bundled dataset.
    #[serde(default)]
    pub user_packages: Vec<UserLocationPackage>,
}

impl Default for SeedDataset {
    fn default() -> Self {
        Self {
            locations: seed_locations(),
            packages: seed_packages(),
            user_packages: Vec::new(),
        }
    }
}

/// Reasons a custom dataset is refused before it reaches a store.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The JSON did not match the store layout.
    #[error("failed to parse seed dataset: {0}")]
    Parse(#[from] serde_json::Error),
    /// A location broke a capacity, rate or id rule.
    #[error("seed location {id:?} is invalid: {source}")]
    InvalidLocation {
        /// Offending location id.
        id: String,
        /// Rule that was broken.
        #[source]
        source: ParkingLocationError,
    },
    /// Two locations share an id.
    #[error("seed location id {id:?} appears more than once")]
    DuplicateLocation {
        /// Repeated id.
        id: String,
    },
    /// A package or balance points at a location the dataset does not hold.
    #[error("seed record {record:?} refers to unknown location {location_id:?}")]
    UnknownLocation {
        /// Id of the package or balance.
        record: String,
        /// Location it refers to.
        location_id: String,
    },
}

impl SeedDataset {
    /// Parse a dataset from its JSON representation and [`validate`](Self::validate) it.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check every location with [`ParkingLocation::validate`], require
    /// unique location ids and require every package and balance to name a
    /// location in the dataset.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut ids = HashSet::with_capacity(self.locations.len());
        for location in &self.locations {
            location
                .validate()
                .map_err(|source| SeedError::InvalidLocation {
                    id: location.id.clone(),
                    source,
                })?;
            if !ids.insert(location.id.as_str()) {
                return Err(SeedError::DuplicateLocation {
                    id: location.id.clone(),
                });
            }
        }
        let references = self
            .packages
            .iter()
            .map(|package| (&package.id, &package.location_id))
            .chain(
                self.user_packages
                    .iter()
                    .map(|balance| (&balance.id, &balance.location_id)),
            );
        for (record, location_id) in references {
            if !ids.contains(location_id.as_str()) {
                return Err(SeedError::UnknownLocation {
                    record: record.clone(),
                    location_id: location_id.clone(),
                });
            }
        }
        Ok(())
    }
}

struct LocationRow {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    description: &'static str,
    latitude: f64,
    longitude: f64,
    total_spots: u32,
    available_spots: u32,
    hourly_rate: f64,
    is_active: bool,
}

const LOCATIONS: [LocationRow; 6] = [
    LocationRow {
        id: "loc-1",
        name: "Parqueo Centro Histórico",
        address: "Avenida Cervantes, Centro, Tegucigalpa",
        description: "Covered parking two blocks from the cathedral.",
        latitude: 14.0723,
        longitude: -87.1921,
        total_spots: 150,
        available_spots: 45,
        hourly_rate: 25.0,
        is_active: true,
    },
    LocationRow {
        id: "loc-2",
        name: "Mall Multiplaza",
        address: "Boulevard Juan Pablo II, Tegucigalpa",
        description: "Shopping mall garage with 24 hour security.",
        latitude: 14.0818,
        longitude: -87.2068,
        total_spots: 300,
        available_spots: 120,
        hourly_rate: 30.0,
        is_active: true,
    },
    LocationRow {
        id: "loc-3",
        name: "City Mall",
        address: "Boulevard del Norte, Comayagüela",
        description: "Open-air lot next to the food court entrance.",
        latitude: 14.0992,
        longitude: -87.2165,
        total_spots: 200,
        available_spots: 15,
        hourly_rate: 20.0,
        is_active: true,
    },
    LocationRow {
        id: "loc-4",
        name: "Parqueo Boulevard Morazán",
        address: "Boulevard Morazán, Colonia Palmira, Tegucigalpa",
        description: "Small lot close to restaurants and banks.",
        latitude: 14.0950,
        longitude: -87.1870,
        total_spots: 80,
        available_spots: 60,
        hourly_rate: 35.0,
        is_active: true,
    },
    LocationRow {
        id: "loc-5",
        name: "Aeropuerto Toncontín",
        address: "Boulevard Comunidad Económica Europea, Tegucigalpa",
        description: "Short and long stay airport parking.",
        latitude: 14.0609,
        longitude: -87.2172,
        total_spots: 250,
        available_spots: 200,
        hourly_rate: 40.0,
        is_active: true,
    },
    LocationRow {
        id: "loc-6",
        name: "Estadio Nacional",
        address: "Barrio Morazán, Tegucigalpa",
        description: "Event parking, closed outside match days.",
        latitude: 14.0869,
        longitude: -87.2011,
        total_spots: 120,
        available_spots: 0,
        hourly_rate: 15.0,
        is_active: false,
    },
];

struct PackageRow {
    id: &'static str,
    location_id: &'static str,
    name: &'static str,
    minutes: u32,
    price: f64,
    original_price: f64,
    discount: f64,
    description: &'static str,
    is_popular: bool,
}

const PACKAGES: [PackageRow; 9] = [
    PackageRow {
        id: "pkg-1-5h",
        location_id: "loc-1",
        name: "5 horas",
        minutes: 300,
        price: 112.5,
        original_price: 125.0,
        discount: 10.0,
        description: "Five hours to use within a month.",
        is_popular: false,
    },
    PackageRow {
        id: "pkg-1-10h",
        location_id: "loc-1",
        name: "10 horas",
        minutes: 600,
        price: 200.0,
        original_price: 250.0,
        discount: 20.0,
        description: "Ten hours to use within a month.",
        is_popular: true,
    },
    PackageRow {
        id: "pkg-1-20h",
        location_id: "loc-1",
        name: "20 horas",
        minutes: 1200,
        price: 350.0,
        original_price: 500.0,
        discount: 30.0,
        description: "Twenty hours to use within two months.",
        is_popular: false,
    },
    PackageRow {
        id: "pkg-2-5h",
        location_id: "loc-2",
        name: "5 horas",
        minutes: 300,
        price: 135.0,
        original_price: 150.0,
        discount: 10.0,
        description: "Five hours at the mall garage.",
        is_popular: false,
    },
    PackageRow {
        id: "pkg-2-10h",
        location_id: "loc-2",
        name: "10 horas",
        minutes: 600,
        price: 240.0,
        original_price: 300.0,
        discount: 20.0,
        description: "Ten hours at the mall garage.",
        is_popular: true,
    },
    PackageRow {
        id: "pkg-3-10h",
        location_id: "loc-3",
        name: "10 horas",
        minutes: 600,
        price: 170.0,
        original_price: 200.0,
        discount: 15.0,
        description: "Ten hours next to the food court.",
        is_popular: true,
    },
    PackageRow {
        id: "pkg-4-5h",
        location_id: "loc-4",
        name: "5 horas",
        minutes: 300,
        price: 157.5,
        original_price: 175.0,
        discount: 10.0,
        description: "Five hours on the boulevard.",
        is_popular: false,
    },
    PackageRow {
        id: "pkg-5-24h",
        location_id: "loc-5",
        name: "Día completo",
        minutes: 1440,
        price: 720.0,
        original_price: 960.0,
        discount: 25.0,
        description: "A full day of airport parking.",
        is_popular: true,
    },
    PackageRow {
        id: "pkg-6-10h",
        location_id: "loc-6",
        name: "10 horas",
        minutes: 600,
        price: 120.0,
        original_price: 150.0,
        discount: 20.0,
        description: "Ten hours of event parking.",
        is_popular: false,
    },
];

/// The bundled parking facilities.
#[must_use]
pub fn seed_locations() -> Vec<ParkingLocation> {
    LOCATIONS
        .iter()
        .map(|row| ParkingLocation {
            id: row.id.to_owned(),
            name: row.name.to_owned(),
            address: row.address.to_owned(),
            description: row.description.to_owned(),
            latitude: row.latitude,
            longitude: row.longitude,
            total_spots: row.total_spots,
            available_spots: row.available_spots,
            hourly_rate: row.hourly_rate,
            is_active: row.is_active,
        })
        .collect()
}

/// The bundled package catalogue.
#[must_use]
pub fn seed_packages() -> Vec<LocationPackage> {
    PACKAGES
        .iter()
        .map(|row| LocationPackage {
            id: row.id.to_owned(),
            location_id: row.location_id.to_owned(),
            name: row.name.to_owned(),
            minutes: row.minutes,
            price: row.price,
            original_price: row.original_price,
            discount: row.discount,
            description: row.description.to_owned(),
            is_popular: row.is_popular,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn location_ids_are_unique() {
        let locations = seed_locations();
        let ids: HashSet<_> = locations.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), locations.len());
    }

    #[rstest]
    fn availability_stays_within_capacity() {
        assert!(
            seed_locations()
                .iter()
                .all(|l| l.total_spots >= 1 && l.available_spots <= l.total_spots)
        );
    }

    #[rstest]
    fn packages_reference_known_locations() {
        let locations = seed_locations();
        let ids: HashSet<_> = locations.iter().map(|l| l.id.as_str()).collect();
        assert!(
            seed_packages()
                .iter()
                .all(|p| ids.contains(p.location_id.as_str()))
        );
    }

    #[rstest]
    fn package_prices_match_discounts() {
        for package in seed_packages() {
            assert!(package.has_consistent_discount(), "{}", package.id);
        }
    }

    #[rstest]
    fn dataset_parses_from_store_layout() {
        let json = r#"{
            "locations": [{
                "id": "loc-a", "name": "A", "address": "Street 1",
                "latitude": 1.0, "longitude": 2.0,
                "totalSpots": 5, "availableSpots": 2,
                "hourlyRate": 3.5, "isActive": true
            }]
        }"#;
        let dataset = SeedDataset::from_json(json).expect("parse dataset");
        assert_eq!(dataset.locations.len(), 1);
        assert_eq!(dataset.locations[0].description, "");
        assert!(dataset.packages.is_empty());
        assert!(dataset.user_packages.is_empty());
    }

    #[rstest]
    fn bundled_dataset_is_valid() {
        assert!(SeedDataset::default().validate().is_ok());
    }

    const LOT: &str = r#"{"id": "x", "name": "X", "address": "", "latitude": 0.0,
        "longitude": 0.0, "totalSpots": 10, "availableSpots": 2, "hourlyRate": 5.0,
        "isActive": true}"#;

    const BAD_LOT: &str = r#"{"id": "x", "name": "X", "address": "", "latitude": 0.0,
        "longitude": 0.0, "totalSpots": 0, "availableSpots": 500, "hourlyRate": -5.0,
        "isActive": true}"#;

    const PACKAGE_FOR_Y: &str = r#"{"id": "pkg-y", "locationId": "y", "name": "Hour",
        "minutes": 60, "price": 5.0, "originalPrice": 5.0, "discount": 0.0,
        "isPopular": false}"#;

    const BALANCE_FOR_Y: &str = r#"{"id": "up-y", "userId": "u", "locationId": "y",
        "packageId": "pkg-y", "remainingMinutes": 60,
        "purchaseDate": "2024-03-01T08:00:00Z", "expirationDate": "2024-04-01T08:00:00Z",
        "isActive": true}"#;

    #[rstest]
    #[case::bad_capacity(format!(r#"{{"locations": [{BAD_LOT}]}}"#), "invalid")]
    #[case::duplicate_id(format!(r#"{{"locations": [{LOT}, {LOT}]}}"#), "duplicate")]
    #[case::dangling_package(
        format!(r#"{{"locations": [{LOT}], "packages": [{PACKAGE_FOR_Y}]}}"#),
        "unknown"
    )]
    #[case::dangling_balance(
        format!(r#"{{"locations": [{LOT}], "userPackages": [{BALANCE_FOR_Y}]}}"#),
        "unknown"
    )]
    #[case::malformed(String::from(r#"{"locations": 5}"#), "parse")]
    fn invalid_datasets_are_refused(#[case] json: String, #[case] expected: &str) {
        let err = SeedDataset::from_json(&json).expect_err("dataset should be refused");
        let kind = match &err {
            SeedError::Parse(_) => "parse",
            SeedError::InvalidLocation { .. } => "invalid",
            SeedError::DuplicateLocation { .. } => "duplicate",
            SeedError::UnknownLocation { .. } => "unknown",
        };
        assert_eq!(kind, expected, "{err:?}");
    }
}
