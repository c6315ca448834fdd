//! Proptest strategies for search property tests.
//!
//! Generated locations sit around Tegucigalpa and draw names and addresses from
//! small pools so that text matches and sort ties happen often.

use parkspot_core::{Coordinates, ParkingLocation, SearchQuery, SortKey};
use proptest::prelude::*;

const NAMES: &[&str] = &[
    "Parqueo Central",
    "Mall Norte",
    "mall sur",
    "City Parking",
    "Estacionamiento Kennedy",
    "Parqueo Central",
];

const ADDRESSES: &[&str] = &[
    "Boulevard Morazán",
    "Colonia Palmira",
    "Avenida La Paz",
    "Centro, Comayagüela",
];

const NEEDLES: &[&str] = &["mall", "PARQUEO", "centr", "boulevard", "", "zzz"];

/// Strategy for a point in and around Tegucigalpa.
pub fn coordinates_strategy() -> impl Strategy<Value = Coordinates> {
    (13.9_f64..14.3_f64, -87.4_f64..-87.0_f64)
        .prop_map(|(latitude, longitude)| Coordinates::new(latitude, longitude))
}

/// Strategy for a single location; the id is assigned by [`locations_strategy`].
fn location_strategy() -> impl Strategy<Value = ParkingLocation> {
    (1_u32..=500_u32).prop_flat_map(|total| {
        (
            prop::sample::select(NAMES),
            prop::sample::select(ADDRESSES),
            coordinates_strategy(),
            0..=total,
            prop_oneof![Just(20.0_f64), Just(25.0_f64), 0.0_f64..100.0_f64],
            any::<bool>(),
        )
            .prop_map(
                move |(name, address, position, available, rate, is_active)| ParkingLocation {
                    id: String::new(),
                    name: name.to_owned(),
                    address: address.to_owned(),
                    description: String::new(),
                    latitude: position.latitude,
                    longitude: position.longitude,
                    total_spots: total,
                    available_spots: available,
                    hourly_rate: rate,
                    is_active,
                },
            )
    })
}

/// Strategy for up to `max_count` locations with unique ids.
pub fn locations_strategy(max_count: usize) -> impl Strategy<Value = Vec<ParkingLocation>> {
    proptest::collection::vec(location_strategy(), 0..=max_count).prop_map(|locations| {
        locations
            .into_iter()
            .enumerate()
            .map(|(idx, mut location)| {
                location.id = format!("loc-{idx}");
                location
            })
            .collect()
    })
}

fn sort_key_strategy() -> impl Strategy<Value = SortKey> {
    prop::sample::select(SortKey::ALL.to_vec())
}

/// Strategy for an arbitrary combination of query predicates.
pub fn query_strategy() -> impl Strategy<Value = SearchQuery> {
    (
        proptest::option::of(prop::sample::select(NEEDLES)),
        proptest::option::of((coordinates_strategy(), proptest::option::of(0.0_f64..30.0_f64))),
        proptest::option::of(0_u32..=500_u32),
        proptest::option::of(0.0_f64..100.0_f64),
        proptest::option::of(sort_key_strategy()),
        any::<bool>(),
    )
        .prop_map(|(text, origin, min_spots, max_price, sort_by, active_only)| {
            let mut query = SearchQuery::new();
            if let Some(text) = text {
                query = query.with_text(text);
            }
            query = match origin {
                Some((point, Some(radius))) => query.within_km(point, radius),
                Some((point, None)) => query.from_origin(point),
                None => query,
            };
            query.min_available_spots = min_spots;
            query.max_price = max_price;
            query.sort_by = sort_by;
            query.active_only = active_only;
            query
        })
}
