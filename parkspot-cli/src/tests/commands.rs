//! End-to-end command runs against a temporary SQLite store.

use super::*;
use crate::init::InitConfig;
use crate::inventory::{PackagesConfig, StatusConfig};
use crate::search::{NearbyConfig, SearchConfig};
use crate::spots::SetSpotsConfig;
use helpers::{Workspace, capture, ids};
use parkspot_core::{AvailabilityError, AvailabilityPolicy, SearchQuery, SortKey};
use rstest::{fixture, rstest};
use serde_json::json;

const CENTRE: Coordinates = Coordinates::new(14.0723, -87.1921);

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn set_spots(
    workspace: &Workspace,
    location_id: &str,
    count: i64,
    policy: AvailabilityPolicy,
) -> Result<serde_json::Value, CliError> {
    let config = SetSpotsConfig {
        store: workspace.store(),
        location_id: location_id.to_owned(),
        count,
        policy,
    };
    capture(|writer| spots::run_set_spots_with(&config, writer))
}

fn status(workspace: &Workspace) -> serde_json::Value {
    let config = StatusConfig {
        store: workspace.store(),
    };
    capture(|writer| inventory::run_status_with(&config, writer)).expect("status runs")
}

#[rstest]
fn init_seeds_bundled_dataset(workspace: Workspace) {
    let config = InitConfig {
        store: workspace.store(),
        force: false,
        seed_file: None,
    };
    let report = capture(|writer| init::run_init_with(&config, writer)).expect("init runs");
    assert_eq!(report["locations"], json!(6));
    assert_eq!(report["packages"], json!(9));
    assert_eq!(report["forced"], json!(false));
    assert!(workspace.store().is_file());
}

#[rstest]
fn init_keeps_updates_unless_forced(workspace: Workspace) {
    set_spots(&workspace, "loc-1", 10, AvailabilityPolicy::Reject).expect("update applies");
    let mut config = InitConfig {
        store: workspace.store(),
        force: false,
        seed_file: None,
    };
    capture(|writer| init::run_init_with(&config, writer)).expect("init runs");
    assert_eq!(status(&workspace)["availableSpots"], json!(405));

    config.force = true;
    let report = capture(|writer| init::run_init_with(&config, writer)).expect("reseed runs");
    assert_eq!(report["forced"], json!(true));
    assert_eq!(status(&workspace)["availableSpots"], json!(440));
}

#[rstest]
fn init_reads_custom_seed_file(workspace: Workspace) {
    let seed = workspace.write(
        "seed.json",
        r#"{
            "locations": [{
                "id": "lot-a",
                "name": "Lot A",
                "address": "Main Street",
                "latitude": 14.0,
                "longitude": -87.0,
                "totalSpots": 10,
                "availableSpots": 4,
                "hourlyRate": 12.5,
                "isActive": true
            }]
        }"#,
    );
    let config = InitConfig {
        store: workspace.store(),
        force: false,
        seed_file: Some(seed),
    };
    let report = capture(|writer| init::run_init_with(&config, writer)).expect("init runs");
    assert_eq!(report["locations"], json!(1));
    assert_eq!(report["packages"], json!(0));

    let summary = status(&workspace);
    assert_eq!(summary["locationCount"], json!(1));
    assert_eq!(summary["occupiedSpots"], json!(6));
}

#[rstest]
fn search_sorts_and_filters(workspace: Workspace) {
    let config = SearchConfig {
        store: workspace.store(),
        query: SearchQuery::new()
            .with_max_price(30.0)
            .sorted_by(SortKey::Price)
            .active_only(),
    };
    let results = capture(|writer| search::run_search_with(&config, writer)).expect("search runs");
    assert_eq!(ids(&results), ["loc-3", "loc-1", "loc-2"]);
    assert!(results[0].get("distance").is_none());
}

#[rstest]
fn search_from_origin_reports_distances(workspace: Workspace) {
    let config = SearchConfig {
        store: workspace.store(),
        query: SearchQuery::new()
            .within_km(CENTRE, 2.0)
            .sorted_by(SortKey::Distance),
    };
    let results = capture(|writer| search::run_search_with(&config, writer)).expect("search runs");
    assert_eq!(ids(&results), ["loc-1", "loc-6", "loc-2"]);
    assert_eq!(results[0]["distance"], json!(0.0));
}

#[rstest]
fn nearby_lists_nearest_first(workspace: Workspace) {
    let config = NearbyConfig {
        store: workspace.store(),
        origin: CENTRE,
        radius_km: 2.0,
    };
    let results = capture(|writer| search::run_nearby_with(&config, writer)).expect("nearby runs");
    assert_eq!(ids(&results), ["loc-1", "loc-6", "loc-2"]);
}

#[rstest]
fn status_summarises_seeded_store(workspace: Workspace) {
    assert_eq!(
        status(&workspace),
        json!({
            "locationCount": 6,
            "totalSpots": 1100,
            "availableSpots": 440,
            "occupiedSpots": 660,
        })
    );
}

#[rstest]
fn packages_lists_only_that_location(workspace: Workspace) {
    let config = PackagesConfig {
        store: workspace.store(),
        location_id: "loc-1".into(),
    };
    let packages =
        capture(|writer| inventory::run_packages_with(&config, writer)).expect("packages run");
    let listed = packages.as_array().expect("JSON array");
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|item| item["locationId"] == json!("loc-1")));
}

#[rstest]
fn packages_for_unknown_location_fail(workspace: Workspace) {
    let config = PackagesConfig {
        store: workspace.store(),
        location_id: "loc-404".into(),
    };
    match capture(|writer| inventory::run_packages_with(&config, writer)) {
        Err(CliError::UnknownLocation { location_id }) => assert_eq!(location_id, "loc-404"),
        other => panic!("expected UnknownLocation, found {other:?}"),
    }
}

#[rstest]
fn set_spots_rejects_overfill_and_leaves_store_untouched(workspace: Workspace) {
    match set_spots(&workspace, "loc-1", 200, AvailabilityPolicy::Reject) {
        Err(CliError::Availability(AvailabilityError::OutOfRange {
            requested, total, ..
        })) => {
            assert_eq!(requested, 200);
            assert_eq!(total, 150);
        }
        other => panic!("expected OutOfRange, found {other:?}"),
    }
    assert_eq!(status(&workspace)["availableSpots"], json!(440));
}

#[rstest]
#[case(200, 150)]
#[case(-5, 0)]
#[case(90, 90)]
fn set_spots_clamps_into_capacity(
    workspace: Workspace,
    #[case] requested: i64,
    #[case] stored: u32,
) {
    let updated =
        set_spots(&workspace, "loc-1", requested, AvailabilityPolicy::Clamp).expect("clamped");
    assert_eq!(updated["id"], json!("loc-1"));
    assert_eq!(updated["availableSpots"], json!(stored));
}

#[rstest]
fn set_spots_on_unknown_location_fails(workspace: Workspace) {
    let err = set_spots(&workspace, "loc-404", 1, AvailabilityPolicy::Reject)
        .expect_err("unknown location");
    assert!(
        matches!(
            err,
            CliError::Availability(AvailabilityError::NotFound { .. })
        ),
        "{err:?}"
    );
}
