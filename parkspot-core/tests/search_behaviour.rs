//! Behavioural tests for the search engine against the seed dataset.

use std::cell::RefCell;

use parkspot_core::store::{KeyValueLocationStore, MemoryKeyValueStore};
use parkspot_core::{
    Coordinates, LocationMatch, LocationRepository, SearchEngine, SearchQuery, SortKey,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

const CENTRE: Coordinates = Coordinates::new(14.0723, -87.1921);

/// Shared state for search scenarios.
#[derive(Debug)]
struct SearchWorld {
    runtime: Runtime,
    repository: LocationRepository<KeyValueLocationStore<MemoryKeyValueStore>>,
    results: RefCell<Vec<LocationMatch>>,
}

impl SearchWorld {
    fn new() -> Self {
        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("build runtime"),
            repository: LocationRepository::new(KeyValueLocationStore::new(
                MemoryKeyValueStore::default(),
            )),
            results: RefCell::new(Vec::new()),
        }
    }

    fn search(&self, query: &SearchQuery) {
        let engine = SearchEngine::new(&self.repository);
        let results = self.runtime.block_on(engine.search_locations(query));
        self.results.replace(results);
    }

    fn ids(&self) -> Vec<String> {
        self.results
            .borrow()
            .iter()
            .map(|m| m.location.id.clone())
            .collect()
    }
}

#[fixture]
fn world() -> SearchWorld {
    SearchWorld::new()
}

#[given("the seeded parking locations")]
fn given_seeded(world: &SearchWorld) {
    world.runtime.block_on(world.repository.initialize());
}

#[when("I search with a maximum price of 30")]
fn when_max_price_30(world: &SearchWorld) {
    world.search(&SearchQuery::new().with_max_price(30.0));
}

#[when("I search with a maximum price of 20")]
fn when_max_price_20(world: &SearchWorld) {
    world.search(&SearchQuery::new().with_max_price(20.0));
}

#[when("I search for at least 50 free spots")]
fn when_min_spots_50(world: &SearchWorld) {
    world.search(&SearchQuery::new().with_min_available_spots(50));
}

#[when("I search for at least 40 free spots")]
fn when_min_spots_40(world: &SearchWorld) {
    world.search(&SearchQuery::new().with_min_available_spots(40));
}

#[when("I search from the coordinates of loc-1")]
fn when_from_centre(world: &SearchWorld) {
    world.search(&SearchQuery::new().from_origin(CENTRE));
}

#[when("I look for locations within 2 km of loc-1")]
fn when_nearby(world: &SearchWorld) {
    let engine = SearchEngine::new(&world.repository);
    let results = world.runtime.block_on(engine.nearby_locations(CENTRE, 2.0));
    world.results.replace(results);
}

#[when("I search sorted by availability")]
fn when_sorted_by_availability(world: &SearchWorld) {
    world.search(&SearchQuery::new().sorted_by(SortKey::Availability));
}

#[then("loc-1 is among the results")]
fn then_includes_centre(world: &SearchWorld) {
    assert!(world.ids().iter().any(|id| id == "loc-1"));
}

#[then("loc-1 is not among the results")]
fn then_excludes_centre(world: &SearchWorld) {
    assert!(world.ids().iter().all(|id| id != "loc-1"));
}

#[then("every result costs at most 30 per hour")]
fn then_price_bound(world: &SearchWorld) {
    assert!(
        world
            .results
            .borrow()
            .iter()
            .all(|m| m.location.hourly_rate <= 30.0)
    );
}

#[then("every result has at least 50 free spots")]
fn then_spots_bound(world: &SearchWorld) {
    let results = world.results.borrow();
    assert!(!results.is_empty());
    assert!(results.iter().all(|m| m.location.available_spots >= 50));
}

#[then("loc-1 is zero kilometres away")]
fn then_centre_is_origin(world: &SearchWorld) {
    let results = world.results.borrow();
    let centre = results
        .iter()
        .find(|m| m.location.id == "loc-1")
        .expect("loc-1 returned");
    let distance = centre.distance_km.expect("distance annotated");
    assert!(distance.abs() < 1e-9, "distance was {distance}");
}

#[then("every other location is a positive distance away")]
fn then_others_positive(world: &SearchWorld) {
    let results = world.results.borrow();
    assert_eq!(results.len(), 6);
    for candidate in results.iter().filter(|m| m.location.id != "loc-1") {
        assert!(candidate.distance_km.is_some_and(|d| d > 0.0));
    }
}

#[then("the results are loc-1, loc-6 and loc-2 in that order")]
fn then_nearby_order(world: &SearchWorld) {
    assert_eq!(world.ids(), ["loc-1", "loc-6", "loc-2"]);
}

#[then("the results never gain free spots down the list")]
fn then_availability_descends(world: &SearchWorld) {
    let results = world.results.borrow();
    assert!(
        results
            .windows(2)
            .all(|pair| pair[0].location.available_spots >= pair[1].location.available_spots)
    );
}

#[scenario(path = "tests/features/search.feature", index = 0)]
fn price_ceiling_includes_centre(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search.feature", index = 1)]
fn price_ceiling_excludes_centre(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search.feature", index = 2)]
fn min_spots_excludes_centre(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search.feature", index = 3)]
fn min_spots_includes_centre(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search.feature", index = 4)]
fn distances_from_centre(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search.feature", index = 5)]
fn nearby_order(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search.feature", index = 6)]
fn availability_sort(world: SearchWorld) {
    let _ = world;
}
