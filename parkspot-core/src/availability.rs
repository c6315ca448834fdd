//! Validated mutation of live spot counts.
//!
//! [`AvailabilityUpdater`] is the checked alternative to
//! [`LocationRepository::set_available_spots`]: every write is validated
//! against the facility's capacity under the repository's write lock.
//! [`OccupancySimulator`] drives random arrivals and departures for demos and
//! load tests.

use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::store::{LocationStore, StoreError};
use crate::{LocationRepository, ParkingLocation};

/// How out-of-range counts are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AvailabilityPolicy {
    /// Refuse counts outside `0..=total_spots`.
    #[default]
    Reject,
    /// Pull counts into `0..=total_spots`.
    Clamp,
}

impl AvailabilityPolicy {
    fn resolve(self, location: &ParkingLocation, requested: i64) -> Result<u32, AvailabilityError> {
        let total = location.total_spots;
        match self {
            Self::Reject => u32::try_from(requested)
                .ok()
                .filter(|count| *count <= total)
                .ok_or_else(|| AvailabilityError::OutOfRange {
                    location_id: location.id.clone(),
                    requested,
                    total,
                }),
            Self::Clamp => {
                let clamped = requested.clamp(0, i64::from(total));
                Ok(u32::try_from(clamped).unwrap_or(total))
            }
        }
    }
}

/// Errors returned by [`AvailabilityUpdater`] and [`OccupancySimulator`].
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// No location carries the id.
    #[error("unknown parking location {location_id:?}")]
    NotFound {
        /// Requested id.
        location_id: String,
    },
    /// The count falls outside the facility's capacity.
    #[error("{requested} available spots is outside 0..={total} for {location_id}")]
    OutOfRange {
        /// Location being updated.
        location_id: String,
        /// Count that was asked for.
        requested: i64,
        /// Facility capacity.
        total: u32,
    },
    /// The store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Capacity-checked writer for `available_spots`.
///
/// # Examples
///
/// ```rust
/// use parkspot_core::{AvailabilityError, AvailabilityUpdater, LocationRepository};
/// use parkspot_core::store::{KeyValueLocationStore, MemoryKeyValueStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let repository =
///     LocationRepository::new(KeyValueLocationStore::new(MemoryKeyValueStore::default()));
/// repository.initialize().await;
///
/// let updater = AvailabilityUpdater::new(&repository);
/// let err = updater.set_available_spots("loc-1", 200).await.unwrap_err();
/// assert!(matches!(err, AvailabilityError::OutOfRange { total: 150, .. }));
///
/// let updated = updater.adjust_available_spots("loc-1", -5).await.unwrap();
/// assert_eq!(updated.available_spots, 40);
/// # });
/// ```
#[derive(Debug)]
pub struct AvailabilityUpdater<'a, S> {
    repository: &'a LocationRepository<S>,
    policy: AvailabilityPolicy,
}

impl<'a, S: LocationStore> AvailabilityUpdater<'a, S> {
    /// Create an updater that rejects out-of-range counts.
    pub const fn new(repository: &'a LocationRepository<S>) -> Self {
        Self {
            repository,
            policy: AvailabilityPolicy::Reject,
        }
    }

    /// Replace the out-of-range policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: AvailabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active policy.
    pub const fn policy(&self) -> AvailabilityPolicy {
        self.policy
    }

    /// Set the free-spot count of `location_id` to `count`.
    ///
    /// Returns the stored record.
    pub async fn set_available_spots(
        &self,
        location_id: &str,
        count: i64,
    ) -> Result<ParkingLocation, AvailabilityError> {
        let policy = self.policy;
        let updated = self
            .repository
            .update_available_spots(location_id, |location| policy.resolve(location, count))
            .await?;
        debug!(
            "{} now has {} of {} spots free",
            updated.id, updated.available_spots, updated.total_spots
        );
        Ok(updated)
    }

    /// Shift the free-spot count of `location_id` by `delta`.
    ///
    /// Negative deltas record arrivals, positive ones departures.
    pub async fn adjust_available_spots(
        &self,
        location_id: &str,
        delta: i64,
    ) -> Result<ParkingLocation, AvailabilityError> {
        let policy = self.policy;
        self.repository
            .update_available_spots(location_id, |location| {
                let requested = i64::from(location.available_spots).saturating_add(delta);
                policy.resolve(location, requested)
            })
            .await
    }
}

/// Applies random occupancy changes to every active location.
///
/// Each tick draws a delta in `-max_swing..=max_swing` per active location and
/// clamps the result into capacity. Inactive locations are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancySimulator {
    max_swing: u32,
}

impl Default for OccupancySimulator {
    fn default() -> Self {
        Self { max_swing: 5 }
    }
}

impl OccupancySimulator {
    /// Create a simulator moving at most `max_swing` spots per tick.
    pub const fn new(max_swing: u32) -> Self {
        Self { max_swing }
    }

    /// Largest change applied to one location per tick.
    pub const fn max_swing(&self) -> u32 {
        self.max_swing
    }

    /// Apply one round of changes and return every stored location.
    pub async fn tick<S, R>(
        &self,
        repository: &LocationRepository<S>,
        rng: &mut R,
    ) -> Result<Vec<ParkingLocation>, AvailabilityError>
    where
        S: LocationStore,
        R: Rng + Send,
    {
        let swing = i64::from(self.max_swing);
        let locations = repository
            .update_all_available_spots(|location| {
                if !location.is_active {
                    return None;
                }
                let delta = rng.gen_range(-swing..=swing);
                let requested = i64::from(location.available_spots) + delta;
                AvailabilityPolicy::Clamp.resolve(location, requested).ok()
            })
            .await?;
        debug!("simulated occupancy for {} locations", locations.len());
        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingKeyValueStore, memory_repository};
    use crate::store::KeyValueLocationStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(150, 150)]
    #[case(-3, 0)]
    #[case(200, 150)]
    fn clamp_policy_pulls_counts_into_capacity(#[case] requested: i64, #[case] expected: u32) {
        let location = crate::seed::seed_locations().remove(0);
        assert_eq!(
            AvailabilityPolicy::Clamp.resolve(&location, requested).ok(),
            Some(expected)
        );
    }

    #[rstest]
    #[case(-1)]
    #[case(151)]
    #[case(i64::MAX)]
    fn reject_policy_refuses_out_of_range(#[case] requested: i64) {
        let location = crate::seed::seed_locations().remove(0);
        let err = AvailabilityPolicy::Reject
            .resolve(&location, requested)
            .expect_err("out of range");
        assert!(matches!(
            err,
            AvailabilityError::OutOfRange { requested: r, total: 150, .. } if r == requested
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_write_leaves_location_untouched() {
        let repository = memory_repository();
        repository.initialize().await;
        let updater = AvailabilityUpdater::new(&repository);
        assert!(updater.set_available_spots("loc-1", 200).await.is_err());
        let centre = repository.get_location_by_id("loc-1").await.expect("present");
        assert_eq!(centre.available_spots, 45);
    }

    #[rstest]
    #[tokio::test]
    async fn clamped_write_stores_capacity() {
        let repository = memory_repository();
        repository.initialize().await;
        let updater = AvailabilityUpdater::new(&repository).with_policy(AvailabilityPolicy::Clamp);
        let updated = updater
            .set_available_spots("loc-1", 200)
            .await
            .expect("clamped write");
        assert_eq!(updated.available_spots, 150);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let repository = memory_repository();
        repository.initialize().await;
        let err = AvailabilityUpdater::new(&repository)
            .adjust_available_spots("loc-404", 1)
            .await
            .expect_err("unknown id");
        assert!(matches!(err, AvailabilityError::NotFound { location_id } if location_id == "loc-404"));
    }

    #[rstest]
    #[tokio::test]
    async fn storage_failures_are_reported() {
        let repository =
            LocationRepository::new(KeyValueLocationStore::new(FailingKeyValueStore::reads()));
        let err = AvailabilityUpdater::new(&repository)
            .set_available_spots("loc-1", 3)
            .await
            .expect_err("read failure");
        assert!(matches!(err, AvailabilityError::Storage(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn adjustments_accumulate() {
        let repository = memory_repository();
        repository.initialize().await;
        let updater = AvailabilityUpdater::new(&repository);
        updater
            .adjust_available_spots("loc-3", -10)
            .await
            .expect("arrivals");
        let updated = updater
            .adjust_available_spots("loc-3", 4)
            .await
            .expect("departures");
        assert_eq!(updated.available_spots, 9);
        assert!(updater.adjust_available_spots("loc-3", -10).await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn simulator_keeps_counts_in_range_and_skips_inactive() {
        let repository = memory_repository();
        repository.initialize().await;
        let simulator = OccupancySimulator::new(300);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10 {
            let locations = simulator
                .tick(&repository, &mut rng)
                .await
                .expect("simulated tick");
            assert!(locations.iter().all(|l| l.available_spots <= l.total_spots));
        }
        let stadium = repository.get_location_by_id("loc-6").await.expect("present");
        assert_eq!(stadium.available_spots, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn zero_swing_changes_nothing() {
        let repository = memory_repository();
        repository.initialize().await;
        let before = repository.get_all_locations().await;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let after = OccupancySimulator::new(0)
            .tick(&repository, &mut rng)
            .await
            .expect("simulated tick");
        assert_eq!(before, after);
    }
}
