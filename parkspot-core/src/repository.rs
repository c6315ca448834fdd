//! Single source of truth for parking records.
//!
//! The repository favours availability over strictness: storage failures are
//! logged and surface as empty collections or `false`, never as errors. The
//! one exception is the crate-internal availability update path, which reports
//! typed errors to [`AvailabilityUpdater`](crate::AvailabilityUpdater).
//!
//! Writers are serialised by an async mutex, so seeding and read-modify-write
//! updates issued through one repository never interleave. Separate processes
//! sharing a backend are not coordinated.

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::availability::AvailabilityError;
use crate::store::{Locations, LocationStore, Packages, StoreError, UserPackages};
use crate::{LocationPackage, ParkingLocation, SeedDataset, UserLocationPackage};

/// Reads and writes parking records through a [`LocationStore`].
///
/// # Examples
///
/// ```rust
/// use parkspot_core::LocationRepository;
/// use parkspot_core::store::{KeyValueLocationStore, MemoryKeyValueStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let repository =
///     LocationRepository::new(KeyValueLocationStore::new(MemoryKeyValueStore::default()));
/// repository.initialize().await;
/// let centre = repository.get_location_by_id("loc-1").await.expect("seeded");
/// assert_eq!(centre.total_spots, 150);
/// # });
/// ```
#[derive(Debug)]
pub struct LocationRepository<S> {
    store: S,
    seed: SeedDataset,
    write_lock: Mutex<()>,
}

impl<S: LocationStore> LocationRepository<S> {
    /// Create a repository that seeds the bundled dataset.
    pub fn new(store: S) -> Self {
        Self::with_seed(store, SeedDataset::default())
    }

    /// Create a repository that seeds `seed` instead of the bundled dataset.
    pub fn with_seed(store: S, seed: SeedDataset) -> Self {
        Self {
            store,
            seed,
            write_lock: Mutex::new(()),
        }
    }

    /// Borrow the backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Seed the store unless it already holds locations.
    ///
    /// An absent or empty `locations` collection, or one that no longer
    /// decodes, counts as unseeded. A backend read failure leaves the store
    /// untouched. Repeated calls are no-ops once data is present.
    pub async fn initialize(&self) {
        let _guard = self.write_lock.lock().await;
        match self.store.load::<Locations>().await {
            Ok(Some(existing)) if !existing.is_empty() => {
                debug!("store already holds {} locations", existing.len());
                return;
            }
            Ok(_) => debug!("store holds no locations; seeding"),
            Err(err @ StoreError::Decode { .. }) => {
                warn!("stored locations are unreadable, reseeding: {err}");
            }
            Err(err) => {
                warn!("could not inspect stored locations, skipping seed: {err}");
                return;
            }
        }
        if let Err(err) = self.write_seed().await {
            warn!("seeding the store failed: {err}");
        }
    }

    /// Overwrite all three collections with the seed dataset.
    pub async fn force_reseed(&self) {
        let _guard = self.write_lock.lock().await;
        if let Err(err) = self.write_seed().await {
            warn!("reseeding the store failed: {err}");
        }
    }

    async fn write_seed(&self) -> Result<(), StoreError> {
        self.store.save::<Packages>(&self.seed.packages).await?;
        self.store
            .save::<UserPackages>(&self.seed.user_packages)
            .await?;
        // Locations go last: their presence marks the store as seeded.
        self.store.save::<Locations>(&self.seed.locations).await?;
        debug!(
            "seeded {} locations and {} packages",
            self.seed.locations.len(),
            self.seed.packages.len()
        );
        Ok(())
    }

    /// Every stored location, or an empty list when none can be read.
    pub async fn get_all_locations(&self) -> Vec<ParkingLocation> {
        self.load_or_empty::<Locations>().await
    }

    /// Look up a location by identifier.
    pub async fn get_location_by_id(&self, id: &str) -> Option<ParkingLocation> {
        self.get_all_locations()
            .await
            .into_iter()
            .find(|location| location.id == id)
    }

    /// Every stored package.
    pub async fn get_all_packages(&self) -> Vec<LocationPackage> {
        self.load_or_empty::<Packages>().await
    }

    /// Packages sold at `location_id`.
    pub async fn get_packages_by_location(&self, location_id: &str) -> Vec<LocationPackage> {
        let mut packages = self.get_all_packages().await;
        packages.retain(|package| package.location_id == location_id);
        packages
    }

    /// Balances held by `user_id`.
    pub async fn get_user_packages(&self, user_id: &str) -> Vec<UserLocationPackage> {
        let mut balances = self.load_or_empty::<UserPackages>().await;
        balances.retain(|balance| balance.user_id == user_id);
        balances
    }

    /// Add a new location. Returns `false` when the record fails
    /// [`ParkingLocation::validate`], the id is taken or the write fails.
    pub async fn create_location(&self, location: ParkingLocation) -> bool {
        if let Err(err) = location.validate() {
            debug!("refusing location {:?}: {err}", location.id);
            return false;
        }
        let _guard = self.write_lock.lock().await;
        let mut locations = match self.store.load::<Locations>().await {
            Ok(found) => found.unwrap_or_default(),
            Err(err) => {
                warn!("could not read locations before creating {}: {err}", location.id);
                return false;
            }
        };
        if locations.iter().any(|existing| existing.id == location.id) {
            debug!("location {} already exists", location.id);
            return false;
        }
        let id = location.id.clone();
        locations.push(location);
        match self.store.save::<Locations>(&locations).await {
            Ok(()) => true,
            Err(err) => {
                warn!("could not persist new location {id}: {err}");
                false
            }
        }
    }

    /// Overwrite the free-spot count of one location.
    ///
    /// Returns `false` when the id is unknown or the write fails. The count is
    /// stored as given, even above `total_spots`; callers that need the
    /// capacity check go through [`AvailabilityUpdater`](crate::AvailabilityUpdater).
    pub async fn set_available_spots(&self, location_id: &str, count: u32) -> bool {
        match self
            .update_available_spots(location_id, |_| Ok(count))
            .await
        {
            Ok(_) => true,
            Err(AvailabilityError::Storage(err)) => {
                warn!("could not update spots for {location_id}: {err}");
                false
            }
            Err(err) => {
                debug!("spot update rejected: {err}");
                false
            }
        }
    }

    /// Read-modify-write one location's free spots under the write lock.
    pub(crate) async fn update_available_spots<F>(
        &self,
        location_id: &str,
        resolve: F,
    ) -> Result<ParkingLocation, AvailabilityError>
    where
        F: FnOnce(&ParkingLocation) -> Result<u32, AvailabilityError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut locations = self.store.load::<Locations>().await?.unwrap_or_default();
        let location = locations
            .iter_mut()
            .find(|location| location.id == location_id)
            .ok_or_else(|| AvailabilityError::NotFound {
                location_id: location_id.to_owned(),
            })?;
        location.available_spots = resolve(location)?;
        let updated = location.clone();
        self.store.save::<Locations>(&locations).await?;
        Ok(updated)
    }

    /// Read-modify-write every location's free spots in one store write.
    ///
    /// `resolve` returns `None` to leave a location unchanged.
    pub(crate) async fn update_all_available_spots<F>(
        &self,
        mut resolve: F,
    ) -> Result<Vec<ParkingLocation>, StoreError>
    where
        F: FnMut(&ParkingLocation) -> Option<u32> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut locations = self.store.load::<Locations>().await?.unwrap_or_default();
        for location in &mut locations {
            if let Some(count) = resolve(location) {
                location.available_spots = count;
            }
        }
        self.store.save::<Locations>(&locations).await?;
        Ok(locations)
    }

    async fn load_or_empty<C>(&self) -> Vec<C::Record>
    where
        C: crate::store::Collection,
    {
        match self.store.load::<C>().await {
            Ok(records) => records.unwrap_or_default(),
            Err(err) => {
                warn!("could not read the {} collection: {err}", C::KEY);
                Vec::new()
            }
        }
    }
}
