//! Persistence traits for parking records.
//!
//! Two layers keep the backend swappable:
//! - [`KeyValueStore`] is the raw async string store (SQLite, files, memory or
//!   anything the host platform offers).
//! - [`LocationStore`] reads and writes whole typed collections. The three
//!   [`Collection`] markers map each record type to its fixed key.
//!
//! [`KeyValueLocationStore`] bridges the two by encoding every collection as a
//! JSON array under its key.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{LocationPackage, ParkingLocation, UserLocationPackage};

#[cfg(feature = "store-fs")]
mod fs;
mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-fs")]
pub use fs::{FsKeyValueStore, FsKeyValueStoreError};
pub use memory::MemoryKeyValueStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteKeyValueStore, SqliteKeyValueStoreError};

/// Boxed error raised by a key-value backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum KeyValueError {
    /// Reading a key failed.
    #[error("failed to read {key:?} from the store: {source}")]
    Read {
        /// Key being read.
        key: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },
    /// Writing a key failed.
    #[error("failed to write {key:?} to the store: {source}")]
    Write {
        /// Key being written.
        key: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },
}

impl KeyValueError {
    /// Wrap a backend failure raised while reading `key`.
    pub fn read(key: &str, source: impl Into<BoxError>) -> Self {
        Self::Read {
            key: key.to_owned(),
            source: source.into(),
        }
    }

    /// Wrap a backend failure raised while writing `key`.
    pub fn write(key: &str, source: impl Into<BoxError>) -> Self {
        Self::Write {
            key: key.to_owned(),
            source: source.into(),
        }
    }
}

/// Generic async string store.
///
/// # Examples
///
/// ```rust
/// use parkspot_core::store::{KeyValueStore, MemoryKeyValueStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = MemoryKeyValueStore::default();
/// store.set("greeting", "hola".to_owned()).await?;
/// assert_eq!(store.get("greeting").await?.as_deref(), Some("hola"));
/// assert_eq!(store.get("missing").await?, None);
/// # Ok::<(), parkspot_core::store::KeyValueError>(())
/// # }).unwrap();
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Return the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueError>;
}

/// A named collection of records held by a [`LocationStore`].
pub trait Collection: Send + Sync + 'static {
    /// Fixed key the collection is stored under.
    const KEY: &'static str;
    /// Record type held by the collection.
    type Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
}

/// Parking facilities, stored under `locations`.
#[derive(Debug)]
pub enum Locations {}

/// Package catalogue, stored under `packages`.
#[derive(Debug)]
pub enum Packages {}

/// User balances, stored under `user_packages`.
#[derive(Debug)]
pub enum UserPackages {}

impl Collection for Locations {
    const KEY: &'static str = "locations";
    type Record = ParkingLocation;
}

impl Collection for Packages {
    const KEY: &'static str = "packages";
    type Record = LocationPackage;
}

impl Collection for UserPackages {
    const KEY: &'static str = "user_packages";
    type Record = UserLocationPackage;
}

/// Errors raised by a [`LocationStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying key-value backend failed.
    #[error(transparent)]
    Backend(#[from] KeyValueError),
    /// Stored JSON could not be decoded into records.
    #[error("failed to decode the {key} collection: {source}")]
    Decode {
        /// Collection key.
        key: &'static str,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Records could not be encoded as JSON.
    #[error("failed to encode the {key} collection: {source}")]
    Encode {
        /// Collection key.
        key: &'static str,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// Typed access to the three record collections.
///
/// `load` distinguishes a missing collection (`Ok(None)`) from an empty one
/// (`Ok(Some(vec![]))`); the repository treats both as "not seeded".
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Read every record of collection `C`.
    async fn load<C: Collection>(&self) -> Result<Option<Vec<C::Record>>, StoreError>;

    /// Replace collection `C` with `records`.
    async fn save<C: Collection>(&self, records: &[C::Record]) -> Result<(), StoreError>;
}

/// [`LocationStore`] that keeps each collection as a JSON array in a
/// [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct KeyValueLocationStore<K> {
    backend: K,
}

impl<K: KeyValueStore> KeyValueLocationStore<K> {
    /// Wrap a key-value backend.
    pub const fn new(backend: K) -> Self {
        Self { backend }
    }

    /// Borrow the underlying backend.
    pub const fn backend(&self) -> &K {
        &self.backend
    }
}

#[async_trait]
impl<K: KeyValueStore> LocationStore for KeyValueLocationStore<K> {
    async fn load<C: Collection>(&self) -> Result<Option<Vec<C::Record>>, StoreError> {
        let Some(raw) = self.backend.get(C::KEY).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: C::KEY,
                source,
            })
    }

    async fn save<C: Collection>(&self, records: &[C::Record]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records).map_err(|source| StoreError::Encode {
            key: C::KEY,
            source,
        })?;
        self.backend.set(C::KEY, raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{seed_locations, seed_packages};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn missing_collection_loads_as_none() {
        let store = KeyValueLocationStore::new(MemoryKeyValueStore::default());
        let loaded = store.load::<Locations>().await.expect("load");
        assert!(loaded.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn collections_are_written_under_fixed_keys() {
        let store = KeyValueLocationStore::new(MemoryKeyValueStore::default());
        store
            .save::<Locations>(&seed_locations())
            .await
            .expect("save locations");
        store
            .save::<Packages>(&seed_packages())
            .await
            .expect("save packages");
        store.save::<UserPackages>(&[]).await.expect("save balances");

        let backend = store.backend();
        let raw = backend.get("locations").await.expect("get").expect("present");
        assert!(raw.starts_with('['));
        assert!(raw.contains("\"availableSpots\":45"));
        assert!(backend.get("packages").await.expect("get").is_some());
        assert_eq!(
            backend.get("user_packages").await.expect("get").as_deref(),
            Some("[]")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn corrupt_json_reports_decode_error() {
        let backend = MemoryKeyValueStore::default();
        backend
            .set("packages", "{not json".to_owned())
            .await
            .expect("set");
        let store = KeyValueLocationStore::new(backend);
        let err = store.load::<Packages>().await.expect_err("decode failure");
        assert!(matches!(err, StoreError::Decode { key: "packages", .. }));
    }
}
