//! File-per-key backend built on `parkspot-fs`.
//!
//! Each key is stored as `<root>/<key>.json`. Writes go through a scratch file
//! and a rename, so a crash mid-write leaves the previous value intact.

use std::io;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use parkspot_fs::{ensure_dir, read_optional_string, write_string_atomic};
use thiserror::Error;

use super::{KeyValueError, KeyValueStore};

const FILE_EXTENSION: &str = "json";

/// Error raised while opening an [`FsKeyValueStore`].
#[derive(Debug, Error)]
pub enum FsKeyValueStoreError {
    /// The root directory could not be created.
    #[error("failed to create store directory {path}: {source}")]
    CreateRoot {
        /// Requested root directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// [`KeyValueStore`] keeping one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FsKeyValueStore {
    root: Utf8PathBuf,
}

impl FsKeyValueStore {
    /// Open the store rooted at `root`, creating the directory when missing.
    pub fn open(root: impl Into<Utf8PathBuf>) -> Result<Self, FsKeyValueStoreError> {
        let root = root.into();
        ensure_dir(&root).map_err(|source| FsKeyValueStoreError::CreateRoot {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Directory holding the key files.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Option<Utf8PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| self.root.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

fn invalid_key(key: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("key {key:?} is not a plain file name"),
    )
}

#[async_trait]
impl KeyValueStore for FsKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| KeyValueError::read(key, invalid_key(key)))?;
        read_optional_string(&path).map_err(|source| KeyValueError::read(key, source))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| KeyValueError::write(key, invalid_key(key)))?;
        write_string_atomic(&path, &value).map_err(|source| KeyValueError::write(key, source))
    }
}
