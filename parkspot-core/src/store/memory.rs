//! In-memory key-value backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueError, KeyValueStore};

/// Volatile [`KeyValueStore`] backed by a `HashMap`.
///
/// Useful for ephemeral sessions and as the fake behind repository tests. The
/// store counts successful writes so callers can verify that idempotent
/// operations leave it untouched.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryKeyValueStore {
    /// Create a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueError> {
        self.entries.write().await.insert(key.to_owned(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
