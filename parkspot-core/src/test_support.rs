//! Fakes shared by unit, behaviour and property tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tokio::sync::mpsc;

use crate::geolocation::{
    Geocoder, LocationPlatform, PermissionResponse, PlaceAddress, PlatformError, WatchOptions,
};
use crate::store::{KeyValueError, KeyValueLocationStore, KeyValueStore, MemoryKeyValueStore};
use crate::{Coordinates, LocationRepository};

/// Repository over a fresh in-memory store, seeded with the bundled dataset
/// on `initialize`.
pub fn memory_repository() -> LocationRepository<KeyValueLocationStore<MemoryKeyValueStore>> {
    LocationRepository::new(KeyValueLocationStore::new(MemoryKeyValueStore::default()))
}

/// [`KeyValueStore`] whose reads or writes always fail.
#[derive(Debug, Clone, Copy)]
pub struct FailingKeyValueStore {
    fail_reads: bool,
}

impl FailingKeyValueStore {
    /// Every `get` fails; `set` is never reached by well-behaved callers.
    pub const fn reads() -> Self {
        Self { fail_reads: true }
    }

    /// `get` reports an empty store and every `set` fails.
    pub const fn writes() -> Self {
        Self { fail_reads: false }
    }
}

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        if self.fail_reads {
            return Err(KeyValueError::read(key, io::Error::other("disk unreadable")));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, _value: String) -> Result<(), KeyValueError> {
        Err(KeyValueError::write(key, io::Error::other("disk full")))
    }
}

/// Scripted [`LocationPlatform`] and [`Geocoder`].
///
/// Live positions are pushed by the test through
/// [`ScriptedPlatform::push_position`].
#[derive(Debug)]
pub struct ScriptedPlatform {
    status: Mutex<PermissionResponse>,
    prompt_answer: PermissionResponse,
    position: Result<Coordinates, PlatformError>,
    places: Vec<(Coordinates, PlaceAddress)>,
    watchers: Mutex<Vec<mpsc::UnboundedSender<Coordinates>>>,
    watch_options: Mutex<Option<WatchOptions>>,
    prompts: AtomicUsize,
}

impl ScriptedPlatform {
    fn new(
        status: PermissionResponse,
        prompt_answer: PermissionResponse,
        position: Result<Coordinates, PlatformError>,
    ) -> Self {
        Self {
            status: Mutex::new(status),
            prompt_answer,
            position,
            places: Vec::new(),
            watchers: Mutex::new(Vec::new()),
            watch_options: Mutex::new(None),
            prompts: AtomicUsize::new(0),
        }
    }

    /// Permission already granted; the device sits at `position`.
    pub fn granted(position: Coordinates) -> Self {
        Self::new(
            PermissionResponse::granted(),
            PermissionResponse::granted(),
            Ok(position),
        )
    }

    /// Permission not yet asked; the prompt grants it.
    pub fn grants_on_prompt(position: Coordinates) -> Self {
        Self::new(
            PermissionResponse::undetermined(),
            PermissionResponse::granted(),
            Ok(position),
        )
    }

    /// The prompt refuses access.
    pub fn denied(can_ask_again: bool) -> Self {
        let status = if can_ask_again {
            PermissionResponse::undetermined()
        } else {
            PermissionResponse::denied(false)
        };
        Self::new(
            status,
            PermissionResponse::denied(can_ask_again),
            Err(PlatformError::PermissionDenied),
        )
    }

    /// Position reads and watches fail with `error`.
    #[must_use]
    pub fn failing_with(mut self, error: PlatformError) -> Self {
        self.position = Err(error);
        self
    }

    /// Register an address for geocoding in both directions.
    #[must_use]
    pub fn with_place(mut self, position: Coordinates, place: PlaceAddress) -> Self {
        self.places.push((position, place));
        self
    }

    /// Number of permission prompts shown so far.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent `watch_position` call.
    pub fn last_watch_options(&self) -> Option<WatchOptions> {
        *lock(&self.watch_options)
    }

    /// Send `position` to every live watcher and return how many received it.
    pub fn push_position(&self, position: Coordinates) -> usize {
        let mut watchers = lock(&self.watchers);
        watchers.retain(|watcher| watcher.send(position).is_ok());
        watchers.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl LocationPlatform for ScriptedPlatform {
    async fn permission_status(&self) -> Result<PermissionResponse, PlatformError> {
        Ok(*lock(&self.status))
    }

    async fn request_permission(&self) -> Result<PermissionResponse, PlatformError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        *lock(&self.status) = self.prompt_answer;
        Ok(self.prompt_answer)
    }

    async fn current_position(&self) -> Result<Coordinates, PlatformError> {
        self.position.clone()
    }

    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<BoxStream<'static, Coordinates>, PlatformError> {
        if let Err(err) = &self.position {
            return Err(err.clone());
        }
        *lock(&self.watch_options) = Some(options);
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.watchers).push(tx);
        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|position| (position, rx))
        })
        .boxed())
    }
}

#[async_trait]
impl Geocoder for ScriptedPlatform {
    async fn reverse_geocode(
        &self,
        position: Coordinates,
    ) -> Result<Option<PlaceAddress>, PlatformError> {
        Ok(self
            .places
            .iter()
            .find(|(known, _)| *known == position)
            .map(|(_, place)| place.clone()))
    }

    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, PlatformError> {
        Ok(self
            .places
            .iter()
            .find(|(_, place)| place.to_string().eq_ignore_ascii_case(address.trim()))
            .map(|(position, _)| *position))
    }
}
