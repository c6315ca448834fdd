//! Permission-aware access to device position.

use std::sync::{Mutex, PoisonError};

use log::{debug, warn};

use super::{Geocoder, LocationPlatform, PermissionResponse, WatchOptions, WatchSubscription};
use crate::Coordinates;

/// Permission knowledge held by a [`GeolocationProvider`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    /// Nothing has been checked yet.
    #[default]
    Unknown,
    /// Location access is allowed.
    Granted,
    /// Access was refused but the user may be asked again.
    DeniedRetryable,
    /// Access was refused and only system settings can change that.
    DeniedPermanent,
}

impl From<&PermissionResponse> for PermissionState {
    fn from(response: &PermissionResponse) -> Self {
        match (response.granted, response.can_ask_again) {
            (true, _) => Self::Granted,
            (false, true) => Self::DeniedRetryable,
            (false, false) => Self::DeniedPermanent,
        }
    }
}

/// Device position with permission handling folded in.
///
/// Every failure degrades to `None`: callers carry on without location-based
/// features instead of failing.
#[derive(Debug)]
pub struct GeolocationProvider<P> {
    platform: P,
    options: WatchOptions,
    state: Mutex<PermissionState>,
}

impl<P: LocationPlatform> GeolocationProvider<P> {
    /// Wrap `platform` using the default watch cadence.
    pub fn new(platform: P) -> Self {
        Self::with_options(platform, WatchOptions::default())
    }

    /// Wrap `platform` with a custom watch cadence.
    pub fn with_options(platform: P, options: WatchOptions) -> Self {
        Self {
            platform,
            options,
            state: Mutex::new(PermissionState::Unknown),
        }
    }

    /// Borrow the wrapped platform.
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Cadence used by [`GeolocationProvider::watch_location`].
    pub const fn watch_options(&self) -> WatchOptions {
        self.options
    }

    /// Last known permission state.
    pub fn permission_state(&self) -> PermissionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, response: &PermissionResponse) {
        let next = PermissionState::from(response);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            debug!("location permission {:?} -> {next:?}", *state);
            *state = next;
        }
    }

    /// Prompt for location access.
    ///
    /// A platform failure is reported as a retryable denial.
    pub async fn request_permission(&self) -> PermissionResponse {
        let response = match self.platform.request_permission().await {
            Ok(response) => response,
            Err(err) => {
                warn!("location permission request failed: {err}");
                PermissionResponse::denied(true)
            }
        };
        self.record(&response);
        response
    }

    /// Check permission and prompt when it is not yet granted.
    async fn ensure_permission(&self) -> bool {
        match self.platform.permission_status().await {
            Ok(response) if response.granted => {
                self.record(&response);
                return true;
            }
            Ok(_) => {}
            Err(err) => debug!("permission check failed, prompting instead: {err}"),
        }
        self.request_permission().await.granted
    }

    /// Read the device position once.
    ///
    /// Returns `None` when permission is refused or the platform fails.
    pub async fn current_location(&self) -> Option<Coordinates> {
        if !self.ensure_permission().await {
            debug!("no location permission; continuing without a position");
            return None;
        }
        match self.platform.current_position().await {
            Ok(position) => Some(position),
            Err(err) => {
                warn!("could not read the device position: {err}");
                None
            }
        }
    }

    /// Deliver live positions to `callback` until the returned handle is
    /// stopped or dropped.
    ///
    /// Returns `None` when no Tokio runtime is running, permission is refused
    /// or the feed cannot start.
    pub async fn watch_location<F>(&self, callback: F) -> Option<WatchSubscription>
    where
        F: FnMut(Coordinates) + Send + 'static,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("no Tokio runtime is running; not watching position");
            return None;
        }
        if !self.ensure_permission().await {
            debug!("no location permission; not watching position");
            return None;
        }
        match self.platform.watch_position(self.options).await {
            Ok(positions) => Some(WatchSubscription::spawn(positions, callback)),
            Err(err) => {
                warn!("could not start watching the device position: {err}");
                None
            }
        }
    }
}

impl<P: LocationPlatform + Geocoder> GeolocationProvider<P> {
    /// Human-readable address for `position`, if one can be found.
    pub async fn address_from_coordinates(&self, position: Coordinates) -> Option<String> {
        match self.platform.reverse_geocode(position).await {
            Ok(place) => place
                .map(|place| place.to_string())
                .filter(|address| !address.is_empty()),
            Err(err) => {
                warn!("reverse geocoding failed: {err}");
                None
            }
        }
    }

    /// Position of `address`, if it can be resolved.
    pub async fn coordinates_from_address(&self, address: &str) -> Option<Coordinates> {
        match self.platform.geocode(address).await {
            Ok(position) => position,
            Err(err) => {
                warn!("geocoding {address:?} failed: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::{PlaceAddress, PlatformError};
    use crate::test_support::ScriptedPlatform;
    use rstest::rstest;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const CENTRE: Coordinates = Coordinates::new(14.0723, -87.1921);

    #[rstest]
    #[case(PermissionResponse::granted(), PermissionState::Granted)]
    #[case(PermissionResponse::denied(true), PermissionState::DeniedRetryable)]
    #[case(PermissionResponse::denied(false), PermissionState::DeniedPermanent)]
    fn responses_map_to_states(#[case] response: PermissionResponse, #[case] state: PermissionState) {
        assert_eq!(PermissionState::from(&response), state);
    }

    #[rstest]
    #[tokio::test]
    async fn granted_platform_returns_position_without_prompting() {
        let provider = GeolocationProvider::new(ScriptedPlatform::granted(CENTRE));
        assert_eq!(provider.current_location().await, Some(CENTRE));
        assert_eq!(provider.platform().prompt_count(), 0);
        assert_eq!(provider.permission_state(), PermissionState::Granted);
    }

    #[rstest]
    #[tokio::test]
    async fn undetermined_permission_prompts_once() {
        let provider = GeolocationProvider::new(ScriptedPlatform::grants_on_prompt(CENTRE));
        assert_eq!(provider.permission_state(), PermissionState::Unknown);
        assert_eq!(provider.current_location().await, Some(CENTRE));
        assert_eq!(provider.current_location().await, Some(CENTRE));
        assert_eq!(provider.platform().prompt_count(), 1);
    }

    #[rstest]
    #[case(true, PermissionState::DeniedRetryable)]
    #[case(false, PermissionState::DeniedPermanent)]
    #[tokio::test]
    async fn denial_yields_no_position(#[case] can_ask_again: bool, #[case] state: PermissionState) {
        let provider = GeolocationProvider::new(ScriptedPlatform::denied(can_ask_again));
        assert_eq!(provider.current_location().await, None);
        assert_eq!(provider.permission_state(), state);
    }

    #[rstest]
    #[tokio::test]
    async fn platform_failure_yields_no_position() {
        let platform = ScriptedPlatform::granted(CENTRE).failing_with(PlatformError::Timeout);
        let provider = GeolocationProvider::new(platform);
        assert_eq!(provider.current_location().await, None);
    }

    #[rstest]
    #[tokio::test]
    async fn watch_requires_permission() {
        let provider = GeolocationProvider::new(ScriptedPlatform::denied(false));
        assert!(provider.watch_location(|_| {}).await.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn watch_uses_default_cadence_and_delivers_positions() {
        let provider = GeolocationProvider::new(ScriptedPlatform::granted(CENTRE));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = provider
            .watch_location(move |position| {
                let _ = tx.send(position);
            })
            .await
            .expect("subscription");
        assert_eq!(
            provider.platform().last_watch_options(),
            Some(WatchOptions::default())
        );

        let moved = Coordinates::new(14.08, -87.2);
        assert_eq!(provider.platform().push_position(moved), 1);
        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("delivered in time");
        assert_eq!(received, Some(moved));
        assert!(subscription.is_active());
        subscription.stop();
    }

    #[rstest]
    fn watch_outside_a_runtime_is_refused() {
        use futures_util::FutureExt;

        let provider = GeolocationProvider::new(ScriptedPlatform::granted(CENTRE));
        let outcome = provider.watch_location(|_| {}).now_or_never();
        assert!(matches!(outcome, Some(None)));
        assert_eq!(provider.platform().last_watch_options(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn stopped_watch_delivers_nothing() {
        let provider = GeolocationProvider::new(ScriptedPlatform::granted(CENTRE));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = provider
            .watch_location(move |position| {
                let _ = tx.send(position);
            })
            .await
            .expect("subscription");
        subscription.stop();

        // Once the task is gone the sender inside the callback is dropped.
        let closed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("channel closes");
        assert_eq!(closed, None);
        assert_eq!(provider.platform().push_position(CENTRE), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn geocoding_is_best_effort() {
        let place = PlaceAddress {
            street: Some("Avenida Cervantes".into()),
            city: Some("Tegucigalpa".into()),
            region: None,
            country: Some("Honduras".into()),
        };
        let platform = ScriptedPlatform::granted(CENTRE).with_place(CENTRE, place);
        let provider = GeolocationProvider::new(platform);

        assert_eq!(
            provider.address_from_coordinates(CENTRE).await.as_deref(),
            Some("Avenida Cervantes, Tegucigalpa, Honduras")
        );
        assert_eq!(
            provider
                .coordinates_from_address("Avenida Cervantes, Tegucigalpa, Honduras")
                .await,
            Some(CENTRE)
        );
        assert_eq!(
            provider
                .address_from_coordinates(Coordinates::new(0.0, 0.0))
                .await,
            None
        );
        assert_eq!(provider.coordinates_from_address("Atlantis").await, None);
    }
}
