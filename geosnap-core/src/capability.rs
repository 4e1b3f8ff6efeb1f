//! Device capability seams: geolocation, network quality, viewport
//! visibility.
//!
//! Every capability is an explicit object handed to its consumer, never
//! ambient global state, and every subscribe call returns a
//! [`Subscription`] disposer so teardown is deterministic. The reference
//! implementations here back the shell and the test suites; real device
//! bindings implement the same traits.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::error::CapabilityError;
use crate::geo::Geotag;
use crate::network::NetworkProfile;

/// Identity of a tracked gallery item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A region of display space, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Region width.
    pub width: f32,
    /// Region height.
    pub height: f32,
}

/// Options controlling when a visibility crossing fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityOptions {
    /// Proximity margin ahead of the visible viewport, in pixels.
    pub margin_px: f32,
    /// Minimum visible-area fraction before the crossing fires.
    pub min_visible_fraction: f32,
}

impl Default for VisibilityOptions {
    /// 100 px margin and 0.1 visible fraction, the deferred-loading defaults.
    fn default() -> Self {
        Self {
            margin_px: 100.0,
            min_visible_fraction: 0.1,
        }
    }
}

/// Disposer handle returned by every subscribe call.
///
/// Disposing (or dropping) the handle guarantees the underlying callback
/// can no longer fire against the subscriber's state.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a cancellation action.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the subscription now.
    pub fn dispose(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// One-shot device geolocation.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Sample the current position once.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::PermissionDenied`] when access is denied
    /// and [`CapabilityError::Unavailable`] when the device has no
    /// geolocation capability. Callers fall back to [`Geotag::default`].
    async fn sample(&self) -> Result<Geotag, CapabilityError>;
}

/// Provider reporting a fixed position, for shells and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation(pub Geotag);

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn sample(&self) -> Result<Geotag, CapabilityError> {
        Ok(self.0)
    }
}

/// Provider that always reports a denied permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocation;

#[async_trait]
impl GeolocationProvider for DeniedGeolocation {
    async fn sample(&self) -> Result<Geotag, CapabilityError> {
        Err(CapabilityError::PermissionDenied(
            "location access denied".to_string(),
        ))
    }
}

/// Coarse network-quality capability.
pub trait NetworkMonitor: Send + Sync {
    /// Latest observed profile, or `None` when the capability is
    /// unavailable (the advisory feature is then simply inactive).
    fn profile(&self) -> Option<NetworkProfile>;

    /// Subscribe to change notifications, delivered on `sink` until the
    /// returned handle is disposed.
    fn subscribe(&self, sink: UnboundedSender<NetworkProfile>) -> Subscription;
}

#[derive(Debug, Default)]
struct StaticMonitorInner {
    profile: Option<NetworkProfile>,
    sinks: HashMap<Uuid, UnboundedSender<NetworkProfile>>,
}

/// Monitor with a host-settable profile, for shells and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticNetworkMonitor {
    inner: Arc<Mutex<StaticMonitorInner>>,
}

impl StaticNetworkMonitor {
    /// Create a monitor with an initial profile (`None` = unavailable).
    #[must_use]
    pub fn new(profile: Option<NetworkProfile>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StaticMonitorInner {
                profile,
                sinks: HashMap::new(),
            })),
        }
    }

    /// Replace the profile and notify all live subscribers.
    pub fn set_profile(&self, profile: NetworkProfile) {
        let mut inner = lock(&self.inner);
        inner.profile = Some(profile);
        inner.sinks.retain(|_, sink| sink.send(profile).is_ok());
    }
}

impl NetworkMonitor for StaticNetworkMonitor {
    fn profile(&self) -> Option<NetworkProfile> {
        lock(&self.inner).profile
    }

    fn subscribe(&self, sink: UnboundedSender<NetworkProfile>) -> Subscription {
        let key = Uuid::new_v4();
        lock(&self.inner).sinks.insert(key, sink);

        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            lock(&inner).sinks.remove(&key);
        })
    }
}

/// Viewport-visibility capability.
///
/// Registers a region plus proximity/threshold options and notifies once
/// when the threshold is crossed.
pub trait VisibilityTracker: Send + Sync {
    /// Register a region for the item. The tracker delivers at most one
    /// crossing notification while the returned handle is live.
    fn observe(&self, id: ItemId, region: Region, options: &VisibilityOptions) -> Subscription;
}

/// Host-driven tracker: the embedding shell (or a test) reports viewport
/// crossings explicitly via [`cross`](Self::cross). Crossings for disposed
/// observations are dropped, so stale callbacks can never fire against
/// removed items.
#[derive(Debug, Clone)]
pub struct ManualVisibilityTracker {
    observed: Arc<Mutex<HashSet<ItemId>>>,
    events: UnboundedSender<ItemId>,
}

impl ManualVisibilityTracker {
    /// Create a tracker that delivers crossings on the given channel.
    #[must_use]
    pub fn new(events: UnboundedSender<ItemId>) -> Self {
        Self {
            observed: Arc::new(Mutex::new(HashSet::new())),
            events,
        }
    }

    /// Report that an item's region crossed the visibility threshold.
    ///
    /// Returns `false` (and delivers nothing) when the item's observation
    /// has been disposed or was never registered.
    pub fn cross(&self, id: ItemId) -> bool {
        if !lock(&self.observed).contains(&id) {
            return false;
        }
        self.events.send(id).is_ok()
    }

    /// Number of live observations.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        lock(&self.observed).len()
    }
}

impl VisibilityTracker for ManualVisibilityTracker {
    fn observe(&self, id: ItemId, region: Region, options: &VisibilityOptions) -> Subscription {
        tracing::trace!(
            %id,
            x = region.x,
            y = region.y,
            margin = options.margin_px,
            "visibility observation registered"
        );
        lock(&self.observed).insert(id);

        let observed = Arc::clone(&self.observed);
        Subscription::new(move || {
            lock(&observed).remove(&id);
        })
    }
}

/// Lock a mutex, recovering from poisoning (state stays consistent because
/// every critical section is a plain field update).
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
