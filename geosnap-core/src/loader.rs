//! Adaptive media loading for gallery items.
//!
//! Each gallery item moves Pending → Loading → Displayed. The Pending →
//! Loading transition fires when the item's region crosses the visibility
//! threshold, at most once per item: the visibility observation is
//! disposed the moment it fires. Network-quality classification is
//! advisory only: a constrained profile emits a one-time warning and
//! never blocks or degrades loading.

use std::collections::HashMap;

use crate::capability::{ItemId, Region, Subscription, VisibilityOptions, VisibilityTracker};
use crate::geo::GalleryImage;
use crate::network::NetworkProfile;

/// Load state of one gallery item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Not yet requested.
    Pending,
    /// Fetch dispatched.
    Loading,
    /// Pixels rendered.
    Displayed,
}

/// A deferred fetch to dispatch for an item that became visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// The item to fetch for.
    pub id: ItemId,
    /// Stored raster URL.
    pub url: String,
}

/// One-time advisory emitted when the network profile is constrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAdvisory {
    /// The profile that triggered the advisory.
    pub profile: NetworkProfile,
    /// User-facing message.
    pub message: String,
}

#[derive(Debug)]
struct TrackedItem {
    url: String,
    state: LoadState,
    subscription: Option<Subscription>,
}

/// Visibility/network aware loader for one gallery item list.
///
/// Owns the visibility subscriptions for its items; [`dispose`]
/// (Self::dispose) must be called when the gallery list is replaced so
/// stale callbacks cannot fire against removed items.
#[derive(Debug, Default)]
pub struct AdaptiveLoader {
    items: HashMap<ItemId, TrackedItem>,
    options: VisibilityOptions,
    advisory_shown: bool,
}

impl AdaptiveLoader {
    /// Create a loader with the default visibility options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with explicit visibility options.
    #[must_use]
    pub fn with_options(options: VisibilityOptions) -> Self {
        Self {
            items: HashMap::new(),
            options,
            advisory_shown: false,
        }
    }

    /// Register a gallery item for deferred loading. The item starts
    /// Pending and its display region is observed for visibility.
    pub fn observe(
        &mut self,
        image: &GalleryImage,
        region: Region,
        tracker: &dyn VisibilityTracker,
    ) -> ItemId {
        let id = ItemId::new();
        let subscription = tracker.observe(id, region, &self.options);
        self.items.insert(
            id,
            TrackedItem {
                url: image.url.clone(),
                state: LoadState::Pending,
                subscription: Some(subscription),
            },
        );
        id
    }

    /// The item's region crossed the visibility threshold.
    ///
    /// Returns the fetch to dispatch on the first crossing of a Pending
    /// item; the visibility observation is disposed so the transition can
    /// never fire twice. Crossings for unknown or already-triggered items
    /// return `None`.
    pub fn notify_visible(&mut self, id: ItemId) -> Option<FetchRequest> {
        let item = self.items.get_mut(&id)?;
        if item.state != LoadState::Pending {
            return None;
        }

        item.state = LoadState::Loading;
        if let Some(subscription) = item.subscription.take() {
            subscription.dispose();
        }
        tracing::debug!(%id, url = %item.url, "deferred fetch triggered");

        Some(FetchRequest {
            id,
            url: item.url.clone(),
        })
    }

    /// The item's deferred fetch completed; marks it Displayed.
    ///
    /// Returns `false` for unknown items or items that were not Loading.
    pub fn notify_loaded(&mut self, id: ItemId) -> bool {
        match self.items.get_mut(&id) {
            Some(item) if item.state == LoadState::Loading => {
                item.state = LoadState::Displayed;
                tracing::debug!(%id, "item displayed");
                true
            }
            _ => false,
        }
    }

    /// Load state of an item, or `None` if unknown.
    #[must_use]
    pub fn state(&self, id: ItemId) -> Option<LoadState> {
        self.items.get(&id).map(|item| item.state)
    }

    /// Number of tracked items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Classify the current network profile, on mount and on every change
    /// notification.
    ///
    /// Returns the advisory exactly once per loader when the profile is
    /// constrained (slow tier or data saver). `None` for an unavailable
    /// capability. Advisory only: loading is never blocked or degraded.
    pub fn classify_network(&mut self, profile: Option<NetworkProfile>) -> Option<NetworkAdvisory> {
        let profile = profile?;
        if !profile.is_constrained() || self.advisory_shown {
            return None;
        }

        self.advisory_shown = true;
        tracing::info!(profile = %profile.summary(), "slow network advisory shown");
        Some(NetworkAdvisory {
            profile,
            message: format!(
                "You are on a slow network ({}). Images might load slowly.",
                profile.summary()
            ),
        })
    }

    /// Cancel all pending observations and forget all items.
    ///
    /// Must be called when the gallery list is replaced; the dropped
    /// subscriptions guarantee stale visibility callbacks cannot fire
    /// against removed items. The one-time advisory state is kept.
    pub fn dispose(&mut self) {
        for (_, item) in self.items.drain() {
            if let Some(subscription) = item.subscription {
                subscription.dispose();
            }
        }
        tracing::debug!("loader observations disposed");
    }
}
