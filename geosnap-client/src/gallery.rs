//! Gallery view state with wholesale refresh.

use geosnap_core::GalleryImage;

use crate::api::{GalleryApi, ListQuery};
use crate::error::ClientError;

/// Read-only, refreshable view of the stored gallery.
///
/// The item list is replaced wholesale on every successful refresh, never
/// mutated in place. Any adaptive-loader observations registered against
/// the old list must be disposed and re-registered by the caller after a
/// successful refresh; the old item references are gone.
#[derive(Debug, Default)]
pub struct GalleryView {
    items: Vec<GalleryImage>,
}

impl GalleryView {
    /// Create an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current item list.
    #[must_use]
    pub fn items(&self) -> &[GalleryImage] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the view holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Re-fetch the item list from the service.
    ///
    /// # Errors
    ///
    /// Surfaces the [`ClientError`]; the previously loaded list (or empty
    /// list) is retained, and retry happens only via an explicit new call.
    pub async fn refresh(&mut self, api: &GalleryApi, query: ListQuery) -> Result<(), ClientError> {
        match api.list_images(query).await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "gallery list replaced");
                self.items = items;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("gallery refresh failed, prior list retained: {err}");
                Err(err)
            }
        }
    }
}
