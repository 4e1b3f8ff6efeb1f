//! Geotag and gallery record types.

use serde::{Deserialize, Serialize};

/// A (latitude, longitude) pair attached to an upload.
///
/// Defaults to (0, 0) when no geolocation sample has been obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geotag {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Geotag {
    /// Create a geotag from decimal-degree coordinates.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A stored gallery record, owned by the gallery service.
///
/// The client holds a read-only, refreshable list of these; the list is
/// replaced wholesale on every refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Reference to the stored raster.
    pub url: String,
    /// Latitude the image was tagged with.
    pub latitude: f64,
    /// Longitude the image was tagged with.
    pub longitude: f64,
    /// Server-side filename, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Optional description supplied at upload time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Upload timestamp, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}
