//! Error types for core operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Maximum accepted source file size in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Errors that can occur in canvas and draft operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Source image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Raster buffer could not be encoded.
    #[error("failed to encode raster: {0}")]
    Encode(String),

    /// Color literal was not a `#RRGGBB` string.
    #[error("invalid color literal: {0}")]
    InvalidColor(String),

    /// File selection was rejected before any draft state was created.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// File-selection validation failures.
///
/// Both variants are terminal for that selection attempt: no partial draft
/// is created and the previously selected draft (if any) stays live.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The declared media type does not indicate an image.
    #[error("selected file is not an image (declared type: {0})")]
    NotAnImage(String),

    /// The file exceeds the upload size limit.
    #[error("file size {size} exceeds the limit ({MAX_UPLOAD_BYTES} bytes)")]
    TooLarge {
        /// Declared byte size of the rejected file.
        size: usize,
    },
}

/// Device-capability failures. Always non-fatal: the affected feature
/// degrades (default geotag, inactive advisory) and the rest keeps working.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// The user or platform denied access to the capability.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The capability is not present on this device.
    #[error("capability unavailable: {0}")]
    Unavailable(String),
}
