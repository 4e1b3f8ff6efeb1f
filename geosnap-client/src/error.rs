//! Error types for gallery service communication.

use thiserror::Error;

/// Result type for gallery service operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when talking to the gallery service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL (or an item URL) is malformed.
    #[error("invalid gallery URL: {0}")]
    InvalidUrl(String),

    /// HTTP layer failed (connection, timeout, etc.).
    #[error("gallery request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status.
    #[error("gallery returned status {0}")]
    Status(reqwest::StatusCode),

    /// The response payload did not match the expected shape.
    #[error("failed to parse gallery payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the upload pipeline. On any failure the draft is
/// preserved so the user may resubmit manually.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A submission is already in flight; the second attempt was not
    /// dispatched.
    #[error("an upload is already in flight")]
    AlreadyInFlight,

    /// No draft has been selected.
    #[error("no draft selected")]
    NoDraft,

    /// Validation or raster encoding failed before submission.
    #[error(transparent)]
    Core(#[from] geosnap_core::CoreError),

    /// The network submission failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}
