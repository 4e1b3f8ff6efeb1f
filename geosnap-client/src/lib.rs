//! # Geosnap Client
//!
//! HTTP plumbing for the Geosnap gallery: a typed client for the gallery
//! service API, the single-attempt upload pipeline with its in-flight
//! guard, and the wholesale-refresh gallery view. The gallery service
//! itself is an external black box.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod error;
pub mod gallery;
pub mod pipeline;

pub use api::{GalleryApi, HealthReport, ListQuery, UploadReceipt, UPLOAD_FILENAME};
pub use error::{ClientError, ClientResult, UploadError};
pub use gallery::GalleryView;
pub use pipeline::{UploadPhase, UploadPipeline};

/// Client crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
