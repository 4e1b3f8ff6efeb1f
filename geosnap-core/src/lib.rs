//! # Geosnap Core
//!
//! Core logic for the Geosnap annotate-and-upload gallery client.
//! Pure state machines and capability seams; no network I/O lives here.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                geosnap-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Annotation Canvas  │  Adaptive Loader      │
//! │  - Pointer machine  │  - Pending/Loading/   │
//! │  - Raster buffer    │    Displayed items    │
//! │  - PNG export       │  - Network advisory   │
//! ├─────────────────────────────────────────────┤
//! │  Draft lifecycle    │  Capability seams     │
//! │  - Validation       │  - Geolocation        │
//! │  - Single live slot │  - Network quality    │
//! │                     │  - Visibility         │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod capability;
pub mod draft;
pub mod error;
pub mod geo;
pub mod loader;
pub mod network;
pub mod raster;
pub mod stroke;

pub use canvas::{AnnotationCanvas, CanvasPhase};
pub use capability::{
    DeniedGeolocation, FixedGeolocation, GeolocationProvider, ItemId, ManualVisibilityTracker,
    NetworkMonitor, Region, StaticNetworkMonitor, Subscription, VisibilityOptions,
    VisibilityTracker,
};
pub use draft::{DraftSlot, SourceFile, UploadDraft};
pub use error::{CapabilityError, CoreError, CoreResult, ValidationError, MAX_UPLOAD_BYTES};
pub use geo::{GalleryImage, Geotag};
pub use loader::{AdaptiveLoader, FetchRequest, LoadState, NetworkAdvisory};
pub use network::{EffectiveType, NetworkProfile};
pub use raster::RasterBuffer;
pub use stroke::{Rgb, StrokeStyle};

/// Core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
