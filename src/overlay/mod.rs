//! Overlay geometry: monitor metadata, coordinate mapping and toolbar layout.
//!
//! Everything here is pure geometry. Pointer handling lives in [`crate::input`]
//! and the capture phase machine in [`crate::capture`].

pub mod metadata;
pub mod toolbar;
pub mod transform;

pub use metadata::OverlayMetadata;
pub use toolbar::{PlacementMode, ToolbarPlacement, ToolbarPlacer, compute_placement};
pub use transform::{CaptureRegion, CoordinateTransform, GeometryError, PixelRect, scale_for};
