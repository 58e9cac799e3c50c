//! roi_geom - geometry for region-of-interest zones drawn over a reference image.
//!
//! Zones are stored in normalized coordinates: every value is a fraction of the
//! displayed image width or height, so the same zone stays valid no matter how
//! large the overlay is rendered. This crate converts between pointer pixels and
//! that normalized space and answers the hit-testing questions an editor needs:
//!
//! - [`SurfaceSize`] projects [`PixelPoint`]s to [`NormPoint`]s (clamped) and back
//! - [`ZoneCoords`] is a normalized rectangle with clamping, translation and resize
//! - [`ResizeHandle`] identifies the four corner handles and finds the one under a pointer

mod handle;
mod point;
mod rect;

pub use handle::{point_in_zone, resize_handle_at, ResizeHandle};
pub use point::{to_normalized, NormPoint, PixelPoint, SurfaceSize};
pub use rect::{PixelRect, ZoneCoords};

/// Smallest width or height (normalized) a zone may have.
pub const MIN_ZONE_SIZE: f64 = 0.01;

/// Default distance (CSS pixels) within which a pointer grabs a corner handle.
pub const DEFAULT_HANDLE_TOLERANCE: f64 = 8.0;
