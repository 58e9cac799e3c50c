use crate::point::{PixelPoint, SurfaceSize};
use crate::rect::ZoneCoords;

/// One of the four corner handles of a selected zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl ResizeHandle {
    /// All handles, in hit-test order.
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::NorthWest,
        ResizeHandle::NorthEast,
        ResizeHandle::SouthWest,
        ResizeHandle::SouthEast,
    ];

    /// Short compass name ("nw", "ne", "sw", "se").
    pub fn name(&self) -> &'static str {
        match self {
            ResizeHandle::NorthWest => "nw",
            ResizeHandle::NorthEast => "ne",
            ResizeHandle::SouthWest => "sw",
            ResizeHandle::SouthEast => "se",
        }
    }

    /// Whether dragging this handle moves the left edge (otherwise the right edge).
    pub fn moves_left(&self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::SouthWest)
    }

    /// Whether dragging this handle moves the top edge (otherwise the bottom edge).
    pub fn moves_top(&self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::NorthEast)
    }
}

/// Inclusive hit-test of a pointer against a zone body, in container pixels.
pub fn point_in_zone(point: PixelPoint, zone: &ZoneCoords, surface: &SurfaceSize) -> bool {
    zone.to_pixel_rect(surface).contains(point)
}

/// Find the corner handle under the pointer.
///
/// Returns the nearest corner whose distance to `point` is within `tolerance`
/// CSS pixels, or `None` when no corner is close enough.
pub fn resize_handle_at(
    point: PixelPoint,
    zone: &ZoneCoords,
    surface: &SurfaceSize,
    tolerance: f64,
) -> Option<ResizeHandle> {
    let rect = zone.to_pixel_rect(surface);
    ResizeHandle::ALL
        .iter()
        .map(|&handle| (handle, rect.corner(handle).distance_to(&point)))
        .filter(|&(_, distance)| distance <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| handle)
}
