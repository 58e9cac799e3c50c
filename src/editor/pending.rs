use roi_geom::ZoneCoords;

use super::interaction::DrawKind;

/// A completed drawing that still needs input before it becomes zones:
/// a name for a single zone, or rows/columns for a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingShape {
    pub kind: DrawKind,
    pub coords: ZoneCoords,
}

impl PendingShape {
    pub fn new(kind: DrawKind, coords: ZoneCoords) -> Self {
        Self { kind, coords }
    }
}
