//! Pointer interaction state.

use roi_geom::{PixelPoint, PixelRect, ResizeHandle, ZoneCoords};

use crate::model::{DrawMode, ZoneId};

/// What a finished drawing gesture turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    /// One zone, named afterwards
    Single,
    /// Bounding rectangle for grid generation
    Grid,
}

impl DrawKind {
    pub fn name(&self) -> &'static str {
        match self {
            DrawKind::Single => "single",
            DrawKind::Grid => "grid",
        }
    }

    /// The draw kind a mode produces, if it produces one.
    pub fn for_mode(mode: DrawMode) -> Option<Self> {
        match mode {
            DrawMode::Single => Some(DrawKind::Single),
            DrawMode::Grid => Some(DrawKind::Grid),
            DrawMode::None | DrawMode::Edit => None,
        }
    }
}

/// An in-progress rectangle between the pointer-down point and the current pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub start: PixelPoint,
    pub current: PixelPoint,
}

impl DrawRect {
    pub fn new(start: PixelPoint) -> Self {
        Self {
            start,
            current: start,
        }
    }

    pub fn to_pixel_rect(&self) -> PixelRect {
        PixelRect::from_corners(self.start, self.current)
    }
}

/// The single interaction the editor is in.
///
/// Drawing, dragging and resizing are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// Waiting for a pointer-down
    #[default]
    Idle,
    /// Dragging out a new rectangle
    Drawing { kind: DrawKind, rect: DrawRect },
    /// Moving a zone; deltas are measured from `origin` and applied to `origin_coords`
    Dragging {
        zone_id: ZoneId,
        origin: PixelPoint,
        origin_coords: ZoneCoords,
    },
    /// Moving one corner of a zone
    Resizing {
        zone_id: ZoneId,
        handle: ResizeHandle,
        origin: PixelPoint,
        origin_coords: ZoneCoords,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, InteractionState::Drawing { .. })
    }

    /// Whether an existing zone is being moved or resized.
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. }
        )
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Drawing { .. } => "drawing",
            InteractionState::Dragging { .. } => "dragging",
            InteractionState::Resizing { .. } => "resizing",
        }
    }
}
