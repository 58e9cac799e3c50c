//! Editor draw modes.

use std::str::FromStr;

/// What a pointer-down on the overlay does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// View only: clicking a zone highlights it, nothing can be moved or created
    #[default]
    None,
    /// Existing zones can be dragged and resized, no new zones
    Edit,
    /// Drag out one rectangle, then name it
    Single,
    /// Drag out a bounding rectangle, then split it into rows and columns
    Grid,
}

impl DrawMode {
    /// Get the wire/display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::None => "none",
            DrawMode::Edit => "edit",
            DrawMode::Single => "single",
            DrawMode::Grid => "grid",
        }
    }

    /// Get all modes.
    pub fn all() -> &'static [DrawMode] {
        &[DrawMode::None, DrawMode::Edit, DrawMode::Single, DrawMode::Grid]
    }

    /// Whether pointer-down starts a new rectangle.
    pub fn creates_zones(&self) -> bool {
        matches!(self, DrawMode::Single | DrawMode::Grid)
    }

    /// Whether existing zones may be dragged and resized.
    pub fn allows_editing(&self) -> bool {
        matches!(self, DrawMode::Edit)
    }
}

impl FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrawMode::all()
            .iter()
            .copied()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown draw mode '{}'", s))
    }
}
