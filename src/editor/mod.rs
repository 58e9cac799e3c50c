//! Zone editor: owns the zone list, the selection and the pointer interaction.
//!
//! The host forwards pointer events in container pixels and re-renders the
//! overlay from the editor's state after every event. All edits are
//! synchronous; persistence is handled elsewhere by watching [`ZoneEditor::revision`].
//!
//! Pointer-down dispatch, in priority order:
//! 1. In [`DrawMode::Edit`], a corner handle of the selected zone starts a resize.
//! 2. In [`DrawMode::Edit`] and [`DrawMode::None`], a zone body is selected; in
//!    `Edit` this also starts a drag. Overlapping bodies resolve to the first
//!    zone in list order. Empty space clears the selection.
//! 3. In [`DrawMode::Single`] and [`DrawMode::Grid`], a new rectangle is started.

mod interaction;
mod pending;

#[cfg(test)]
mod tests;

use roi_geom::{
    PixelPoint, PixelRect, ResizeHandle, SurfaceSize, ZoneCoords, point_in_zone, resize_handle_at,
};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::grid::{GridOptions, cell_size, generate_grid};
use crate::model::{DrawMode, Zone, ZoneId, ZoneIdGenerator};

pub use interaction::{DrawKind, DrawRect, InteractionState};
pub use pending::PendingShape;

/// Interactive editor for region-of-interest zones.
#[derive(Debug)]
pub struct ZoneEditor {
    zones: Vec<Zone>,
    selected: Option<ZoneId>,
    interaction: InteractionState,
    pending: Option<PendingShape>,
    mode: DrawMode,
    /// Displayed overlay size; `None` while no reference image is shown
    surface: Option<SurfaceSize>,
    handle_tolerance: f64,
    min_zone_size: f64,
    ids: ZoneIdGenerator,
    /// Bumped on every change to the zone list (not on selection changes)
    revision: u64,
}

impl ZoneEditor {
    /// Create an empty editor with default tolerances.
    pub fn new() -> Self {
        Self::from_config(&EditorConfig::default())
    }

    /// Create an empty editor using the configured tolerances.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            zones: Vec::new(),
            selected: None,
            interaction: InteractionState::Idle,
            pending: None,
            mode: DrawMode::default(),
            surface: None,
            handle_tolerance: config.handle_tolerance_px,
            min_zone_size: config.min_zone_size,
            ids: ZoneIdGenerator::new(),
            revision: 0,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    pub fn selected_id(&self) -> Option<&ZoneId> {
        self.selected.as_ref()
    }

    pub fn selected_zone(&self) -> Option<&Zone> {
        self.selected.as_ref().and_then(|id| self.zone(id))
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn pending(&self) -> Option<&PendingShape> {
        self.pending.as_ref()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    /// Counter that changes whenever the zone list changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether pointer input is currently ignored (no reference image on screen).
    pub fn is_inert(&self) -> bool {
        self.surface.is_none()
    }

    // =========================================================================
    // Host-driven state
    // =========================================================================

    /// Replace the whole zone list, e.g. with the copy loaded from the backend.
    pub fn replace_zones(&mut self, zones: Vec<Zone>) {
        log::info!("Loaded {} zones into editor", zones.len());
        self.zones = zones;
        self.selected = None;
        self.pending = None;
        self.interaction = InteractionState::Idle;
        self.touch();
    }

    /// Update the displayed overlay size. `None` makes the editor inert.
    pub fn set_surface(&mut self, surface: Option<SurfaceSize>) {
        if surface.is_none() && !self.interaction.is_idle() {
            log::debug!(
                "Surface removed while {}, returning to idle",
                self.interaction.name()
            );
            self.interaction = InteractionState::Idle;
        }
        self.surface = surface;
    }

    /// Switch draw mode.
    ///
    /// Entering `Single` or `Grid` clears the selection and drops a pending
    /// shape drawn for the other kind. Any gesture in progress is abandoned.
    pub fn set_mode(&mut self, mode: DrawMode) {
        if mode == self.mode {
            return;
        }
        log::debug!("Draw mode {} -> {}", self.mode.name(), mode.name());

        if let Some(kind) = DrawKind::for_mode(mode) {
            self.selected = None;
            if self.pending.is_some_and(|p| p.kind != kind) {
                self.pending = None;
            }
        }
        self.interaction = InteractionState::Idle;
        self.mode = mode;
    }

    // =========================================================================
    // Pointer events
    // =========================================================================

    /// Handle pointer-down at `point` (container pixels).
    pub fn pointer_down(&mut self, point: PixelPoint) {
        let Some(surface) = self.surface else {
            log::trace!("Pointer down ignored: no reference image");
            return;
        };
        if !self.interaction.is_idle() {
            log::debug!("Pointer down ignored while {}", self.interaction.name());
            return;
        }

        // Handles of the selected zone take priority over any body
        if self.mode.allows_editing() {
            let handle_hit = self.selected_zone().and_then(|zone| {
                resize_handle_at(point, &zone.coords, &surface, self.handle_tolerance)
                    .map(|handle| (zone.id.clone(), zone.coords, handle))
            });
            if let Some((zone_id, origin_coords, handle)) = handle_hit {
                log::debug!("Resizing zone {} from {} handle", zone_id, handle.name());
                self.interaction = InteractionState::Resizing {
                    zone_id,
                    handle,
                    origin: point,
                    origin_coords,
                };
                return;
            }
        }

        if let Some(kind) = DrawKind::for_mode(self.mode) {
            let start = surface.clamp(point);
            log::debug!("Drawing {} rectangle from ({:.1}, {:.1})", kind.name(), start.x, start.y);
            self.interaction = InteractionState::Drawing {
                kind,
                rect: DrawRect::new(start),
            };
            return;
        }

        // First zone in list order wins when bodies overlap
        let body_hit = self
            .zones
            .iter()
            .find(|zone| point_in_zone(point, &zone.coords, &surface))
            .map(|zone| (zone.id.clone(), zone.coords));

        match body_hit {
            Some((zone_id, origin_coords)) => {
                log::debug!("Selected zone {}", zone_id);
                self.selected = Some(zone_id.clone());
                if self.mode.allows_editing() {
                    self.interaction = InteractionState::Dragging {
                        zone_id,
                        origin: point,
                        origin_coords,
                    };
                }
            }
            None => {
                if self.selected.take().is_some() {
                    log::debug!("Clicked empty space, selection cleared");
                }
            }
        }
    }

    /// Handle pointer-move at `point` (container pixels).
    pub fn pointer_move(&mut self, point: PixelPoint) {
        let Some(surface) = self.surface else {
            return;
        };

        match &mut self.interaction {
            InteractionState::Idle => {}
            InteractionState::Drawing { rect, .. } => {
                rect.current = surface.clamp(point);
                log::trace!("Draw rect now {:?}", rect.to_pixel_rect());
            }
            InteractionState::Dragging {
                zone_id,
                origin,
                origin_coords,
            } => {
                let (dx, dy) = surface.delta_to_normalized(*origin, point);
                let coords = origin_coords.translated(dx, dy, self.min_zone_size);
                let zone_id = zone_id.clone();
                self.apply_coords(&zone_id, coords);
            }
            InteractionState::Resizing {
                zone_id,
                handle,
                origin,
                origin_coords,
            } => {
                let (dx, dy) = surface.delta_to_normalized(*origin, point);
                let coords = origin_coords.resized(*handle, dx, dy, self.min_zone_size);
                let zone_id = zone_id.clone();
                self.apply_coords(&zone_id, coords);
            }
        }
    }

    /// Handle pointer-up at `point` (container pixels).
    pub fn pointer_up(&mut self, point: PixelPoint) {
        // Movement is applied on move events; the up event only needs the final
        // position when it finishes a drawing.
        if self.interaction.is_editing() {
            self.pointer_move(point);
        }

        match std::mem::take(&mut self.interaction) {
            InteractionState::Idle => {}
            InteractionState::Drawing { kind, rect } => {
                if let Some(surface) = self.surface {
                    self.finish_drawing(kind, rect.start, point, &surface);
                }
            }
            InteractionState::Dragging { zone_id, .. } | InteractionState::Resizing { zone_id, .. } => {
                log::debug!("Finished editing zone {}", zone_id);
            }
        }
    }

    /// Handle the pointer leaving the overlay.
    ///
    /// A drawing in progress is cancelled; drags and resizes end where they are.
    pub fn pointer_leave(&mut self) {
        match std::mem::take(&mut self.interaction) {
            InteractionState::Idle => {}
            InteractionState::Drawing { kind, .. } => {
                log::debug!("Pointer left overlay, {} drawing cancelled", kind.name());
            }
            InteractionState::Dragging { zone_id, .. } | InteractionState::Resizing { zone_id, .. } => {
                log::debug!("Pointer left overlay, finished editing zone {}", zone_id);
            }
        }
    }

    fn finish_drawing(
        &mut self,
        kind: DrawKind,
        start: PixelPoint,
        end: PixelPoint,
        surface: &SurfaceSize,
    ) {
        let coords =
            ZoneCoords::from_corners(surface.to_normalized(start), surface.to_normalized(end));

        if !coords.meets_min_size(self.min_zone_size) {
            log::debug!("Discarded {} rectangle below minimum size: {:?}", kind.name(), coords);
            return;
        }

        log::info!("Staged {} rectangle {:?}", kind.name(), coords);
        self.pending = Some(PendingShape::new(kind, coords));
    }

    fn apply_coords(&mut self, zone_id: &ZoneId, coords: ZoneCoords) {
        match self.zones.iter_mut().find(|z| &z.id == zone_id) {
            Some(zone) if zone.coords != coords => {
                log::trace!("Zone {} now {:?}", zone_id, coords);
                zone.coords = coords;
                self.touch();
            }
            Some(_) => {}
            None => {
                log::warn!("Zone {} vanished during edit", zone_id);
                self.interaction = InteractionState::Idle;
            }
        }
    }

    // =========================================================================
    // Zone operations
    // =========================================================================

    /// Select a zone by id.
    pub fn select(&mut self, id: &ZoneId) -> Result<(), EditorError> {
        if self.zone(id).is_none() {
            return Err(EditorError::ZoneNotFound(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Turn the pending single rectangle into a named zone.
    ///
    /// On error nothing changes and the pending rectangle is kept for another try.
    pub fn commit_single_zone(&mut self, name: &str) -> Result<ZoneId, EditorError> {
        let pending = self.take_pending_checked(DrawKind::Single)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::EmptyName);
        }

        let id = self.ids.mint();
        log::info!("Created zone {} '{}' at {:?}", id, name, pending.coords);
        self.zones.push(Zone::new(id.clone(), name, pending.coords));
        self.pending = None;
        self.touch();
        Ok(id)
    }

    /// Split the pending grid rectangle into zones and append them all at once.
    ///
    /// Returns the number of zones created. On error nothing changes.
    pub fn commit_grid(&mut self, options: &GridOptions) -> Result<usize, EditorError> {
        let pending = self.take_pending_checked(DrawKind::Grid)?;
        options.validate()?;
        let (cell_w, cell_h) = cell_size(&pending.coords, options.rows, options.cols);
        if cell_w < self.min_zone_size || cell_h < self.min_zone_size {
            return Err(EditorError::GridCellTooSmall {
                rows: options.rows,
                cols: options.cols,
            });
        }
        let generated = generate_grid(&pending.coords, options, self.zones.len(), &mut self.ids)?;
        let count = generated.len();

        self.zones.extend(generated);
        self.pending = None;
        self.touch();
        log::info!(
            "Created {} zones from {}x{} grid (total: {})",
            count,
            options.rows,
            options.cols,
            self.zones.len()
        );
        Ok(count)
    }

    fn take_pending_checked(&self, expected: DrawKind) -> Result<PendingShape, EditorError> {
        let pending = self.pending.ok_or(EditorError::NoPendingShape)?;
        if pending.kind != expected {
            return Err(EditorError::PendingKindMismatch {
                expected: expected.name(),
                found: pending.kind.name(),
            });
        }
        Ok(pending)
    }

    /// Drop the pending rectangle without creating anything.
    pub fn discard_pending(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("Discarded pending rectangle");
        }
    }

    /// Rename a zone. Names are trimmed and must not be empty.
    pub fn rename_zone(&mut self, id: &ZoneId, name: &str) -> Result<(), EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::EmptyName);
        }
        let zone = self
            .zones
            .iter_mut()
            .find(|z| &z.id == id)
            .ok_or_else(|| EditorError::ZoneNotFound(id.clone()))?;
        if zone.name != name {
            log::info!("Renamed zone {} '{}' -> '{}'", id, zone.name, name);
            zone.name = name.to_string();
            self.touch();
        }
        Ok(())
    }

    /// Delete a zone, clearing the selection if it pointed at it.
    pub fn delete_zone(&mut self, id: &ZoneId) -> Result<Zone, EditorError> {
        let index = self
            .zones
            .iter()
            .position(|z| &z.id == id)
            .ok_or_else(|| EditorError::ZoneNotFound(id.clone()))?;

        let removed = self.zones.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.interaction.is_editing() {
            self.interaction = InteractionState::Idle;
        }
        self.touch();
        log::info!("Deleted zone {} '{}'", removed.id, removed.name);
        Ok(removed)
    }

    /// Remove every zone and any selection, pending shape or gesture.
    pub fn reset_all(&mut self) {
        let had_zones = !self.zones.is_empty();
        self.zones.clear();
        self.selected = None;
        self.pending = None;
        self.interaction = InteractionState::Idle;
        if had_zones {
            self.touch();
            log::info!("Removed all zones");
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // =========================================================================
    // Rendering helpers
    // =========================================================================

    /// Pixel rectangles of all zones, in list order. Empty while inert.
    pub fn zone_rects(&self) -> Vec<(&Zone, PixelRect)> {
        match self.surface {
            Some(surface) => self
                .zones
                .iter()
                .map(|zone| (zone, zone.coords.to_pixel_rect(&surface)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Handle positions of the selected zone, when handles are active.
    pub fn selected_handles(&self) -> Vec<(ResizeHandle, PixelPoint)> {
        let (Some(surface), Some(zone)) = (self.surface, self.selected_zone()) else {
            return Vec::new();
        };
        if !self.mode.allows_editing() {
            return Vec::new();
        }
        let rect = zone.coords.to_pixel_rect(&surface);
        ResizeHandle::ALL
            .iter()
            .map(|&handle| (handle, rect.corner(handle)))
            .collect()
    }

    /// The rectangle being drawn, in pixels.
    pub fn draw_preview(&self) -> Option<PixelRect> {
        match &self.interaction {
            InteractionState::Drawing { rect, .. } => Some(rect.to_pixel_rect()),
            _ => None,
        }
    }
}

impl Default for ZoneEditor {
    fn default() -> Self {
        Self::new()
    }
}
