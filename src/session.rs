//! One editing session: editor, persistence and reference snapshot wired together.
//!
//! The host owns a [`RoiSession`], forwards pointer events and UI actions to it,
//! calls [`RoiSession::tick`] regularly (every frame or on a short interval), and
//! shows the [`Notice`]s it produces. All calls return immediately; network work
//! happens behind the [`ZoneStore`].

use std::collections::VecDeque;
use std::time::Duration;

use roi_geom::{PixelPoint, SurfaceSize};
use serde::Serialize;
use web_time::Instant;

use crate::config::EditorConfig;
use crate::editor::ZoneEditor;
use crate::error::EditorError;
use crate::grid::GridOptions;
use crate::model::{DrawMode, Zone, ZoneId};
use crate::snapshot::{SnapshotImage, SnapshotSlot};
use crate::store::{StoreEvent, StoreRequest, ZoneSource, ZoneStore};
use crate::sync::{SaveOrigin, SaveOutcome, ZoneSync};

/// Something the host should tell the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Input was rejected; nothing changed
    ZoneRejected { message: String },
    /// An explicit save went through
    Saved { zones: usize },
    /// A background save went through
    AutoSaved,
    /// An explicit save failed
    SaveFailed { message: String },
    /// No reference image could be shown
    SnapshotUnavailable { message: String },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::ZoneRejected { .. } | Notice::SaveFailed { .. } | Notice::SnapshotUnavailable { .. }
        )
    }

    /// Text suitable for a toast.
    pub fn message(&self) -> String {
        match self {
            Notice::ZoneRejected { message } => message.clone(),
            Notice::Saved { zones } => format!("Saved {} zones", zones),
            Notice::AutoSaved => "Zones saved".to_string(),
            Notice::SaveFailed { message } => format!("Failed to save zones: {}", message),
            Notice::SnapshotUnavailable { message } => {
                format!("Camera snapshot unavailable: {}", message)
            }
        }
    }
}

/// Zone editing session over a [`ZoneStore`].
pub struct RoiSession<S: ZoneStore> {
    editor: ZoneEditor,
    sync: ZoneSync,
    store: S,
    snapshot: SnapshotSlot,
    /// Size of the displayed image box as reported by the host
    display_size: Option<SurfaceSize>,
    notices: VecDeque<Notice>,
    /// Editor revision last reported to `sync`
    seen_revision: u64,
    load_source: Option<ZoneSource>,
    torn_down: bool,
}

impl<S: ZoneStore> RoiSession<S> {
    pub fn new(config: &EditorConfig, store: S) -> Self {
        let editor = ZoneEditor::from_config(config);
        let seen_revision = editor.revision();
        Self {
            editor,
            sync: ZoneSync::from_config(config),
            store,
            snapshot: SnapshotSlot::new(),
            display_size: None,
            notices: VecDeque::new(),
            seen_revision,
            load_source: None,
            torn_down: false,
        }
    }

    /// Request the stored zones and a first snapshot.
    pub fn start(&mut self) {
        log::info!("Starting zone editing session");
        self.store.submit(StoreRequest::Load);
        self.store.submit(StoreRequest::Snapshot);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn editor(&self) -> &ZoneEditor {
        &self.editor
    }

    pub fn zones(&self) -> &[Zone] {
        self.editor.zones()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn snapshot(&self) -> Option<&SnapshotImage> {
        self.snapshot.current()
    }

    pub fn is_loaded(&self) -> bool {
        self.sync.is_loaded()
    }

    pub fn load_source(&self) -> Option<ZoneSource> {
        self.load_source
    }

    /// Whether the zone list differs from the last persisted copy.
    pub fn has_unsaved_changes(&self) -> bool {
        self.sync.is_dirty(self.editor.zones())
    }

    /// Time until the next background save, for hosts that schedule wake-ups.
    pub fn time_until_save(&self, now: Instant) -> Option<Duration> {
        self.sync.time_until_save(now)
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Run an edit against the editor and schedule persistence if the zone list changed.
    pub fn edit<R>(&mut self, now: Instant, f: impl FnOnce(&mut ZoneEditor) -> R) -> R {
        let result = f(&mut self.editor);
        self.after_edit(now);
        result
    }

    fn after_edit(&mut self, now: Instant) {
        let revision = self.editor.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.sync.zones_changed(self.editor.zones(), now);
        }
    }

    fn reject<T>(&mut self, result: Result<T, EditorError>) -> Result<T, EditorError> {
        if let Err(e) = &result {
            log::debug!("Rejected input: {}", e);
            self.notices.push_back(Notice::ZoneRejected {
                message: e.to_string(),
            });
        }
        result
    }

    pub fn pointer_down(&mut self, now: Instant, point: PixelPoint) {
        self.edit(now, |editor| editor.pointer_down(point));
    }

    pub fn pointer_move(&mut self, now: Instant, point: PixelPoint) {
        self.edit(now, |editor| editor.pointer_move(point));
    }

    pub fn pointer_up(&mut self, now: Instant, point: PixelPoint) {
        self.edit(now, |editor| editor.pointer_up(point));
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.edit(now, |editor| editor.pointer_leave());
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.editor.set_mode(mode);
    }

    pub fn commit_single_zone(&mut self, now: Instant, name: &str) -> Result<ZoneId, EditorError> {
        let result = self.edit(now, |editor| editor.commit_single_zone(name));
        self.reject(result)
    }

    pub fn commit_grid(&mut self, now: Instant, options: &GridOptions) -> Result<usize, EditorError> {
        let result = self.edit(now, |editor| editor.commit_grid(options));
        self.reject(result)
    }

    pub fn rename_zone(&mut self, now: Instant, id: &ZoneId, name: &str) -> Result<(), EditorError> {
        let result = self.edit(now, |editor| editor.rename_zone(id, name));
        self.reject(result)
    }

    pub fn delete_zone(&mut self, now: Instant, id: &ZoneId) -> Result<Zone, EditorError> {
        let result = self.edit(now, |editor| editor.delete_zone(id));
        self.reject(result)
    }

    pub fn reset_all(&mut self, now: Instant) {
        self.edit(now, |editor| editor.reset_all());
    }

    // =========================================================================
    // Display and snapshot
    // =========================================================================

    /// Report the displayed image box size, or `None` when it is hidden.
    pub fn set_display_size(&mut self, size: Option<SurfaceSize>) {
        self.display_size = size;
        self.refresh_surface();
    }

    /// The editor only accepts input while a snapshot is on screen.
    fn refresh_surface(&mut self) {
        let surface = if self.snapshot.is_available() {
            self.display_size
        } else {
            None
        };
        self.editor.set_surface(surface);
    }

    /// Ask for a fresh reference snapshot.
    pub fn request_snapshot(&mut self) {
        self.store.submit(StoreRequest::Snapshot);
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save immediately, reporting the outcome as a notice.
    pub fn save_now(&mut self) {
        if self.torn_down {
            return;
        }
        let request = self.sync.save_now(self.editor.zones());
        self.store.submit(StoreRequest::Save {
            seq: request.seq,
            zones: request.zones,
        });
    }

    /// Fire a due background save and apply finished store events.
    pub fn tick(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        if let Some(request) = self.sync.poll_due(self.editor.zones(), now) {
            self.store.submit(StoreRequest::Save {
                seq: request.seq,
                zones: request.zones,
            });
        }
        while let Some(event) = self.store.poll() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Loaded { zones, source } => {
                log::info!("Session loaded {} zones from {}", zones.len(), source.name());
                self.editor.replace_zones(zones);
                self.seen_revision = self.editor.revision();
                self.sync.on_loaded(self.editor.zones());
                self.load_source = Some(source);
            }
            StoreEvent::Saved { seq, result } => match self.sync.complete(seq, result) {
                SaveOutcome::Applied {
                    origin: SaveOrigin::Manual,
                } => self.notices.push_back(Notice::Saved {
                    zones: self.sync.persisted().map_or(0, <[Zone]>::len),
                }),
                SaveOutcome::Applied {
                    origin: SaveOrigin::Auto,
                } => self.notices.push_back(Notice::AutoSaved),
                SaveOutcome::Failed {
                    origin: SaveOrigin::Manual,
                    message,
                } => self.notices.push_back(Notice::SaveFailed { message }),
                // Background failures are logged by the sync layer only
                SaveOutcome::Failed {
                    origin: SaveOrigin::Auto,
                    ..
                }
                | SaveOutcome::Stale { .. }
                | SaveOutcome::Unknown => {}
            },
            StoreEvent::Snapshot(Ok(bytes)) => {
                match self.snapshot.replace(bytes) {
                    Ok(image) => {
                        log::info!("Reference snapshot {}x{}", image.width(), image.height());
                    }
                    Err(e) => {
                        log::warn!("Snapshot rejected: {}", e);
                        self.notices.push_back(Notice::SnapshotUnavailable {
                            message: e.to_string(),
                        });
                    }
                }
                self.refresh_surface();
            }
            StoreEvent::Snapshot(Err(e)) => {
                log::warn!("Snapshot fetch failed: {}", e);
                self.notices.push_back(Notice::SnapshotUnavailable {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Stop the autosave timer and release the snapshot. Later events are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if self.has_unsaved_changes() {
            log::warn!("Closing zone editor with unsaved changes");
        }
        self.sync.teardown();
        self.snapshot.release();
        self.editor.set_surface(None);
        self.torn_down = true;
        log::debug!("Zone editing session torn down");
    }
}

impl<S: ZoneStore> Drop for RoiSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
