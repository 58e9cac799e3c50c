//! Browser bridge.
//!
//! The page owns the DOM overlay and does the `fetch` calls; this module owns
//! the editing logic. Structured values cross the boundary as JSON strings.
//!
//! Host loop:
//! 1. forward pointer events and UI actions,
//! 2. call `tick()` on an interval,
//! 3. perform everything returned by `take_requests()` and report back with
//!    the matching `complete_*` / `fail_*` call,
//! 4. re-render from `overlay_json()` and show `take_notices_json()`.

use std::str::FromStr;

use roi_geom::{PixelPoint, PixelRect, SurfaceSize};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_time::Instant;

use crate::config::EditorConfig;
use crate::error::StoreError;
use crate::grid::GridOptions;
use crate::model::{DrawMode, Zone, ZoneId};
use crate::session::{Notice, RoiSession};
use crate::store::wire::{SettingsPayload, ZonesPayload, resolve_load};
use crate::store::{QueuedZoneStore, StoreEvent};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Console logger already initialized");
    }
    log::info!("ROI zone editor loaded");
}

#[derive(Serialize)]
struct OverlayRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl From<PixelRect> for OverlayRect {
    fn from(rect: PixelRect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Serialize)]
struct OverlayZone<'a> {
    id: &'a str,
    name: &'a str,
    selected: bool,
    rect: OverlayRect,
}

#[derive(Serialize)]
struct OverlayHandle {
    handle: &'static str,
    x: f64,
    y: f64,
}

/// Everything the page needs to draw the overlay.
#[derive(Serialize)]
struct Overlay<'a> {
    mode: &'static str,
    interaction: &'static str,
    inert: bool,
    zones: Vec<OverlayZone<'a>>,
    handles: Vec<OverlayHandle>,
    preview: Option<OverlayRect>,
    pending: Option<&'static str>,
    unsaved: bool,
}

/// A notice plus the toast text the page shows for it.
#[derive(Serialize)]
struct NoticeView {
    #[serde(flatten)]
    notice: Notice,
    text: String,
    error: bool,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            text: notice.message(),
            error: notice.is_error(),
            notice,
        }
    }
}

fn parse_optional<T: serde::de::DeserializeOwned>(what: &str, json: Option<String>) -> Option<T> {
    let json = json?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unparsable {} payload: {}", what, e);
            None
        }
    }
}

/// A zone editing session driven from JavaScript.
#[wasm_bindgen]
pub struct WasmRoiSession {
    inner: RoiSession<QueuedZoneStore>,
}

#[wasm_bindgen]
impl WasmRoiSession {
    /// Create a session. `config_json` is an optional `EditorConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmRoiSession, JsError> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json)?,
            None => EditorConfig::default(),
        };
        log::set_max_level(config.log_level.to_level_filter());
        Ok(Self {
            inner: RoiSession::new(&config, QueuedZoneStore::new()),
        })
    }

    /// Queue the initial load and snapshot requests.
    pub fn start(&mut self) {
        self.inner.start();
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.inner.pointer_down(Instant::now(), PixelPoint::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(Instant::now(), PixelPoint::new(x, y));
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.inner.pointer_up(Instant::now(), PixelPoint::new(x, y));
    }

    pub fn pointer_leave(&mut self) {
        self.inner.pointer_leave(Instant::now());
    }

    /// `"none"`, `"edit"`, `"single"` or `"grid"`.
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsError> {
        let mode = DrawMode::from_str(mode).map_err(|e| JsError::new(&e))?;
        self.inner.set_mode(mode);
        Ok(())
    }

    /// Name the pending single rectangle; returns the new zone id.
    pub fn commit_single_zone(&mut self, name: &str) -> Result<String, JsError> {
        let id = self.inner.commit_single_zone(Instant::now(), name)?;
        Ok(id.to_string())
    }

    /// Split the pending grid rectangle. `options_json` is a `GridOptions` object.
    pub fn commit_grid(&mut self, options_json: &str) -> Result<u32, JsError> {
        let options: GridOptions = serde_json::from_str(options_json)?;
        let count = self.inner.commit_grid(Instant::now(), &options)?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    pub fn discard_pending(&mut self) {
        self.inner.edit(Instant::now(), |editor| editor.discard_pending());
    }

    pub fn rename_zone(&mut self, id: &str, name: &str) -> Result<(), JsError> {
        self.inner
            .rename_zone(Instant::now(), &ZoneId::from(id), name)?;
        Ok(())
    }

    pub fn delete_zone(&mut self, id: &str) -> Result<(), JsError> {
        self.inner.delete_zone(Instant::now(), &ZoneId::from(id))?;
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.inner.reset_all(Instant::now());
    }

    pub fn select_zone(&mut self, id: &str) -> Result<(), JsError> {
        self.inner
            .edit(Instant::now(), |editor| editor.select(&ZoneId::from(id)))?;
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.inner.edit(Instant::now(), |editor| editor.deselect());
    }

    /// Report the displayed image box size in CSS pixels.
    pub fn set_display_size(&mut self, width: f64, height: f64) {
        self.inner.set_display_size(SurfaceSize::new(width, height));
    }

    /// The image box is hidden (placeholder shown).
    pub fn clear_display(&mut self) {
        self.inner.set_display_size(None);
    }

    pub fn request_snapshot(&mut self) {
        self.inner.request_snapshot();
    }

    pub fn save_now(&mut self) {
        self.inner.save_now();
    }

    /// Advance timers and apply reported results.
    pub fn tick(&mut self) {
        self.inner.tick(Instant::now());
    }

    /// Milliseconds until the next background save, if one is scheduled.
    pub fn time_until_save_ms(&self) -> Option<f64> {
        self.inner
            .time_until_save(Instant::now())
            .map(|d| d.as_secs_f64() * 1000.0)
    }

    /// JSON array of requests the page should perform.
    pub fn take_requests(&mut self) -> Result<String, JsError> {
        let requests = self.inner.store_mut().take_requests();
        Ok(serde_json::to_string(&requests)?)
    }

    /// Report a finished load. Either body may be missing or malformed.
    pub fn complete_load(&mut self, zones_json: Option<String>, settings_json: Option<String>) {
        let endpoint: Option<ZonesPayload> = parse_optional("zones", zones_json);
        let settings: Option<SettingsPayload> = parse_optional("settings", settings_json);
        let (zones, source) = resolve_load(endpoint, settings);
        self.inner
            .store_mut()
            .push_event(StoreEvent::Loaded { zones, source });
    }

    /// Report a successful save with the backend's `{ roi_zones }` echo.
    pub fn complete_save(&mut self, seq: f64, echoed_json: &str) {
        let result = serde_json::from_str::<ZonesPayload>(echoed_json)
            .map(|payload| payload.roi_zones)
            .map_err(StoreError::from);
        self.push_save(seq, result);
    }

    pub fn fail_save(&mut self, seq: f64, message: &str) {
        self.push_save(seq, Err(StoreError::Host(message.to_string())));
    }

    fn push_save(&mut self, seq: f64, result: Result<Vec<Zone>, StoreError>) {
        self.inner.store_mut().push_event(StoreEvent::Saved {
            seq: seq as u64,
            result,
        });
    }

    /// Report fetched snapshot bytes.
    pub fn complete_snapshot(&mut self, bytes: Vec<u8>) {
        self.inner
            .store_mut()
            .push_event(StoreEvent::Snapshot(Ok(bytes)));
    }

    pub fn fail_snapshot(&mut self, message: &str) {
        self.inner
            .store_mut()
            .push_event(StoreEvent::Snapshot(Err(StoreError::Host(message.to_string()))));
    }

    /// Natural `[width, height]` of the current snapshot, if any.
    pub fn snapshot_size(&self) -> Option<Vec<u32>> {
        self.inner.snapshot().map(|s| vec![s.width(), s.height()])
    }

    /// Current zone list in wire format.
    pub fn zones_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.inner.zones())?)
    }

    /// Drawing state for the overlay.
    pub fn overlay_json(&self) -> Result<String, JsError> {
        let editor = self.inner.editor();
        let selected = editor.selected_id();
        let overlay = Overlay {
            mode: editor.mode().name(),
            interaction: editor.interaction().name(),
            inert: editor.is_inert(),
            zones: editor
                .zone_rects()
                .into_iter()
                .map(|(zone, rect)| OverlayZone {
                    id: zone.id.as_str(),
                    name: &zone.name,
                    selected: selected == Some(&zone.id),
                    rect: rect.into(),
                })
                .collect(),
            handles: editor
                .selected_handles()
                .into_iter()
                .map(|(handle, point)| OverlayHandle {
                    handle: handle.name(),
                    x: point.x,
                    y: point.y,
                })
                .collect(),
            preview: editor.draw_preview().map(OverlayRect::from),
            pending: editor.pending().map(|p| p.kind.name()),
            unsaved: self.inner.has_unsaved_changes(),
        };
        Ok(serde_json::to_string(&overlay)?)
    }

    /// JSON array of notices since the last call.
    pub fn take_notices_json(&mut self) -> Result<String, JsError> {
        let notices: Vec<NoticeView> = self
            .inner
            .take_notices()
            .into_iter()
            .map(NoticeView::from)
            .collect();
        Ok(serde_json::to_string(&notices)?)
    }

    /// Cancel timers and release the snapshot.
    pub fn teardown(&mut self) {
        self.inner.teardown();
    }
}
