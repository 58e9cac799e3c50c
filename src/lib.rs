//! ROI zone editor
//!
//! Interactive editing of named region-of-interest zones drawn over a camera
//! snapshot: freehand rectangles, grid generation, drag and corner resize, and
//! debounced persistence to the detection backend's settings API.
//!
//! Geometry lives in the `roi_geom` crate; this crate adds the editor state
//! machine, persistence and the native/web entry points.

pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod grid;
pub mod model;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod sync;

pub use config::EditorConfig;
pub use editor::ZoneEditor;
pub use error::{EditorError, SnapshotError, StoreError};
pub use model::{DrawMode, Zone, ZoneId};
pub use session::{Notice, RoiSession};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
