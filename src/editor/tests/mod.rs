//! Scenario tests for the zone editor.
//!
//! These drive the editor through pointer events the way a host overlay would
//! and check the resulting zone list, selection and interaction state.

mod property_tests;

use roi_geom::{PixelPoint, SurfaceSize, ZoneCoords};

use super::ZoneEditor;
use crate::model::{DrawMode, Zone, ZoneId};

const EPSILON: f64 = 1e-9;

fn px(x: f64, y: f64) -> PixelPoint {
    PixelPoint::new(x, y)
}

fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Editor showing a `width` x `height` reference image in `mode`.
fn editor_with_surface(width: f64, height: f64, mode: DrawMode) -> ZoneEditor {
    let mut editor = ZoneEditor::new();
    editor.set_surface(SurfaceSize::new(width, height));
    editor.set_mode(mode);
    editor
}

fn zone(id: &str, x: f64, y: f64, w: f64, h: f64) -> Zone {
    Zone::new(ZoneId::from(id), id.to_uppercase(), ZoneCoords::new(x, y, w, h))
}

/// Full press-move-release gesture.
fn gesture(editor: &mut ZoneEditor, from: PixelPoint, to: PixelPoint) {
    editor.pointer_down(from);
    editor.pointer_move(to);
    editor.pointer_up(to);
}
