//! Randomized checks of the editor's geometric guarantees.

use proptest::prelude::*;
use roi_geom::{ResizeHandle, ZoneCoords};

use super::{EPSILON, editor_with_surface, px};
use crate::model::{DrawMode, Zone, ZoneId};

const WIDTH: f64 = 400.0;
const HEIGHT: f64 = 300.0;

#[derive(Debug, Clone)]
enum EditOp {
    Drag { dx: f64, dy: f64 },
    Resize { handle: usize, dx: f64, dy: f64 },
}

fn edit_op() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        (-500.0f64..500.0, -500.0f64..500.0).prop_map(|(dx, dy)| EditOp::Drag { dx, dy }),
        (0usize..4, -500.0f64..500.0, -500.0f64..500.0)
            .prop_map(|(handle, dx, dy)| EditOp::Resize { handle, dx, dy }),
    ]
}

/// A well-formed starting zone.
fn zone_coords() -> impl Strategy<Value = ZoneCoords> {
    (0.0f64..0.99, 0.0f64..0.99, 0.0f64..1.0, 0.0f64..1.0).prop_map(|(x, y, wf, hf)| {
        ZoneCoords::new(x, y, 0.01 + wf * (0.99 - x), 0.01 + hf * (0.99 - y))
    })
}

proptest! {
    #[test]
    fn edits_keep_zone_inside_image(
        start in zone_coords(),
        ops in prop::collection::vec(edit_op(), 1..20),
    ) {
        let mut editor = editor_with_surface(WIDTH, HEIGHT, DrawMode::Edit);
        let id = ZoneId::from("z");
        editor.replace_zones(vec![Zone::new(id.clone(), "z", start)]);

        for op in ops {
            let coords = editor.zone(&id).unwrap().coords;
            let rect = coords.to_pixel_rect(&editor.surface().unwrap());
            let (from, dx, dy) = match op {
                EditOp::Drag { dx, dy } => {
                    editor.deselect();
                    (px(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0), dx, dy)
                }
                EditOp::Resize { handle, dx, dy } => {
                    editor.select(&id).unwrap();
                    (rect.corner(ResizeHandle::ALL[handle]), dx, dy)
                }
            };
            let to = px(from.x + dx, from.y + dy);
            editor.pointer_down(from);
            editor.pointer_move(to);
            editor.pointer_up(to);

            let c = editor.zone(&id).unwrap().coords;
            prop_assert!(c.is_well_formed(0.0), "zone left the image: {:?}", c);
            prop_assert!(c.w >= 0.01 - EPSILON && c.h >= 0.01 - EPSILON, "zone too small: {:?}", c);
        }
    }

    #[test]
    fn thin_drawings_never_create_zones(
        x in 0.0f64..WIDTH,
        y in 0.0f64..HEIGHT,
        thin in 0.0f64..2.9,
        long in -HEIGHT..HEIGHT,
        vertical in any::<bool>(),
    ) {
        let mut editor = editor_with_surface(WIDTH, HEIGHT, DrawMode::Single);
        let to = if vertical { px(x + thin, y + long) } else { px(x + long, y + thin) };

        editor.pointer_down(px(x, y));
        editor.pointer_move(to);
        editor.pointer_up(to);

        prop_assert!(editor.pending().is_none());
        prop_assert!(editor.commit_single_zone("Thin").is_err());
        prop_assert!(editor.zones().is_empty());
    }
}
