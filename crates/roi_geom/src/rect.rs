use serde::{Deserialize, Serialize};

use crate::handle::ResizeHandle;
use crate::point::{clamp_finite, NormPoint, PixelPoint, SurfaceSize};

/// A rectangle in CSS pixels, relative to the overlay container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the rectangle spanned by two corner points, in any order.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Position of a corner.
    pub fn corner(&self, handle: ResizeHandle) -> PixelPoint {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        match handle {
            ResizeHandle::NorthWest => PixelPoint::new(self.x, self.y),
            ResizeHandle::NorthEast => PixelPoint::new(right, self.y),
            ResizeHandle::SouthWest => PixelPoint::new(self.x, bottom),
            ResizeHandle::SouthEast => PixelPoint::new(right, bottom),
        }
    }
}

/// A zone rectangle in normalized coordinates (fractions of the image size).
///
/// A well-formed rectangle satisfies `x >= 0`, `y >= 0`, `w > 0`, `h > 0`,
/// `x + w <= 1` and `y + h <= 1`. Rectangles imported from a backend are not
/// trusted to be well-formed; [`ZoneCoords::clamped`] restores the invariant and
/// every editing operation goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneCoords {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ZoneCoords {
    /// The whole image.
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build the rectangle spanned by two normalized corner points, in any order.
    ///
    /// The far edges are snapped so that `x + w` and `y + h` never round past 1.
    pub fn from_corners(a: NormPoint, b: NormPoint) -> Self {
        let w = (a.x - b.x).abs().min(1.0);
        let h = (a.y - b.y).abs().min(1.0);
        Self {
            x: fit_origin(a.x.min(b.x), w),
            y: fit_origin(a.y.min(b.y), h),
            w,
            h,
        }
    }

    /// Build the rectangle between explicit edges, snapped inside the image.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::from_corners(NormPoint::new(left, top), NormPoint::new(right, bottom))
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Check the zone invariant. `tolerance` absorbs floating point error on the far edges.
    pub fn is_well_formed(&self, tolerance: f64) -> bool {
        let finite = [self.x, self.y, self.w, self.h]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.x >= 0.0
            && self.y >= 0.0
            && self.w > 0.0
            && self.h > 0.0
            && self.right() <= 1.0 + tolerance
            && self.bottom() <= 1.0 + tolerance
    }

    /// Whether both sides reach `min_size`.
    pub fn meets_min_size(&self, min_size: f64) -> bool {
        self.w >= min_size && self.h >= min_size
    }

    /// Inclusive containment of a normalized point.
    pub fn contains(&self, point: NormPoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Restore the zone invariant without growing a valid zone.
    ///
    /// Sizes above 1 are capped; sizes that are zero, negative or not finite
    /// become `min_size`. The origin is then pulled inside the image. A zone
    /// that is already well-formed comes back unchanged, even when it is
    /// smaller than `min_size`.
    pub fn clamped(&self, min_size: f64) -> Self {
        let w = repair_size(self.w, min_size);
        let h = repair_size(self.h, min_size);
        Self {
            x: fit_origin(self.x, w),
            y: fit_origin(self.y, h),
            w,
            h,
        }
    }

    /// Move the rectangle by a normalized delta, keeping it fully inside the image.
    ///
    /// `x' = clamp(x + dx, 0, 1 - w)`, and the same for `y`. The size is never changed.
    pub fn translated(&self, dx: f64, dy: f64, min_size: f64) -> Self {
        let base = self.clamped(min_size);
        Self {
            x: fit_origin(base.x + dx, base.w),
            y: fit_origin(base.y + dy, base.h),
            ..base
        }
    }

    /// Drag one corner by a normalized delta.
    ///
    /// Only the edges owned by `handle` move; the opposite edges stay put. The
    /// moving edge is clamped so the rectangle never leaves the image and never
    /// shrinks below `min_size`. A side already narrower than `min_size` may
    /// grow but not shrink further.
    pub fn resized(&self, handle: ResizeHandle, dx: f64, dy: f64, min_size: f64) -> Self {
        let base = self.clamped(min_size);
        let (x, w) = move_edge(base.x, base.w, dx, handle.moves_left(), min_size);
        let (y, h) = move_edge(base.y, base.h, dy, handle.moves_top(), min_size);
        Self { x, y, w, h }
    }

    /// Project to container pixels.
    pub fn to_pixel_rect(&self, surface: &SurfaceSize) -> PixelRect {
        PixelRect::new(
            self.x * surface.width(),
            self.y * surface.height(),
            self.w * surface.width(),
            self.h * surface.height(),
        )
    }
}

/// Move either the low or the high edge of a span by `delta`.
///
/// Takes and returns the span as `(start, len)`. A zero delta leaves it untouched.
fn move_edge(start: f64, len: f64, delta: f64, move_low: bool, min_size: f64) -> (f64, f64) {
    if delta == 0.0 || delta.is_nan() {
        return (start, len);
    }
    let floor = min_size.min(len);
    let (low, high) = (start, start + len);
    let (low, high) = if move_low {
        (clamp_finite(low + delta, 0.0, high - floor), high)
    } else {
        (low, clamp_finite(high + delta, low + floor, 1.0))
    };
    let len = (high - low).min(1.0);
    (fit_origin(low, len), len)
}

/// Size of a side after repair: capped at 1, with degenerate values replaced by `min_size`.
fn repair_size(size: f64, min_size: f64) -> f64 {
    if size.is_finite() && size > 0.0 {
        size.min(1.0)
    } else {
        min_size.min(1.0)
    }
}

/// Clamp an origin so that `origin >= 0` and `origin + len <= 1` hold exactly in f64.
///
/// `1 - len` can round so that adding `len` back lands one ulp past 1; the
/// origin then steps down until the sum fits.
fn fit_origin(origin: f64, len: f64) -> f64 {
    let mut origin = clamp_finite(origin, 0.0, 1.0);
    if origin + len > 1.0 {
        origin = 1.0 - len;
        while origin > 0.0 && origin + len > 1.0 {
            origin -= f64::EPSILON;
        }
        origin = origin.max(0.0);
    }
    origin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MIN_ZONE_SIZE;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_from_corners_any_order() {
        let a = ZoneCoords::from_corners(NormPoint::new(0.6, 0.2), NormPoint::new(0.1, 0.7));
        assert!(approx_eq(a.x, 0.1));
        assert!(approx_eq(a.y, 0.2));
        assert!(approx_eq(a.w, 0.5));
        assert!(approx_eq(a.h, 0.5));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let zone = ZoneCoords::new(0.2, 0.2, 0.2, 0.2);
        assert!(zone.contains(NormPoint::new(0.2, 0.2)));
        assert!(zone.contains(NormPoint::new(0.4, 0.4)));
        assert!(!zone.contains(NormPoint::new(0.41, 0.3)));
    }

    #[test]
    fn test_clamped_fixes_oversized_import() {
        let zone = ZoneCoords::new(0.9, 0.9, 0.2, 0.2).clamped(MIN_ZONE_SIZE);
        assert!(approx_eq(zone.x, 0.8));
        assert!(approx_eq(zone.y, 0.8));
        assert!(zone.is_well_formed(EPSILON));

        let huge = ZoneCoords::new(-0.5, 0.3, 3.0, 0.0).clamped(MIN_ZONE_SIZE);
        assert_eq!(huge.x, 0.0);
        assert_eq!(huge.w, 1.0);
        assert_eq!(huge.h, MIN_ZONE_SIZE);
        assert!(huge.is_well_formed(EPSILON));
    }

    #[test]
    fn test_translated_stops_at_right_edge() {
        let zone = ZoneCoords::new(0.9, 0.9, 0.2, 0.2);
        let moved = zone.translated(0.3, 0.0, MIN_ZONE_SIZE);
        assert!(approx_eq(moved.x, 0.8));
        assert!(moved.right() <= 1.0 + EPSILON);
    }

    #[test]
    fn test_translated_stops_at_origin() {
        let zone = ZoneCoords::new(0.1, 0.1, 0.3, 0.3);
        let moved = zone.translated(-0.5, -0.05, MIN_ZONE_SIZE);
        assert_eq!(moved.x, 0.0);
        assert!(approx_eq(moved.y, 0.05));
        assert!(approx_eq(moved.w, 0.3));
    }

    #[test]
    fn test_resize_south_east_grows_size_only() {
        let zone = ZoneCoords::new(0.1, 0.1, 0.2, 0.2);
        let r = zone.resized(ResizeHandle::SouthEast, 0.1, 0.05, MIN_ZONE_SIZE);
        assert!(approx_eq(r.x, 0.1));
        assert!(approx_eq(r.y, 0.1));
        assert!(approx_eq(r.w, 0.3));
        assert!(approx_eq(r.h, 0.25));
    }

    #[test]
    fn test_resize_north_west_keeps_far_corner() {
        let zone = ZoneCoords::new(0.4, 0.4, 0.2, 0.2);
        let r = zone.resized(ResizeHandle::NorthWest, -0.1, 0.05, MIN_ZONE_SIZE);
        assert!(approx_eq(r.x, 0.3));
        assert!(approx_eq(r.y, 0.45));
        assert!(approx_eq(r.right(), 0.6));
        assert!(approx_eq(r.bottom(), 0.6));
    }

    #[test]
    fn test_resize_north_east_and_south_west() {
        let zone = ZoneCoords::new(0.4, 0.4, 0.2, 0.2);
        let ne = zone.resized(ResizeHandle::NorthEast, 0.1, -0.1, MIN_ZONE_SIZE);
        assert!(approx_eq(ne.x, 0.4));
        assert!(approx_eq(ne.y, 0.3));
        assert!(approx_eq(ne.w, 0.3));
        assert!(approx_eq(ne.h, 0.3));

        let sw = zone.resized(ResizeHandle::SouthWest, 0.1, 0.1, MIN_ZONE_SIZE);
        assert!(approx_eq(sw.x, 0.5));
        assert!(approx_eq(sw.y, 0.4));
        assert!(approx_eq(sw.w, 0.1));
        assert!(approx_eq(sw.h, 0.3));
    }

    #[test]
    fn test_resize_cannot_invert() {
        let zone = ZoneCoords::new(0.4, 0.4, 0.2, 0.2);
        let r = zone.resized(ResizeHandle::SouthEast, -0.9, -0.9, MIN_ZONE_SIZE);
        assert!(approx_eq(r.w, MIN_ZONE_SIZE));
        assert!(approx_eq(r.h, MIN_ZONE_SIZE));
        assert!(approx_eq(r.x, 0.4));

        let r = zone.resized(ResizeHandle::NorthWest, 0.9, 0.9, MIN_ZONE_SIZE);
        assert!(approx_eq(r.w, MIN_ZONE_SIZE));
        assert!(approx_eq(r.right(), 0.6));
    }

    #[test]
    fn test_resize_cannot_leave_image() {
        let zone = ZoneCoords::new(0.4, 0.4, 0.2, 0.2);
        let r = zone.resized(ResizeHandle::SouthEast, 2.0, 2.0, MIN_ZONE_SIZE);
        assert!(approx_eq(r.right(), 1.0));
        assert!(approx_eq(r.bottom(), 1.0));

        let r = zone.resized(ResizeHandle::NorthWest, -2.0, -2.0, MIN_ZONE_SIZE);
        assert_eq!(r.x, 0.0);
        assert_eq!(r.y, 0.0);
    }

    #[test]
    fn test_clamped_keeps_thin_valid_zone() {
        let thin = ZoneCoords::new(0.1, 0.1, 0.005, 0.05);
        assert_eq!(thin.clamped(MIN_ZONE_SIZE), thin);
    }

    #[test]
    fn test_zero_delta_edits_are_identity() {
        let thin = ZoneCoords::new(0.1, 0.1, 0.004999999999999999, 0.05);
        assert_eq!(thin.translated(0.0, 0.0, MIN_ZONE_SIZE), thin);
        for handle in ResizeHandle::ALL {
            assert_eq!(thin.resized(handle, 0.0, 0.0, MIN_ZONE_SIZE), thin);
        }

        let flush = ZoneCoords::new(0.1, 0.1, 0.9, 0.9);
        assert_eq!(flush.translated(0.0, 0.0, MIN_ZONE_SIZE), flush);
    }

    #[test]
    fn test_translated_keeps_thin_size() {
        let thin = ZoneCoords::new(0.1, 0.1, 0.005, 0.05);
        let moved = thin.translated(0.2, 2.0, MIN_ZONE_SIZE);
        assert_eq!(moved.w, 0.005);
        assert_eq!(moved.h, 0.05);
        assert!(approx_eq(moved.x, 0.3));
        assert!(moved.bottom() <= 1.0);
    }

    #[test]
    fn test_resize_thin_side_grows_but_never_shrinks() {
        let thin = ZoneCoords::new(0.5, 0.1, 0.005, 0.2);
        let shrunk = thin.resized(ResizeHandle::SouthEast, -0.1, 0.0, MIN_ZONE_SIZE);
        assert!(approx_eq(shrunk.w, 0.005));
        assert!(approx_eq(shrunk.x, 0.5));

        let grown = thin.resized(ResizeHandle::SouthEast, 0.1, 0.0, MIN_ZONE_SIZE);
        assert!(approx_eq(grown.w, 0.105));
        assert_eq!(grown.h, 0.2);
    }

    #[test]
    fn test_from_corners_to_far_corner_stays_inside() {
        for i in 0..1000 {
            let a = NormPoint::new(f64::from(i) / 1000.0, f64::from(i) / 1000.0);
            let rect = ZoneCoords::from_corners(a, NormPoint::new(1.0, 1.0));
            assert!(rect.right() <= 1.0, "{:?}", rect);
            assert!(rect.bottom() <= 1.0, "{:?}", rect);
        }
    }

    #[test]
    fn test_to_pixel_rect() {
        let surface = SurfaceSize::new(300.0, 150.0).unwrap();
        let rect = ZoneCoords::new(0.5, 0.5, 0.25, 0.5).to_pixel_rect(&surface);
        assert_eq!(rect, PixelRect::new(150.0, 75.0, 75.0, 75.0));
    }

    fn any_coords() -> impl Strategy<Value = ZoneCoords> {
        (-0.5f64..1.5, -0.5f64..1.5, -0.5f64..1.5, -0.5f64..1.5)
            .prop_map(|(x, y, w, h)| ZoneCoords::new(x, y, w, h))
    }

    fn any_handle() -> impl Strategy<Value = ResizeHandle> {
        prop::sample::select(ResizeHandle::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn edits_preserve_zone_invariant(
            start in any_coords(),
            steps in prop::collection::vec(
                (prop::option::of(any_handle()), -1.0f64..1.0, -1.0f64..1.0),
                1..20,
            ),
        ) {
            let mut zone = start.clamped(MIN_ZONE_SIZE);
            prop_assert!(zone.is_well_formed(0.0), "{:?}", zone);
            for (handle, dx, dy) in steps {
                let before = zone;
                zone = match handle {
                    Some(handle) => zone.resized(handle, dx, dy, MIN_ZONE_SIZE),
                    None => zone.translated(dx, dy, MIN_ZONE_SIZE),
                };
                prop_assert!(zone.is_well_formed(0.0), "{:?}", zone);
                prop_assert!(zone.w >= MIN_ZONE_SIZE.min(before.w) - EPSILON);
                prop_assert!(zone.h >= MIN_ZONE_SIZE.min(before.h) - EPSILON);
                if handle.is_none() {
                    prop_assert_eq!((zone.w, zone.h), (before.w, before.h));
                }
            }
        }

        #[test]
        fn drawn_rects_stay_inside_image(
            ax in 0.0f64..=1.0,
            ay in 0.0f64..=1.0,
            bx in 0.0f64..=1.0,
            by in 0.0f64..=1.0,
        ) {
            let rect = ZoneCoords::from_corners(NormPoint::new(ax, ay), NormPoint::new(bx, by));
            prop_assert!(rect.x >= 0.0 && rect.y >= 0.0);
            prop_assert!(rect.right() <= 1.0, "{:?}", rect);
            prop_assert!(rect.bottom() <= 1.0, "{:?}", rect);
            prop_assert!((rect.w - (ax - bx).abs()).abs() < EPSILON);
        }
    }
}
