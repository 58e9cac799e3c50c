use serde::{Deserialize, Serialize};

/// A pointer position in CSS pixels, relative to the overlay container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A position in normalized image space. Both axes run from 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

impl NormPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Displayed size of the overlay container, in CSS pixels.
///
/// Always finite and strictly positive; a container that has not been laid
/// out yet (or shows a placeholder) has no `SurfaceSize` at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    width: f64,
    height: f64,
}

impl SurfaceSize {
    /// Create a surface size, rejecting zero, negative and non-finite dimensions.
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Clamp a pointer position to the container bounds.
    pub fn clamp(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(
            clamp_finite(point.x, 0.0, self.width),
            clamp_finite(point.y, 0.0, self.height),
        )
    }

    /// Convert a pixel position to normalized coordinates.
    ///
    /// The pixel input is clamped to the container first, so the result is
    /// always inside `[0, 1]` on both axes.
    pub fn to_normalized(&self, point: PixelPoint) -> NormPoint {
        let clamped = self.clamp(point);
        NormPoint::new(clamped.x / self.width, clamped.y / self.height)
    }

    /// Project a normalized position back to container pixels.
    pub fn to_pixel(&self, point: NormPoint) -> PixelPoint {
        PixelPoint::new(point.x * self.width, point.y * self.height)
    }

    /// Convert a pixel displacement to a normalized displacement (no clamping).
    pub fn delta_to_normalized(&self, from: PixelPoint, to: PixelPoint) -> (f64, f64) {
        ((to.x - from.x) / self.width, (to.y - from.y) / self.height)
    }
}

/// Normalize a pixel position against raw container dimensions.
///
/// Degenerate containers (zero or non-finite size) map everything to the origin.
pub fn to_normalized(
    pixel_x: f64,
    pixel_y: f64,
    container_width: f64,
    container_height: f64,
) -> (f64, f64) {
    match SurfaceSize::new(container_width, container_height) {
        Some(surface) => {
            let p = surface.to_normalized(PixelPoint::new(pixel_x, pixel_y));
            (p.x, p.y)
        }
        None => (0.0, 0.0),
    }
}

/// Clamp that maps NaN to the lower bound and never panics.
///
/// When rounding leaves `min` a hair above `max`, `max` wins.
pub(crate) fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min.min(max)
    } else {
        value.max(min).min(max)
    }
}
