//! Display/original coordinate conversion.
//!
//! The image is rendered on screen at a scaled size; annotations are edited
//! in that display space but persisted (for some formats) in the source
//! image's native resolution. These functions are the exclusive conversion
//! mechanism for every codec and for prediction-result placement, which
//! keeps round trips consistent: `to_display(to_original(p)) ≈ p` up to
//! float rounding. Any integer truncation is format policy, applied in the
//! codecs, never here.

use super::{Point, Size};

/// Map a display-space point into original-image pixel coordinates.
///
/// The x and y axes scale independently by `original / display`.
pub fn to_original(p: Point, display: Size, original: Size) -> Point {
    let scale_x = original.width / display.width;
    let scale_y = original.height / display.height;
    Point::new(p.x * scale_x, p.y * scale_y)
}

/// Map original-image pixel coordinates into display space.
///
/// The x and y axes scale independently by `display / original`.
pub fn to_display(x: f32, y: f32, display: Size, original: Size) -> Point {
    let scale_x = display.width / original.width;
    let scale_y = display.height / original.height;
    Point::new(x * scale_x, y * scale_y)
}

/// Size at which an image is displayed inside a viewport, preserving the
/// aspect ratio (uniform scale, the smaller of the two axis ratios).
pub fn fit_display_size(original: Size, viewport: Size) -> Size {
    let scale = (viewport.width / original.width).min(viewport.height / original.height);
    Size::new(original.width * scale, original.height * scale)
}
