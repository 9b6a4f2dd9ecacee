//! Coordinate-space adapter.
//!
//! Layout tables address boxes in authoring space (origin top-left, y grows
//! downward); the PDF surface draws in bottom-left space (y grows upward).
//! Every component converts through the two functions here, so the flip
//! happens in exactly one place.

/// Draw-space y of the bottom edge of a box whose top edge sits at
/// `box_top_y` in authoring space.
pub fn to_draw_y(surface_height: f64, box_top_y: f64, box_height: f64) -> f64 {
    surface_height - box_top_y - box_height
}

/// Draw-space baseline for the 0-based `line_index`-th line of a box.
///
/// The first baseline hangs `pad + size` below the box's top edge; each
/// subsequent line drops one `line_height`.
pub fn baseline_y(
    surface_height: f64,
    box_top_y: f64,
    pad: f64,
    size: f64,
    line_height: f64,
    line_index: usize,
) -> f64 {
    surface_height - box_top_y - pad - size - line_index as f64 * line_height
}
