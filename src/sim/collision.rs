//! One-dimensional overlap tests
//!
//! Walls, the hit zone and the character are all treated as horizontal spans
//! centered on an x coordinate.

/// Symmetric interval overlap: two spans centered at `a` and `b` overlap when
/// the distance between centers is less than their mean width.
#[inline]
pub fn spans_overlap(center_a: f32, width_a: f32, center_b: f32, width_b: f32) -> bool {
    (center_a - center_b).abs() < (width_a + width_b) / 2.0
}
