//! Geometric math utilities.
//!
//! Signed polygon area, used for winding correction and for the per-cell
//! area computation.

use crate::basics::PointD;

/// Signed area of a polygon given as an open or closed vertex sequence.
///
/// Positive for counter-clockwise winding (y axis pointing up). A repeated
/// closing vertex contributes nothing, so both forms give the same result.
pub fn calc_polygon_area(vertices: &[PointD]) -> f64 {
    if vertices.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut x = vertices[0].x;
    let mut y = vertices[0].y;
    let xs = x;
    let ys = y;

    for v in &vertices[1..] {
        sum += x * v.y - y * v.x;
        x = v.x;
        y = v.y;
    }
    (sum + x * ys - y * xs) * 0.5
}

// ============================================================================
// Tests
// ============================================================================
