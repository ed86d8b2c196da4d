//! Cell box geometry: sides, point location and segment exit crossings.
//!
//! All functions treat the box as closed: a point on an edge is on the
//! boundary, not outside. Sides are named in world orientation, with `Top`
//! at `y2` and `Bottom` at `y1`; on a [`crate::grid::Grid`] leaving through
//! `Top` moves to the next higher row.

use crate::basics::{PointD, RectD};

/// Edge of a cell box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Not on any edge.
    None,
    Left,
    Right,
    Bottom,
    Top,
}

/// Position of a point relative to a closed box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// Point where a segment leaves a box, and the side it leaves through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub side: Side,
    pub point: PointD,
}

impl Crossing {
    #[inline]
    fn new(side: Side, x: f64, y: f64) -> Self {
        Self {
            side,
            point: PointD::new(x, y),
        }
    }
}

/// Edge `p` lies on. Corners report the vertical edge (`Left`/`Right`).
#[inline]
pub fn side_of(b: &RectD, p: PointD) -> Side {
    if p.x == b.x1 {
        Side::Left
    } else if p.x == b.x2 {
        Side::Right
    } else if p.y == b.y1 {
        Side::Bottom
    } else if p.y == b.y2 {
        Side::Top
    } else {
        Side::None
    }
}

#[inline]
pub fn locate(b: &RectD, p: PointD) -> Location {
    if p.x > b.x1 && p.x < b.x2 && p.y > b.y1 && p.y < b.y2 {
        Location::Inside
    } else if b.hit_test(p.x, p.y) {
        Location::Boundary
    } else {
        Location::Outside
    }
}

#[inline]
fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Where the segment `from → to` leaves the box.
///
/// `from` must lie in the closed box and `to` outside it. The returned point
/// is exactly on the reported side (its coordinate along that side is
/// clamped into the box), so it also lies on the neighbouring cell's edge.
pub fn crossing(b: &RectD, from: PointD, to: PointD) -> Crossing {
    if from.x == to.x {
        return if to.y >= b.y2 {
            Crossing::new(Side::Top, from.x, b.y2)
        } else {
            Crossing::new(Side::Bottom, from.x, b.y1)
        };
    }
    if from.y == to.y {
        return if to.x >= b.x2 {
            Crossing::new(Side::Right, b.x2, from.y)
        } else {
            Crossing::new(Side::Left, b.x1, from.y)
        };
    }

    let m = ((to.y - from.y) / (to.x - from.x)).abs();
    let up = to.y > from.y;
    let right = to.x > from.x;

    match (up, right) {
        (true, true) => {
            let y = from.y + m * (b.x2 - from.x);
            if y < b.y2 {
                Crossing::new(Side::Right, b.x2, clamp(y, b.y1, b.y2))
            } else {
                let x = from.x + (b.y2 - from.y) / m;
                Crossing::new(Side::Top, clamp(x, b.x1, b.x2), b.y2)
            }
        }
        (true, false) => {
            let y = from.y + m * (from.x - b.x1);
            if y < b.y2 {
                Crossing::new(Side::Left, b.x1, clamp(y, b.y1, b.y2))
            } else {
                let x = from.x - (b.y2 - from.y) / m;
                Crossing::new(Side::Top, clamp(x, b.x1, b.x2), b.y2)
            }
        }
        (false, true) => {
            let y = from.y - m * (b.x2 - from.x);
            if y > b.y1 {
                Crossing::new(Side::Right, b.x2, clamp(y, b.y1, b.y2))
            } else {
                let x = from.x + (from.y - b.y1) / m;
                Crossing::new(Side::Bottom, clamp(x, b.x1, b.x2), b.y1)
            }
        }
        (false, false) => {
            let y = from.y - m * (from.x - b.x1);
            if y > b.y1 {
                Crossing::new(Side::Left, b.x1, clamp(y, b.y1, b.y2))
            } else {
                let x = from.x - (from.y - b.y1) / m;
                Crossing::new(Side::Bottom, clamp(x, b.x1, b.x2), b.y1)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
