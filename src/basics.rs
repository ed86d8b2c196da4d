//! Foundation types shared by every other module.
//!
//! Points and axis-aligned rectangles in `f64` world coordinates, plus the
//! rectangle intersection/union helpers used when cropping grids.

// ============================================================================
// Point
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointBase<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> PointBase<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

pub type PointD = PointBase<f64>;

// ============================================================================
// RectD
// ============================================================================

/// Axis-aligned rectangle `[x1, x2] x [y1, y2]`.
///
/// Valid when `x1 <= x2` and `y1 <= y2`. Degenerate rectangles (zero width
/// or height) are valid and have zero area. Bounds may be `±f64::MAX` for
/// boxes that extend without limit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectD {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl RectD {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Closed containment test.
    #[inline]
    pub fn hit_test(&self, x: f64, y: f64) -> bool {
        (self.x1..=self.x2).contains(&x) && (self.y1..=self.y2).contains(&y)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Area, or 0 for an invalid rectangle.
    #[inline]
    pub fn area(&self) -> f64 {
        if self.is_valid() {
            self.width() * self.height()
        } else {
            0.0
        }
    }

    /// Bounding box of `points`, `None` if there are none.
    pub fn from_points(points: &[PointD]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let seed = Self::new(first.x, first.y, first.x, first.y);
        Some(rest.iter().fold(seed, |r, p| {
            Self::new(r.x1.min(p.x), r.y1.min(p.y), r.x2.max(p.x), r.y2.max(p.y))
        }))
    }
}

/// Overlap of two rectangles; invalid (see [`RectD::is_valid`]) when they
/// are disjoint.
pub fn intersect_rectangles(a: &RectD, b: &RectD) -> RectD {
    RectD::new(a.x1.max(b.x1), a.y1.max(b.y1), a.x2.min(b.x2), a.y2.min(b.y2))
}

/// Smallest rectangle containing both.
pub fn unite_rectangles(a: &RectD, b: &RectD) -> RectD {
    RectD::new(a.x1.min(b.x1), a.y1.min(b.y1), a.x2.max(b.x2), a.y2.max(b.y2))
}

// ============================================================================
// Tests
// ============================================================================
