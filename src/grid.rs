//! Regular grid description.
//!
//! A [`Grid`] carries no data: it maps world coordinates to `(row, col)`
//! cell indices and back. Rows are numbered by increasing `y` starting at
//! `origin_y`, columns by increasing `x` starting at `origin_x`.
//!
//! A grid comes in two flavors:
//!
//! - [`Padding::Exact`]: addressable cells are exactly the `n_rows × n_cols`
//!   cells of the extent.
//! - [`Padding::Phantom`]: one extra phantom cell on every side. Phantom
//!   cells are unbounded on their outer side, so any coordinate (including
//!   vertices lying on or beyond the extent's edge) falls in some
//!   addressable cell. Ring traversal runs on phantom-padded grids.

use crate::basics::{intersect_rectangles, PointD, RectD};
use crate::error::{CoverageError, Result};

/// Outer bound used for the open side of phantom cells.
const PHANTOM_BOUND: f64 = f64::MAX;

/// Margin convention of a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Padding {
    #[default]
    Exact,
    Phantom,
}

impl Padding {
    /// Number of phantom cells on each side (0 or 1).
    #[inline]
    pub fn cells(self) -> usize {
        match self {
            Padding::Exact => 0,
            Padding::Phantom => 1,
        }
    }
}

/// Coordinate-system description of a regular grid.
///
/// Immutable; cropping and re-padding return new grids.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    origin_x: f64,
    origin_y: f64,
    cell_w: f64,
    cell_h: f64,
    n_rows: usize,
    n_cols: usize,
    padding: Padding,
}

impl Grid {
    /// Create an exact (unpadded) grid.
    ///
    /// `(origin_x, origin_y)` is the corner with the smallest coordinates.
    /// Fails with [`CoverageError::InvalidGrid`] unless both cell sizes are
    /// finite and positive and the origin is finite.
    pub fn new(
        origin_x: f64,
        origin_y: f64,
        cell_w: f64,
        cell_h: f64,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self> {
        if !(cell_w.is_finite() && cell_w > 0.0 && cell_h.is_finite() && cell_h > 0.0) {
            return Err(CoverageError::InvalidGrid(format!(
                "cell size must be finite and positive, got {}x{}",
                cell_w, cell_h
            )));
        }
        if !(origin_x.is_finite() && origin_y.is_finite()) {
            return Err(CoverageError::InvalidGrid(format!(
                "origin must be finite, got ({}, {})",
                origin_x, origin_y
            )));
        }
        Ok(Self {
            origin_x,
            origin_y,
            cell_w,
            cell_h,
            n_rows,
            n_cols,
            padding: Padding::Exact,
        })
    }

    /// Create an exact grid covering `extent`, rounding the cell counts to
    /// the nearest integer.
    pub fn from_extent(extent: &RectD, cell_w: f64, cell_h: f64) -> Result<Self> {
        if !extent.is_valid() {
            return Err(CoverageError::InvalidGrid(format!(
                "extent {:?} is not normalized",
                extent
            )));
        }
        let mut grid = Self::new(extent.x1, extent.y1, cell_w, cell_h, 0, 0)?;
        grid.n_cols = (extent.width() / cell_w).round() as usize;
        grid.n_rows = (extent.height() / cell_h).round() as usize;
        Ok(grid)
    }

    #[inline]
    pub fn origin_x(&self) -> f64 {
        self.origin_x
    }
    #[inline]
    pub fn origin_y(&self) -> f64 {
        self.origin_y
    }
    #[inline]
    pub fn cell_w(&self) -> f64 {
        self.cell_w
    }
    #[inline]
    pub fn cell_h(&self) -> f64 {
        self.cell_h
    }
    /// Rows of the extent, excluding phantom rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }
    /// Columns of the extent, excluding phantom columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }
    #[inline]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Addressable rows, including phantom rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.n_rows + 2 * self.padding.cells()
    }

    /// Addressable columns, including phantom columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.n_cols + 2 * self.padding.cells()
    }

    /// Whether the extent contains no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.n_cols == 0
    }

    /// Nominal area of one cell.
    #[inline]
    pub fn cell_area(&self) -> f64 {
        self.cell_w * self.cell_h
    }

    /// Same extent with a one-cell phantom margin.
    pub fn with_padding(&self) -> Grid {
        Grid {
            padding: Padding::Phantom,
            ..*self
        }
    }

    /// Same extent with no margin.
    pub fn without_padding(&self) -> Grid {
        Grid {
            padding: Padding::Exact,
            ..*self
        }
    }

    /// Grid with this origin, cell size and padding but no cells.
    pub fn emptied(&self) -> Grid {
        Grid {
            n_rows: 0,
            n_cols: 0,
            ..*self
        }
    }

    /// X coordinate of the left edge of extent column `col` (`col <= n_cols`).
    #[inline]
    pub fn x_for_col(&self, col: usize) -> f64 {
        self.origin_x + col as f64 * self.cell_w
    }

    /// Y coordinate of the lower edge of extent row `row` (`row <= n_rows`).
    #[inline]
    pub fn y_for_row(&self, row: usize) -> f64 {
        self.origin_y + row as f64 * self.cell_h
    }

    /// World-coordinate extent, excluding phantom cells.
    pub fn extent(&self) -> RectD {
        RectD::new(
            self.origin_x,
            self.origin_y,
            self.x_for_col(self.n_cols),
            self.y_for_row(self.n_rows),
        )
    }

    /// Center of extent cell `(row, col)` (indices exclude phantom cells).
    pub fn cell_center(&self, row: usize, col: usize) -> PointD {
        PointD::new(
            self.origin_x + (col as f64 + 0.5) * self.cell_w,
            self.origin_y + (row as f64 + 0.5) * self.cell_h,
        )
    }

    /// Center of addressable cell `(row, col)`, phantom cells included.
    ///
    /// Phantom cells report the center they would have at nominal size.
    pub fn addressable_center(&self, row: usize, col: usize) -> PointD {
        let pad = self.padding.cells() as f64;
        PointD::new(
            self.origin_x + (col as f64 - pad + 0.5) * self.cell_w,
            self.origin_y + (row as f64 - pad + 0.5) * self.cell_h,
        )
    }

    /// Bounds of addressable cell `(row, col)`.
    ///
    /// Phantom cells extend to [`f64::MAX`] on their outer side. Adjacent
    /// cells share bit-identical edge coordinates.
    pub fn cell_box(&self, row: usize, col: usize) -> RectD {
        let (x1, x2) = Self::axis_bounds(self.origin_x, self.cell_w, self.n_cols, self.padding, col);
        let (y1, y2) = Self::axis_bounds(self.origin_y, self.cell_h, self.n_rows, self.padding, row);
        RectD::new(x1, y1, x2, y2)
    }

    fn axis_bounds(origin: f64, size: f64, n: usize, padding: Padding, idx: usize) -> (f64, f64) {
        let edge = |i: usize| origin + i as f64 * size;
        match padding {
            Padding::Exact => (edge(idx), edge(idx + 1)),
            Padding::Phantom => {
                let lo = if idx == 0 { -PHANTOM_BOUND } else { edge(idx - 1) };
                let hi = if idx > n { PHANTOM_BOUND } else { edge(idx) };
                (lo, hi)
            }
        }
    }

    /// Addressable column containing `x`, clamped to the grid.
    ///
    /// Cells are half-open `[x1, x2)`, so on padded grids coordinates left
    /// of the extent map to the first phantom column and coordinates at or
    /// right of the extent's upper edge map to the last one. A point exactly
    /// on that upper edge therefore lands in a phantom column, not in the
    /// extent column it bounds.
    pub fn col_of(&self, x: f64) -> usize {
        let idx = Self::axis_index(self.origin_x, self.cell_w, self.n_cols, self.padding, x);
        // Rounding in the division may land one cell off near an edge.
        let b = self.cell_box(0, idx);
        if x < b.x1 && idx > 0 {
            idx - 1
        } else if x > b.x2 && idx + 1 < self.cols() {
            idx + 1
        } else {
            idx
        }
    }

    /// Addressable row containing `y`, clamped to the grid.
    ///
    /// Same convention as [`col_of`](Self::col_of): on padded grids `y` on
    /// the extent's upper edge maps to the upper phantom row.
    pub fn row_of(&self, y: f64) -> usize {
        let idx = Self::axis_index(self.origin_y, self.cell_h, self.n_rows, self.padding, y);
        let b = self.cell_box(idx, 0);
        if y < b.y1 && idx > 0 {
            idx - 1
        } else if y > b.y2 && idx + 1 < self.rows() {
            idx + 1
        } else {
            idx
        }
    }

    fn axis_index(origin: f64, size: f64, n: usize, padding: Padding, v: f64) -> usize {
        let raw = ((v - origin) / size).floor();
        match padding {
            Padding::Exact => {
                if n == 0 {
                    0
                } else {
                    raw.max(0.0).min((n - 1) as f64) as usize
                }
            }
            Padding::Phantom => (raw + 1.0).max(0.0).min((n + 1) as f64) as usize,
        }
    }

    /// Crop to the part of the extent intersecting `bbox`.
    ///
    /// Bounds are snapped outward to cell edges so the result fully contains
    /// `bbox ∩ extent`. A disjoint `bbox` yields an empty grid. The result
    /// uses the requested `padding` regardless of this grid's own.
    pub fn crop_to(&self, bbox: &RectD, padding: Padding) -> Grid {
        let ext = self.extent();
        let r = intersect_rectangles(bbox, &ext);
        if !r.is_valid() {
            return Grid {
                padding,
                ..self.emptied()
            };
        }

        let snap = |v: f64, n: usize| v.max(0.0).min(n as f64) as usize;
        let col0 = snap(((r.x1 - self.origin_x) / self.cell_w).floor(), self.n_cols);
        let col1 = snap(((r.x2 - self.origin_x) / self.cell_w).ceil(), self.n_cols).max(col0);
        let row0 = snap(((r.y1 - self.origin_y) / self.cell_h).floor(), self.n_rows);
        let row1 = snap(((r.y2 - self.origin_y) / self.cell_h).ceil(), self.n_rows).max(row0);

        Grid {
            origin_x: self.x_for_col(col0),
            origin_y: self.y_for_row(row0),
            cell_w: self.cell_w,
            cell_h: self.cell_h,
            n_rows: row1 - row0,
            n_cols: col1 - col0,
            padding,
        }
    }

    /// Position of this grid's first extent cell within `parent`'s extent.
    ///
    /// Returns `None` unless both grids share cell sizes and this extent lies
    /// inside the parent's on cell boundaries.
    pub fn offset_in(&self, parent: &Grid) -> Option<(usize, usize)> {
        if self.cell_w != parent.cell_w || self.cell_h != parent.cell_h {
            return None;
        }
        let row = ((self.origin_y - parent.origin_y) / self.cell_h).round();
        let col = ((self.origin_x - parent.origin_x) / self.cell_w).round();
        if row < 0.0 || col < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row + self.n_rows > parent.n_rows || col + self.n_cols > parent.n_cols {
            return None;
        }
        Some((row, col))
    }
}

// ============================================================================
// Tests
// ============================================================================
