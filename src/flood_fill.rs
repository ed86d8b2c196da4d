//! Resolution of cells the ring boundary never decided.
//!
//! After traversal a ring-local matrix holds exact fractions for every cell
//! the boundary touched and [`UNKNOWN`] everywhere else. Every 4-connected
//! region of unknown cells lies wholly inside or wholly outside the ring, so
//! one point-in-polygon query per region is enough to settle all of its
//! cells.

use std::collections::VecDeque;

use log::trace;

use crate::error::{CoverageError, Result};
use crate::geometry::PointLocator;
use crate::grid::Grid;
use crate::matrix::Matrix;

/// Placeholder for cells whose coverage is not yet known.
pub const UNKNOWN: f64 = -1.0;

/// Region filler for a ring-local coverage matrix.
pub struct FloodFill<'a, L: PointLocator + ?Sized> {
    grid: &'a Grid,
    locator: &'a L,
}

impl<'a, L: PointLocator + ?Sized> FloodFill<'a, L> {
    /// `grid` is the grid the matrix covers; its addressable cells, phantom
    /// cells included, map one to one onto matrix cells.
    pub fn new(grid: &'a Grid, locator: &'a L) -> Self {
        Self { grid, locator }
    }

    /// Replace every [`UNKNOWN`] cell of `matrix` with `0.0` or `1.0`.
    ///
    /// Returns the number of regions filled, which is also the number of
    /// locator queries made.
    pub fn flood(&self, matrix: &mut Matrix<f64>) -> Result<usize> {
        if matrix.rows() != self.grid.rows() || matrix.cols() != self.grid.cols() {
            return Err(CoverageError::InvalidGrid(format!(
                "matrix is {}x{} but the grid has {}x{} cells",
                matrix.rows(),
                matrix.cols(),
                self.grid.rows(),
                self.grid.cols()
            )));
        }

        let mut regions = 0;
        let mut queue = VecDeque::new();
        for row in 0..matrix.rows() {
            for col in 0..matrix.cols() {
                if matrix[(row, col)] != UNKNOWN {
                    continue;
                }
                let inside = self.locator.contains(self.grid.addressable_center(row, col));
                let value = if inside { 1.0 } else { 0.0 };
                let filled = fill_region(matrix, &mut queue, row, col, value);
                regions += 1;
                trace!(
                    "filled {} cells from ({}, {}) with {}",
                    filled,
                    row,
                    col,
                    value
                );
            }
        }
        Ok(regions)
    }
}

/// Scanline fill of the 4-connected unknown region containing the seed.
///
/// Returns the number of cells written.
fn fill_region(
    matrix: &mut Matrix<f64>,
    queue: &mut VecDeque<(usize, usize)>,
    seed_row: usize,
    seed_col: usize,
    value: f64,
) -> usize {
    let rows = matrix.rows();
    let cols = matrix.cols();
    let mut filled = 0;

    queue.clear();
    queue.push_back((seed_row, seed_col));
    while let Some((row, col)) = queue.pop_front() {
        if matrix[(row, col)] != UNKNOWN {
            continue;
        }

        let mut left = col;
        while left > 0 && matrix[(row, left - 1)] == UNKNOWN {
            left -= 1;
        }
        let mut right = col;
        while right + 1 < cols && matrix[(row, right + 1)] == UNKNOWN {
            right += 1;
        }

        for c in left..=right {
            matrix[(row, c)] = value;
            filled += 1;
        }

        // Seed the neighbouring rows once per unknown span.
        for next in [row.checked_sub(1), Some(row + 1).filter(|&r| r < rows)]
            .into_iter()
            .flatten()
        {
            let mut in_span = false;
            for c in left..=right {
                let unknown = matrix[(next, c)] == UNKNOWN;
                if unknown && !in_span {
                    queue.push_back((next, c));
                }
                in_span = unknown;
            }
        }
    }
    filled
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::PointD;
    use core::cell::Cell;

    /// Locator answering from a predicate and counting its queries.
    struct Counting<F: Fn(PointD) -> bool> {
        inside: F,
        queries: Cell<usize>,
    }

    impl<F: Fn(PointD) -> bool> Counting<F> {
        fn new(inside: F) -> Self {
            Self {
                inside,
                queries: Cell::new(0),
            }
        }
    }

    impl<F: Fn(PointD) -> bool> PointLocator for Counting<F> {
        fn contains(&self, p: PointD) -> bool {
            self.queries.set(self.queries.get() + 1);
            (self.inside)(p)
        }
    }

    fn grid(rows: usize, cols: usize) -> Grid {
        Grid::new(0.0, 0.0, 1.0, 1.0, rows, cols).unwrap()
    }

    #[test]
    fn test_all_unknown_is_one_region() {
        let g = grid(4, 5);
        let loc = Counting::new(|_| true);
        let mut m = Matrix::filled(4, 5, UNKNOWN);
        let regions = FloodFill::new(&g, &loc).flood(&mut m).unwrap();
        assert_eq!(regions, 1);
        assert_eq!(loc.queries.get(), 1);
        assert!(m.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_wall_splits_regions() {
        // Column 2 is a boundary wall; left side inside, right side outside.
        let g = grid(3, 5);
        let loc = Counting::new(|p: PointD| p.x < 2.0);
        let mut m = Matrix::filled(3, 5, UNKNOWN);
        for row in 0..3 {
            m.set(row, 2, 0.5).unwrap();
        }
        let regions = FloodFill::new(&g, &loc).flood(&mut m).unwrap();
        assert_eq!(regions, 2);
        assert_eq!(loc.queries.get(), 2);
        for row in 0..3 {
            assert_eq!(m.row(row).unwrap(), &[1.0, 1.0, 0.5, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_diagonal_neighbours_are_not_connected() {
        let g = grid(2, 2);
        let loc = Counting::new(|p: PointD| p.x < 1.0);
        let mut m = Matrix::filled(2, 2, 0.5);
        m.set(0, 0, UNKNOWN).unwrap();
        m.set(1, 1, UNKNOWN).unwrap();
        let regions = FloodFill::new(&g, &loc).flood(&mut m).unwrap();
        assert_eq!(regions, 2);
        assert_eq!(m.as_slice(), &[1.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_ring_shaped_wall_encloses_region() {
        // A 5x5 frame of boundary cells around a 3x3 hole of unknowns,
        // with unknowns again outside the frame.
        let g = grid(7, 7);
        let loc = Counting::new(|p: PointD| (p.x - 3.5).abs() < 1.5 && (p.y - 3.5).abs() < 1.5);
        let mut m = Matrix::filled(7, 7, UNKNOWN);
        for i in 1..6 {
            m.set(1, i, 0.5).unwrap();
            m.set(5, i, 0.5).unwrap();
            m.set(i, 1, 0.5).unwrap();
            m.set(i, 5, 0.5).unwrap();
        }
        let regions = FloodFill::new(&g, &loc).flood(&mut m).unwrap();
        assert_eq!(regions, 2);
        assert_eq!(m[(3, 3)], 1.0);
        assert_eq!(m[(2, 4)], 1.0);
        assert_eq!(m[(0, 0)], 0.0);
        assert_eq!(m[(6, 3)], 0.0);
        assert!(m.as_slice().iter().all(|&v| v != UNKNOWN));
    }

    #[test]
    fn test_concave_region_filled_with_one_query() {
        // U-shaped unknown region wrapping around a block of known cells.
        let g = grid(4, 5);
        let loc = Counting::new(|_| false);
        let mut m = Matrix::filled(4, 5, UNKNOWN);
        for row in 1..4 {
            for col in 1..4 {
                m.set(row, col, 0.25).unwrap();
            }
        }
        let regions = FloodFill::new(&g, &loc).flood(&mut m).unwrap();
        assert_eq!(regions, 1);
        assert_eq!(m[(3, 0)], 0.0);
        assert_eq!(m[(3, 4)], 0.0);
        assert_eq!(m[(2, 2)], 0.25);
    }

    #[test]
    fn test_nothing_unknown_makes_no_queries() {
        let g = grid(2, 2);
        let loc = Counting::new(|_| true);
        let mut m = Matrix::filled(2, 2, 0.75);
        assert_eq!(FloodFill::new(&g, &loc).flood(&mut m).unwrap(), 0);
        assert_eq!(loc.queries.get(), 0);
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let g = grid(2, 2);
        let loc = Counting::new(|_| true);
        let mut m = Matrix::filled(3, 2, UNKNOWN);
        assert!(matches!(
            FloodFill::new(&g, &loc).flood(&mut m),
            Err(CoverageError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_padded_grid_margin_joins_outside() {
        // Four disconnected outside corners join through the phantom margin.
        let g = grid(3, 3).with_padding();
        let loc = Counting::new(|p: PointD| (p.x - 1.5).abs() < 1.0 && (p.y - 1.5).abs() < 1.0);
        let mut m = Matrix::filled(5, 5, UNKNOWN);
        for (row, col) in [(1, 2), (2, 1), (2, 3), (3, 2)] {
            m.set(row, col, 0.5).unwrap();
        }
        let regions = FloodFill::new(&g, &loc).flood(&mut m).unwrap();
        assert_eq!(regions, 2);
        assert_eq!(m[(1, 1)], 0.0);
        assert_eq!(m[(3, 3)], 0.0);
        assert_eq!(m[(2, 2)], 1.0);
    }

    #[test]
    fn test_queries_use_cell_centers() {
        let g = Grid::new(10.0, 20.0, 2.0, 2.0, 1, 1).unwrap();
        let loc = Counting::new(|p: PointD| p == PointD::new(11.0, 21.0));
        let mut m = Matrix::filled(1, 1, UNKNOWN);
        FloodFill::new(&g, &loc).flood(&mut m).unwrap();
        assert_eq!(m[(0, 0)], 1.0);
    }
}
