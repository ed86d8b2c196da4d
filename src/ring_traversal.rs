//! Per-ring coverage on a cropped, phantom-padded subgrid.
//!
//! The ring is walked vertex by vertex through the cells of its own bounding
//! subgrid. Only cells the boundary enters get a [`CoverageCell`]; they are
//! kept in an arena indexed by `(row, col)` so the traversal state grows with
//! the ring's perimeter rather than its area. Cells the boundary never enters
//! are resolved afterwards by [`FloodFill`].
//!
//! Axis-aligned rectangles skip the walk: their fractions follow directly
//! from rectangle intersection.

use std::collections::HashMap;

use log::{debug, trace};

use crate::basics::{intersect_rectangles, PointD, RectD};
use crate::cell_box::Side;
use crate::coverage_cell::CoverageCell;
use crate::error::{CoverageError, Result};
use crate::flood_fill::{FloodFill, UNKNOWN};
use crate::geometry::{PointLocator, Ring};
use crate::grid::{Grid, Padding};
use crate::matrix::Matrix;

// ============================================================================
// RingCoverage
// ============================================================================

/// Coverage fractions of one ring over its bounding subgrid.
#[derive(Debug, Clone, PartialEq)]
pub struct RingCoverage {
    matrix: Matrix<f64>,
    row_offset: usize,
    col_offset: usize,
    touched_cells: usize,
    locator_queries: usize,
}

impl RingCoverage {
    /// Fractions in `[0, 1]`, one per cell of the ring's subgrid.
    #[inline]
    pub fn matrix(&self) -> &Matrix<f64> {
        &self.matrix
    }

    /// First row of the ring's subgrid within the grid it was computed on.
    #[inline]
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// First column of the ring's subgrid within the grid it was computed on.
    #[inline]
    pub fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Cells that held traversal state, phantom cells included.
    #[inline]
    pub fn touched_cells(&self) -> usize {
        self.touched_cells
    }

    /// Point-in-polygon queries made to resolve the ring.
    #[inline]
    pub fn locator_queries(&self) -> usize {
        self.locator_queries
    }
}

// ============================================================================
// RingTraversal
// ============================================================================

/// Computes [`RingCoverage`] for rings over a fixed grid.
pub struct RingTraversal<'g> {
    grid: &'g Grid,
}

impl<'g> RingTraversal<'g> {
    /// `grid` is the grid offsets are reported against, usually the
    /// geometry-wide subgrid.
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    /// Coverage of `ring`, or `None` if the ring does not overlap the grid.
    ///
    /// `locator` answers point-in-polygon queries against the same ring.
    pub fn rasterize<L: PointLocator + ?Sized>(
        &self,
        ring: &Ring,
        locator: &L,
    ) -> Result<Option<RingCoverage>> {
        let ring_grid = self.grid.crop_to(&ring.bbox(), Padding::Phantom);
        if ring_grid.is_empty() {
            debug!("ring {:?} misses the grid", ring.bbox());
            return Ok(None);
        }
        let (row_offset, col_offset) = ring_grid.offset_in(self.grid).ok_or_else(|| {
            CoverageError::InvalidGrid("ring subgrid is not aligned with its parent".to_string())
        })?;

        let (matrix, touched_cells, locator_queries) = if ring.is_rectangle() {
            (rectangle_fractions(&ring.bbox(), &ring_grid), 0, 0)
        } else {
            walk_ring(ring, &ring_grid, locator)?
        };

        debug!(
            "ring over {}x{} cells at ({}, {}): {} touched, {} queries",
            ring_grid.n_rows(),
            ring_grid.n_cols(),
            row_offset,
            col_offset,
            touched_cells,
            locator_queries
        );
        Ok(Some(RingCoverage {
            matrix,
            row_offset,
            col_offset,
            touched_cells,
            locator_queries,
        }))
    }
}

// ============================================================================
// Rectangle fast path
// ============================================================================

/// Fractions of each extent cell of `ring_grid` covered by `rect`.
fn rectangle_fractions(rect: &RectD, ring_grid: &Grid) -> Matrix<f64> {
    let exact = ring_grid.without_padding();
    let mut matrix = Matrix::new(exact.n_rows(), exact.n_cols());
    for row in 0..exact.n_rows() {
        for col in 0..exact.n_cols() {
            let cell = exact.cell_box(row, col);
            let covered = intersect_rectangles(rect, &cell).area();
            matrix[(row, col)] = (covered / cell.area()).clamp(0.0, 1.0);
        }
    }
    matrix
}

// ============================================================================
// General path
// ============================================================================

/// Touched cells of one ring, keyed by addressable `(row, col)`.
struct CellArena<'a> {
    grid: &'a Grid,
    index: HashMap<(usize, usize), usize>,
    cells: Vec<CoverageCell>,
}

impl<'a> CellArena<'a> {
    fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            index: HashMap::new(),
            cells: Vec::new(),
        }
    }

    /// Cell state for `(row, col)`, created on first touch.
    fn cell_mut(&mut self, row: usize, col: usize) -> &mut CoverageCell {
        let grid = self.grid;
        let cells = &mut self.cells;
        let slot = *self.index.entry((row, col)).or_insert_with(|| {
            cells.push(CoverageCell::new(grid.cell_box(row, col)));
            cells.len() - 1
        });
        &mut self.cells[slot]
    }

    fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Neighbour of `(row, col)` across `side`, if it is addressable.
fn step(row: usize, col: usize, side: Side, rows: usize, cols: usize) -> Result<(usize, usize)> {
    let next = match side {
        Side::Top => Some((row + 1, col)),
        Side::Bottom => row.checked_sub(1).map(|r| (r, col)),
        Side::Right => Some((row, col + 1)),
        Side::Left => col.checked_sub(1).map(|c| (row, c)),
        Side::None => None,
    };
    match next {
        Some((r, c)) if r < rows && c < cols => Ok((r, c)),
        _ => Err(CoverageError::IndexOutOfRange {
            row,
            col,
            rows,
            cols,
        }),
    }
}

/// Cell the walk starts in.
///
/// A first vertex on the extent's upper edge would map to the phantom cell
/// beyond it; a ring running along that edge would then only touch phantom
/// cells and leave the extent cells inside the edge unresolved. Points in
/// the closed extent therefore always start in an extent cell.
fn start_cell(ring_grid: &Grid, p: PointD) -> (usize, usize) {
    let (row, col) = (ring_grid.row_of(p.y), ring_grid.col_of(p.x));
    if !ring_grid.extent().hit_test(p.x, p.y) {
        return (row, col);
    }
    let pad = ring_grid.padding().cells();
    (
        row.clamp(pad, pad + ring_grid.n_rows() - 1),
        col.clamp(pad, pad + ring_grid.n_cols() - 1),
    )
}

/// Walk the ring through `ring_grid` and resolve every extent cell.
///
/// Returns the fraction matrix, the number of touched cells and the number
/// of locator queries.
fn walk_ring<L: PointLocator + ?Sized>(
    ring: &Ring,
    ring_grid: &Grid,
    locator: &L,
) -> Result<(Matrix<f64>, usize, usize)> {
    let rows = ring_grid.rows();
    let cols = ring_grid.cols();
    let coords = ring.coords();
    let start = start_cell(ring_grid, coords[0]);

    let mut arena = CellArena::new(ring_grid);
    let (mut row, mut col) = start;
    // Upcoming points, next one on top. Exit points are pushed back so the
    // neighbouring cell starts its traversal there.
    let mut pending: Vec<PointD> = coords.iter().rev().copied().collect();
    while let Some(&p) = pending.last() {
        let cell = arena.cell_mut(row, col);
        if cell.take(p) {
            pending.pop();
            continue;
        }
        let (exit, side) = cell
            .last_traversal()
            .and_then(|t| t.last_coordinate().map(|c| (c, t.exit_side())))
            .ok_or_else(|| {
                CoverageError::InvalidGeometry("traversal lost its exit point".to_string())
            })?;
        trace!("leaving cell ({}, {}) through {:?} at {:?}", row, col, side, exit);
        pending.push(exit);
        (row, col) = step(row, col, side, rows, cols)?;
    }

    arena.cell_mut(start.0, start.1).join_open_ends();

    let pad = ring_grid.padding().cells();
    let is_extent = |r: usize, c: usize| {
        r >= pad && r < pad + ring_grid.n_rows() && c >= pad && c < pad + ring_grid.n_cols()
    };

    // Phantom cells of a ring lying wholly inside the subgrid are outside
    // the ring, and leaving them unknown links every outside region that
    // reaches the margin into one. A clipped ring may cover phantom cells,
    // so they are fixed to 0 and act as walls instead.
    let extent = ring_grid.extent();
    let bbox = ring.bbox();
    let unclipped = extent.hit_test(bbox.x1, bbox.y1) && extent.hit_test(bbox.x2, bbox.y2);
    let margin = if unclipped { UNKNOWN } else { 0.0 };

    let mut matrix = Matrix::filled(rows, cols, UNKNOWN);
    for r in 0..rows {
        for c in 0..cols {
            if !is_extent(r, c) {
                matrix[(r, c)] = margin;
            }
        }
    }

    let mut queries = 0;
    for (&(r, c), &slot) in &arena.index {
        let cell = &mut arena.cells[slot];
        cell.force_exit();
        if !is_extent(r, c) {
            continue;
        }
        let fraction = cell.covered_fraction();
        matrix[(r, c)] = if fraction > 0.0 {
            fraction
        } else {
            // Touched without enclosing any area: a tangency, decided by
            // the cell center.
            queries += 1;
            if locator.contains(ring_grid.addressable_center(r, c)) {
                1.0
            } else {
                0.0
            }
        };
    }

    queries += FloodFill::new(ring_grid, locator).flood(&mut matrix)?;

    let mut fractions = Matrix::new(ring_grid.n_rows(), ring_grid.n_cols());
    for r in 0..ring_grid.n_rows() {
        for c in 0..ring_grid.n_cols() {
            fractions[(r, c)] = matrix[(r + pad, c + pad)];
        }
    }
    Ok((fractions, arena.len(), queries))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PreparedRing;

    fn ring(v: &[(f64, f64)]) -> Ring {
        Ring::new(v.iter().map(|&(x, y)| PointD::new(x, y)).collect()).unwrap()
    }

    fn unit_grid(n: usize) -> Grid {
        Grid::new(0.0, 0.0, 1.0, 1.0, n, n).unwrap().with_padding()
    }

    fn run(grid: &Grid, r: &Ring) -> RingCoverage {
        RingTraversal::new(grid)
            .rasterize(r, &PreparedRing::new(r))
            .unwrap()
            .unwrap()
    }

    fn circle(cx: f64, cy: f64, radius: f64, n: usize) -> Ring {
        let pts: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = i as f64 * core::f64::consts::TAU / n as f64;
                (cx + radius * a.cos(), cy + radius * a.sin())
            })
            .collect();
        ring(&pts)
    }

    #[test]
    fn test_triangle_fractions() {
        let g = unit_grid(4);
        let rc = run(&g, &ring(&[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)]));
        assert_eq!((rc.row_offset(), rc.col_offset()), (0, 0));
        let m = rc.matrix();
        for row in 0..4 {
            for col in 0..4 {
                let expected = match row + col {
                    s if s < 3 => 1.0,
                    3 => 0.5,
                    _ => 0.0,
                };
                assert!(
                    (m[(row, col)] - expected).abs() < 1e-12,
                    "cell ({}, {}) = {}",
                    row,
                    col,
                    m[(row, col)]
                );
            }
        }
        assert!((m.sum() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_diamond_conserves_area() {
        let g = unit_grid(4);
        let rc = run(&g, &ring(&[(2.0, 0.0), (4.0, 2.0), (2.0, 4.0), (0.0, 2.0)]));
        let m = rc.matrix();
        assert!((m.sum() - 8.0).abs() < 1e-12);
        assert_eq!(m[(1, 1)], 1.0);
        assert_eq!(m[(0, 0)], 0.0);
        assert!((m[(0, 1)] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_clockwise_input_gives_same_result() {
        let g = unit_grid(6);
        let ccw = ring(&[(0.5, 0.5), (5.2, 1.1), (3.3, 4.7)]);
        let cw = ring(&[(3.3, 4.7), (5.2, 1.1), (0.5, 0.5)]);
        let a = run(&g, &ccw);
        let b = run(&g, &cw);
        assert_eq!(a.matrix().rows(), b.matrix().rows());
        for (x, y) in a.matrix().as_slice().iter().zip(b.matrix().as_slice()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_convex_ring_costs_two_queries() {
        let g = unit_grid(10);
        let c = circle(5.1, 4.9, 2.7, 48);
        let rc = run(&g, &c);
        assert_eq!(rc.locator_queries(), 2);
        assert!((rc.matrix().sum() - c.area()).abs() < 1e-9);
        assert!(rc.touched_cells() > 0);
    }

    #[test]
    fn test_offsets_within_parent() {
        let g = unit_grid(10);
        let rc = run(&g, &ring(&[(3.5, 6.2), (5.5, 6.2), (4.5, 8.9)]));
        assert_eq!(rc.row_offset(), 6);
        assert_eq!(rc.col_offset(), 3);
        assert_eq!(rc.matrix().rows(), 3);
        assert_eq!(rc.matrix().cols(), 3);
        assert!((rc.matrix().sum() - 2.7).abs() < 1e-12);
    }

    #[test]
    fn test_ring_inside_one_cell() {
        let g = unit_grid(5);
        let small = ring(&[(2.2, 3.2), (2.8, 3.2), (2.8, 3.6), (2.5, 3.9)]);
        let rc = run(&g, &small);
        assert_eq!(rc.matrix().rows(), 1);
        assert_eq!(rc.matrix().cols(), 1);
        assert!((rc.matrix()[(0, 0)] - small.area()).abs() < 1e-12);
        assert_eq!(rc.touched_cells(), 1);
    }

    #[test]
    fn test_vertices_on_cell_edges() {
        // Octagon with every vertex on a grid line.
        let g = unit_grid(6);
        let oct = ring(&[
            (2.0, 0.0),
            (4.0, 0.0),
            (6.0, 2.0),
            (6.0, 4.0),
            (4.0, 6.0),
            (2.0, 6.0),
            (0.0, 4.0),
            (0.0, 2.0),
        ]);
        let rc = run(&g, &oct);
        let m = rc.matrix();
        assert!((m.sum() - 28.0).abs() < 1e-12);
        assert_eq!(m[(0, 0)], 0.0);
        assert!((m[(0, 1)] - 0.5).abs() < 1e-12);
        assert_eq!(m[(0, 2)], 1.0);
        assert_eq!(m[(3, 3)], 1.0);
    }

    #[test]
    fn test_ring_clipped_by_grid() {
        // Triangle sticking out of the right side of the grid.
        let g = unit_grid(4);
        let rc = run(&g, &ring(&[(2.0, 1.0), (6.0, 1.0), (6.0, 3.0)]));
        let m = rc.matrix();
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert_eq!(rc.col_offset(), 2);
        // Between x=2 and x=4 the triangle covers 1 unit of area.
        assert!((m.sum() - 1.0).abs() < 1e-12);
        assert!(m.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_ring_covering_whole_grid() {
        let g = unit_grid(3);
        let big = ring(&[(-5.0, -5.0), (20.0, -4.0), (7.0, 30.0)]);
        let rc = run(&g, &big);
        assert!(rc.matrix().as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_ring_missing_grid() {
        let g = unit_grid(3);
        let far = ring(&[(10.0, 10.0), (12.0, 10.0), (11.0, 12.0)]);
        let res = RingTraversal::new(&g).rasterize(&far, &PreparedRing::new(&far));
        assert_eq!(res, Ok(None));
    }

    #[test]
    fn test_rectangle_fast_path() {
        let g = unit_grid(6);
        let rect = ring(&[(1.5, 1.25), (4.0, 1.25), (4.0, 3.5), (1.5, 3.5)]);
        assert!(rect.is_rectangle());
        let rc = run(&g, &rect);
        assert_eq!(rc.locator_queries(), 0);
        assert_eq!(rc.touched_cells(), 0);
        let m = rc.matrix();
        assert_eq!((m.rows(), m.cols()), (3, 3));
        assert!((m[(0, 0)] - 0.375).abs() < 1e-12);
        assert!((m[(1, 1)] - 1.0).abs() < 1e-12);
        assert!((m[(2, 0)] - 0.25).abs() < 1e-12);
        assert!((m.sum() - rect.area()).abs() < 1e-12);
    }

    #[test]
    fn test_rectangle_fast_path_matches_walk() {
        let g = unit_grid(8);
        let rect = ring(&[(0.3, 2.0), (6.6, 2.0), (6.6, 7.1), (0.3, 7.1)]);
        let ring_grid = g.crop_to(&rect.bbox(), Padding::Phantom);
        let fast = rectangle_fractions(&rect.bbox(), &ring_grid);
        let (walked, _, _) = walk_ring(&rect, &ring_grid, &PreparedRing::new(&rect)).unwrap();
        for (a, b) in fast.as_slice().iter().zip(walked.as_slice()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    fn assert_same_for_every_start(g: &Grid, v: &[(f64, f64)], expected_sum: f64) {
        let base = run(g, &ring(v));
        assert!((base.matrix().sum() - expected_sum).abs() < 1e-12);
        for k in 1..v.len() {
            let rotated: Vec<(f64, f64)> = v[k..].iter().chain(&v[..k]).copied().collect();
            let rc = run(g, &ring(&rotated));
            assert_eq!(
                (rc.row_offset(), rc.col_offset()),
                (base.row_offset(), base.col_offset())
            );
            for (a, b) in rc.matrix().as_slice().iter().zip(base.matrix().as_slice()) {
                assert!((a - b).abs() < 1e-12, "start {:?}: {} vs {}", v[k], a, b);
            }
        }
    }

    #[test]
    fn test_start_vertex_on_upper_edge() {
        let g = unit_grid(10);
        let oct = [
            (6.0, 2.0),
            (6.0, 4.0),
            (4.0, 6.0),
            (2.0, 6.0),
            (0.0, 4.0),
            (0.0, 2.0),
            (2.0, 0.0),
            (4.0, 0.0),
        ];
        let rc = run(&g, &ring(&oct));
        assert!((rc.matrix().sum() - 28.0).abs() < 1e-12);
        assert_eq!(rc.matrix()[(3, 3)], 1.0);
        assert!((rc.matrix()[(2, 5)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_result_independent_of_start_vertex() {
        let g = unit_grid(10);
        let oct = [
            (2.0, 0.0),
            (4.0, 0.0),
            (6.0, 2.0),
            (6.0, 4.0),
            (4.0, 6.0),
            (2.0, 6.0),
            (0.0, 4.0),
            (0.0, 2.0),
        ];
        assert_same_for_every_start(&g, &oct, 28.0);

        // Square with a redundant vertex on its top edge.
        let square = [(5.0, 7.0), (3.0, 7.0), (3.0, 3.0), (7.0, 3.0), (7.0, 7.0)];
        assert_same_for_every_start(&g, &square, 16.0);

        // Same ring touching the grid's upper corner.
        let corner = [(10.0, 8.0), (10.0, 10.0), (8.0, 10.0), (7.0, 7.5)];
        assert_same_for_every_start(&g, &corner, ring(&corner).area());
    }

    #[test]
    fn test_step_out_of_grid_is_error() {
        assert_eq!(step(0, 0, Side::Top, 3, 3), Ok((1, 0)));
        assert!(step(0, 0, Side::Bottom, 3, 3).is_err());
        assert!(step(2, 2, Side::Right, 3, 3).is_err());
        assert!(step(1, 1, Side::None, 3, 3).is_err());
    }
}
