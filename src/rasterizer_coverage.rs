//! Geometry-wide coverage rasterizer.
//!
//! [`CoverageRasterizer`] crops the input grid to the geometry's bounding
//! box, runs every ring of every polygon component through
//! [`RingTraversal`] and accumulates the signed ring results into one
//! matrix. [`compute_coverage`] is the one-call entry point.
//!
//! Usage:
//! 1. Build a [`Grid`] for the raster and a geometry implementing
//!    [`PolygonalGeometry`]
//! 2. Call [`compute_coverage`], or configure a [`CoverageRasterizer`]
//! 3. Read fractions from the returned [`CoverageResult`], or pass it to
//!    [`crate::sparse::encode_sparse`]

use log::{debug, warn};

use crate::config::{ComponentErrorPolicy, CoverageConfig};
use crate::error::{CoverageError, Result};
use crate::geometry::{union_bbox, Polygon, PolygonalGeometry, PreparedRing, RingRole};
use crate::grid::{Grid, Padding};
use crate::matrix::Matrix;
use crate::ring_traversal::{RingCoverage, RingTraversal};

// ============================================================================
// CoverageResult
// ============================================================================

/// Coverage fractions paired with the grid they cover.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageResult {
    grid: Grid,
    matrix: Matrix<f64>,
}

impl CoverageResult {
    /// Pair `matrix` with `grid`; the dimensions must agree.
    pub fn new(grid: Grid, matrix: Matrix<f64>) -> Result<Self> {
        if matrix.rows() != grid.n_rows() || matrix.cols() != grid.n_cols() {
            return Err(CoverageError::InvalidGrid(format!(
                "matrix is {}x{} but the grid has {}x{} cells",
                matrix.rows(),
                matrix.cols(),
                grid.n_rows(),
                grid.n_cols()
            )));
        }
        Ok(Self { grid, matrix })
    }

    /// Unpadded grid the fractions refer to.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix<f64> {
        &self.matrix
    }

    #[inline]
    pub fn into_matrix(self) -> Matrix<f64> {
        self.matrix
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }

    /// Fraction of cell `(row, col)` covered.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.matrix.get(row, col)
    }

    /// Sum of all fractions.
    pub fn sum(&self) -> f64 {
        self.matrix.sum()
    }

    /// Covered area in world units.
    pub fn covered_area(&self) -> f64 {
        self.sum() * self.grid.cell_area()
    }

    /// Position of this result's first cell within `parent`.
    ///
    /// `parent` is typically the grid the result was computed on.
    pub fn offset_in(&self, parent: &Grid) -> Option<(usize, usize)> {
        self.grid.offset_in(parent)
    }

    /// `(row, col, fraction)` for every cell with a non-zero fraction, in
    /// row-major order.
    pub fn iter_covered(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.matrix.cols();
        self.matrix
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > 0.0)
            .map(move |(i, &v)| (i / cols, i % cols, v))
    }
}

// ============================================================================
// CoverageRasterizer
// ============================================================================

/// Exact coverage rasterizer for polygonal geometries.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageRasterizer {
    config: CoverageConfig,
}

impl CoverageRasterizer {
    pub fn new(config: CoverageConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Coverage of `geometry` over the part of `grid` it overlaps.
    ///
    /// The result's grid is `grid` cropped to the geometry's bounding box;
    /// use [`CoverageResult::offset_in`] to place it back into `grid`.
    pub fn rasterize<G: PolygonalGeometry + ?Sized>(
        &self,
        grid: &Grid,
        geometry: &G,
    ) -> Result<CoverageResult> {
        let grid = grid.without_padding();

        let components = geometry.components();
        let component_bboxes = geometry.component_bboxes();
        if components.len() != component_bboxes.len() {
            return Err(CoverageError::InvalidGeometry(format!(
                "{} components but {} bounding boxes",
                components.len(),
                component_bboxes.len()
            )));
        }

        let mut polygons = Vec::new();
        let mut bboxes = Vec::new();
        for (i, part) in components.into_iter().zip(component_bboxes).enumerate() {
            match part {
                (Ok(p), Ok(b)) => {
                    polygons.push(p);
                    bboxes.push(b);
                }
                (Err(e), _) | (_, Err(e)) => self.component_failed(i, e)?,
            }
        }

        let bbox = match union_bbox(&bboxes) {
            Some(bbox) => bbox,
            None => {
                debug!("geometry has no polygon components");
                return CoverageResult::new(grid.emptied(), Matrix::new(0, 0));
            }
        };
        let geometry_grid = grid.crop_to(&bbox, Padding::Phantom);
        let result_grid = geometry_grid.without_padding();
        if result_grid.is_empty() {
            debug!("geometry {:?} does not overlap the grid", bbox);
            let matrix = Matrix::new(result_grid.n_rows(), result_grid.n_cols());
            return CoverageResult::new(result_grid, matrix);
        }

        self.check_size(&result_grid)?;
        let mut matrix = Matrix::new(result_grid.n_rows(), result_grid.n_cols());
        debug!(
            "coverage of {} components over {}x{} cells",
            polygons.len(),
            result_grid.n_rows(),
            result_grid.n_cols()
        );

        let traversal = RingTraversal::new(&geometry_grid);
        for (i, polygon) in polygons.iter().enumerate() {
            match rasterize_polygon(&traversal, polygon) {
                Ok(rings) => {
                    for (coverage, role) in &rings {
                        accumulate(&mut matrix, coverage, *role)?;
                    }
                }
                Err(e) => self.component_failed(i, e)?,
            }
        }

        matrix.map_in_place(|v| v.clamp(0.0, 1.0));
        CoverageResult::new(result_grid, matrix)
    }

    /// Apply the component error policy to a failed component.
    fn component_failed(&self, index: usize, error: CoverageError) -> Result<()> {
        match self.config.component_errors {
            ComponentErrorPolicy::Abort => Err(error),
            ComponentErrorPolicy::Skip => {
                warn!("skipping component {}: {}", index, error);
                Ok(())
            }
        }
    }

    fn check_size(&self, grid: &Grid) -> Result<()> {
        let ceiling = match self.config.size_ceiling {
            Some(c) => c as u128,
            None => return Ok(()),
        };
        let bytes =
            grid.n_rows() as u128 * grid.n_cols() as u128 * core::mem::size_of::<f64>() as u128;
        if bytes > ceiling {
            return Err(CoverageError::AllocationTooLarge {
                rows: grid.n_rows(),
                cols: grid.n_cols(),
                bytes,
                ceiling,
            });
        }
        Ok(())
    }
}

/// All ring results of one polygon, computed before any is applied so a
/// failing ring leaves the shared matrix untouched.
fn rasterize_polygon(
    traversal: &RingTraversal<'_>,
    polygon: &Polygon,
) -> Result<Vec<(RingCoverage, RingRole)>> {
    let mut rings = Vec::new();
    for (ring, role) in polygon.rings() {
        let locator = PreparedRing::new(ring);
        if let Some(coverage) = traversal.rasterize(ring, &locator)? {
            rings.push((coverage, role));
        }
    }
    Ok(rings)
}

fn accumulate(matrix: &mut Matrix<f64>, coverage: &RingCoverage, role: RingRole) -> Result<()> {
    let ring = coverage.matrix();
    let (r0, c0) = (coverage.row_offset(), coverage.col_offset());
    if r0 + ring.rows() > matrix.rows() || c0 + ring.cols() > matrix.cols() {
        return Err(CoverageError::IndexOutOfRange {
            row: r0 + ring.rows(),
            col: c0 + ring.cols(),
            rows: matrix.rows(),
            cols: matrix.cols(),
        });
    }
    let sign = role.sign();
    for row in 0..ring.rows() {
        for col in 0..ring.cols() {
            matrix.increment(r0 + row, c0 + col, sign * ring[(row, col)])?;
        }
    }
    Ok(())
}

/// Coverage of `geometry` over `grid`, failing with
/// [`CoverageError::AllocationTooLarge`] if the result matrix would need
/// more than `size_ceiling` bytes.
pub fn compute_coverage<G: PolygonalGeometry + ?Sized>(
    grid: &Grid,
    geometry: &G,
    size_ceiling: Option<usize>,
) -> Result<CoverageResult> {
    let config = CoverageConfig {
        size_ceiling,
        ..CoverageConfig::default()
    };
    CoverageRasterizer::new(config).rasterize(grid, geometry)
}

// ============================================================================
// Tests
// ============================================================================
