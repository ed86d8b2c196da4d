//! Sparse encoding of a coverage result.
//!
//! Fully covered cells are coalesced row by row into [`InteriorRun`]s,
//! partially covered cells are kept one by one as [`BoundaryEdge`]s and
//! uncovered cells are dropped. Indices are relative to the result's grid.

use crate::config::SparseConfig;
use crate::error::{CoverageError, Result};
use crate::grid::Grid;
use crate::matrix::Matrix;
use crate::rasterizer_coverage::CoverageResult;

/// Horizontal span of fully covered cells, `col_start..=col_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteriorRun {
    pub row: u32,
    pub col_start: u32,
    pub col_end: u32,
}

impl InteriorRun {
    /// Number of cells in the run.
    #[inline]
    pub fn cell_count(&self) -> usize {
        (self.col_end - self.col_start) as usize + 1
    }
}

/// One partially covered cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryEdge {
    pub row: u32,
    pub col: u32,
    pub weight: f32,
}

/// Interior-run and boundary-edge tables of one coverage result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseCoverage {
    grid: Grid,
    runs: Vec<InteriorRun>,
    edges: Vec<BoundaryEdge>,
}

impl SparseCoverage {
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Interior runs in row-major order.
    #[inline]
    pub fn runs(&self) -> &[InteriorRun] {
        &self.runs
    }

    /// Boundary edges in row-major order.
    #[inline]
    pub fn edges(&self) -> &[BoundaryEdge] {
        &self.edges
    }

    /// Total cells covered by interior runs.
    pub fn interior_cell_count(&self) -> usize {
        self.runs.iter().map(InteriorRun::cell_count).sum()
    }

    /// Rebuild the dense result: run cells read 1.0, edge cells their
    /// weight, everything else 0.0.
    pub fn decode(&self) -> Result<CoverageResult> {
        let mut matrix = Matrix::new(self.grid.n_rows(), self.grid.n_cols());
        for run in &self.runs {
            if run.col_end < run.col_start {
                return Err(CoverageError::IndexOutOfRange {
                    row: run.row as usize,
                    col: run.col_start as usize,
                    rows: matrix.rows(),
                    cols: matrix.cols(),
                });
            }
            for col in run.col_start..=run.col_end {
                matrix.set(run.row as usize, col as usize, 1.0)?;
            }
        }
        for edge in &self.edges {
            matrix.set(edge.row as usize, edge.col as usize, f64::from(edge.weight))?;
        }
        CoverageResult::new(self.grid, matrix)
    }
}

/// Encode `result` into interior runs and boundary edges.
///
/// Cells with a fraction of at least `1 - tolerance` become interior runs.
pub fn encode_sparse(result: &CoverageResult, config: &SparseConfig) -> Result<SparseCoverage> {
    config.validate()?;
    let threshold = config.interior_threshold();
    let too_large = |n: usize| {
        CoverageError::InvalidGrid(format!("{} cells per axis do not fit u32 indices", n))
    };
    u32::try_from(result.rows()).map_err(|_| too_large(result.rows()))?;
    u32::try_from(result.cols()).map_err(|_| too_large(result.cols()))?;

    let mut runs = Vec::new();
    let mut edges = Vec::new();
    for row in 0..result.rows() {
        let r = row as u32;
        let mut run_start: Option<u32> = None;
        for (col, &v) in result.matrix().row(row)?.iter().enumerate() {
            let c = col as u32;
            if v >= threshold {
                run_start.get_or_insert(c);
                continue;
            }
            if let Some(start) = run_start.take() {
                runs.push(InteriorRun {
                    row: r,
                    col_start: start,
                    col_end: c - 1,
                });
            }
            if v > 0.0 {
                edges.push(BoundaryEdge {
                    row: r,
                    col: c,
                    weight: v as f32,
                });
            }
        }
        if let Some(start) = run_start {
            runs.push(InteriorRun {
                row: r,
                col_start: start,
                col_end: result.cols() as u32 - 1,
            });
        }
    }

    Ok(SparseCoverage {
        grid: *result.grid(),
        runs,
        edges,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rows: usize, cols: usize, values: &[f64]) -> CoverageResult {
        let grid = Grid::new(0.0, 0.0, 1.0, 1.0, rows, cols).unwrap();
        let mut m = Matrix::new(rows, cols);
        for (i, &v) in values.iter().enumerate() {
            m.set(i / cols, i % cols, v).unwrap();
        }
        CoverageResult::new(grid, m).unwrap()
    }

    #[test]
    fn test_runs_and_edges() {
        let res = result(
            2,
            5,
            &[
                0.0, 1.0, 1.0, 0.3, 1.0, //
                0.5, 1.0, 1.0, 1.0, 0.0,
            ],
        );
        let sparse = encode_sparse(&res, &SparseConfig::default()).unwrap();
        assert_eq!(
            sparse.runs(),
            &[
                InteriorRun { row: 0, col_start: 1, col_end: 2 },
                InteriorRun { row: 0, col_start: 4, col_end: 4 },
                InteriorRun { row: 1, col_start: 1, col_end: 3 },
            ]
        );
        assert_eq!(
            sparse.edges(),
            &[
                BoundaryEdge { row: 0, col: 3, weight: 0.3 },
                BoundaryEdge { row: 1, col: 0, weight: 0.5 },
            ]
        );
        assert_eq!(sparse.interior_cell_count(), 6);
    }

    #[test]
    fn test_near_one_counts_as_interior() {
        let res = result(1, 3, &[1.0 - 1e-9, 1.0, 1.0 - 1e-3]);
        let sparse = encode_sparse(&res, &SparseConfig::default()).unwrap();
        assert_eq!(sparse.runs(), &[InteriorRun { row: 0, col_start: 0, col_end: 1 }]);
        assert_eq!(sparse.edges().len(), 1);

        let loose = SparseConfig::new(1e-2).unwrap();
        let sparse = encode_sparse(&res, &loose).unwrap();
        assert_eq!(sparse.interior_cell_count(), 3);
        assert!(sparse.edges().is_empty());
    }

    #[test]
    fn test_decode_restores_within_tolerance() {
        let values = [0.0, 0.25, 1.0, 1.0 - 1e-8, 0.999, 0.0];
        let res = result(2, 3, &values);
        let config = SparseConfig::default();
        let back = encode_sparse(&res, &config).unwrap().decode().unwrap();
        assert_eq!(back.grid(), res.grid());
        for (a, b) in back.matrix().as_slice().iter().zip(res.matrix().as_slice()) {
            assert!((a - b).abs() <= config.tolerance);
        }
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let res = result(1, 1, &[1.0]);
        let bad = SparseConfig { tolerance: 0.0 };
        assert_eq!(
            encode_sparse(&res, &bad),
            Err(CoverageError::InvalidTolerance(0.0))
        );
    }

    #[test]
    fn test_empty_result() {
        let res = result(0, 0, &[]);
        let sparse = encode_sparse(&res, &SparseConfig::default()).unwrap();
        assert!(sparse.runs().is_empty());
        assert!(sparse.edges().is_empty());
        assert!(sparse.decode().unwrap().matrix().is_empty());
    }
}
