//! # exact-coverage
//!
//! Exact per-cell polygon coverage on regular grids.
//!
//! For every cell of a grid that a polygon's bounding box overlaps, the
//! kernel computes the exact fraction of the cell's area covered by the
//! polygon: `0.0` outside, `1.0` inside, fractional on the boundary.
//!
//! ## Architecture
//!
//! Coverage is computed in four stages:
//!
//! 1. **Grid cropping**: the input grid is cropped to the geometry's
//!    bounding box, padded by one phantom cell on each side
//! 2. **Ring traversal**: each ring is walked through the cells it crosses,
//!    and each crossed cell gets its exact covered fraction
//! 3. **Flood fill**: cells the boundary never reached are settled with one
//!    point-in-polygon query per connected region
//! 4. **Accumulation**: exterior rings add, holes subtract
//!
//! The dense [`CoverageResult`] can then be turned into interior runs and
//! boundary edges with [`encode_sparse`].
//!
//! ```
//! use exact_coverage::{compute_coverage, Grid, Polygon};
//!
//! let grid = Grid::new(0.0, 0.0, 1.0, 1.0, 10, 10).unwrap();
//! let square = Polygon::rectangle(2.0, 2.0, 6.0, 6.0).unwrap();
//! let coverage = compute_coverage(&grid, &square, None).unwrap();
//! assert_eq!(coverage.sum(), 16.0);
//! ```

// Foundation
pub mod basics;
pub mod config;
pub mod error;
pub mod math;

// Grid and storage
pub mod grid;
pub mod matrix;

// Geometry model
pub mod geometry;
#[cfg(feature = "geo")]
pub mod geo_backend;

// Per-cell coverage
pub mod cell_box;
pub mod coverage_cell;
pub mod perimeter;

// Rasterization
pub mod flood_fill;
pub mod rasterizer_coverage;
pub mod ring_traversal;

// Output
pub mod sparse;

pub use basics::{PointD, RectD};
pub use config::{ComponentErrorPolicy, CoverageConfig, SparseConfig};
pub use error::{CoverageError, Result};
pub use geometry::{Geometry, PointLocator, Polygon, PolygonalGeometry, Ring, RingRole};
pub use grid::{Grid, Padding};
pub use matrix::Matrix;
pub use rasterizer_coverage::{compute_coverage, CoverageRasterizer, CoverageResult};
pub use sparse::{encode_sparse, BoundaryEdge, InteriorRun, SparseCoverage};
