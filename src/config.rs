//! Configuration for the coverage kernel and the sparse encoder.
//!
//! All tolerances and limits are passed explicitly; nothing is compiled in
//! except the defaults below.

use crate::error::{CoverageError, Result};

/// Default tolerance below 1.0 at which a cell still counts as fully covered.
pub const DEFAULT_INTERIOR_TOLERANCE: f64 = 1e-6;

/// What the orchestrator does when one polygon component fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentErrorPolicy {
    /// Return the first component error to the caller.
    #[default]
    Abort,
    /// Log the error and continue with the remaining components.
    Skip,
}

/// Configuration for [`crate::rasterizer_coverage::CoverageRasterizer`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageConfig {
    /// Maximum size in bytes of the geometry-wide coverage matrix.
    /// `None` means only the platform allocation limit applies.
    pub size_ceiling: Option<usize>,

    /// Handling of failing polygon components in multi-part geometries.
    pub component_errors: ComponentErrorPolicy,
}

impl CoverageConfig {
    /// Configuration with no size ceiling that aborts on the first error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size ceiling in bytes.
    pub fn with_size_ceiling(mut self, bytes: usize) -> Self {
        self.size_ceiling = Some(bytes);
        self
    }

    /// Set the component error policy.
    pub fn with_component_errors(mut self, policy: ComponentErrorPolicy) -> Self {
        self.component_errors = policy;
        self
    }
}

/// Configuration for the sparse encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseConfig {
    /// Cells with `fraction >= 1 - tolerance` are encoded as interior runs.
    pub tolerance: f64,
}

impl SparseConfig {
    /// Create a validated sparse configuration.
    pub fn new(tolerance: f64) -> Result<Self> {
        let config = Self { tolerance };
        config.validate()?;
        Ok(config)
    }

    /// Check that the tolerance lies strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        if self.tolerance > 0.0 && self.tolerance < 1.0 {
            Ok(())
        } else {
            Err(CoverageError::InvalidTolerance(self.tolerance))
        }
    }

    /// Lowest fraction that still counts as fully covered.
    #[inline]
    pub fn interior_threshold(&self) -> f64 {
        1.0 - self.tolerance
    }
}

impl Default for SparseConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_INTERIOR_TOLERANCE,
        }
    }
}
