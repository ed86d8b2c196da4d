//! Dense row-major matrix.
//!
//! A flat, zero-initialized buffer of `rows * cols` elements addressed as
//! `row * cols + col`. Checked accessors return
//! [`CoverageError::IndexOutOfRange`]; the `Index`/`IndexMut` impls panic on
//! out-of-range access like slice indexing does.

use core::ops::{AddAssign, Index, IndexMut};

use crate::error::{CoverageError, Result};

/// Dense 2D buffer with bounds-checked `(row, col)` addressing.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Matrix<T> {
    /// Allocate a `rows × cols` matrix filled with `T::default()`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::default())
    }
}

impl<T: Copy> Matrix<T> {
    /// Allocate a `rows × cols` matrix filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major view of the whole buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Elements of one row.
    pub fn row(&self, row: usize) -> Result<&[T]> {
        if row >= self.rows {
            return Err(self.out_of_range(row, 0));
        }
        let start = row * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    #[inline]
    fn out_of_range(&self, row: usize, col: usize) -> CoverageError {
        CoverageError::IndexOutOfRange {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(self.out_of_range(row, col))
        }
    }

    /// Read the element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let i = self.offset(row, col)?;
        Ok(self.data[i])
    }

    /// Overwrite the element at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let i = self.offset(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Apply `f` to every element in place.
    pub fn map_in_place<F: FnMut(T) -> T>(&mut self, mut f: F) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }
}

impl<T: Copy + AddAssign> Matrix<T> {
    /// Read-modify-write `self[(row, col)] += delta`.
    #[inline]
    pub fn increment(&mut self, row: usize, col: usize, delta: T) -> Result<()> {
        let i = self.offset(row, col)?;
        self.data[i] += delta;
        Ok(())
    }
}

impl Matrix<f64> {
    /// Sum of all elements.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds ({}x{})",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds ({}x{})",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let m: Matrix<f64> = Matrix::new(3, 4);
        assert_eq!(m.len(), 12);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_set_get_row_major() {
        let mut m: Matrix<u32> = Matrix::new(2, 3);
        m.set(1, 2, 7).unwrap();
        m.set(0, 1, 3).unwrap();
        assert_eq!(m.get(1, 2), Ok(7));
        assert_eq!(m.as_slice(), &[0, 3, 0, 0, 0, 7]);
        assert_eq!(m.row(1).unwrap(), &[0, 0, 7]);
    }

    #[test]
    fn test_increment() {
        let mut m: Matrix<f64> = Matrix::new(2, 2);
        m.increment(0, 0, 0.75).unwrap();
        m.increment(0, 0, -0.25).unwrap();
        assert_eq!(m[(0, 0)], 0.5);
        assert_eq!(m.sum(), 0.5);
    }

    #[test]
    fn test_out_of_range_is_error() {
        let mut m: Matrix<f64> = Matrix::new(2, 3);
        let expected = CoverageError::IndexOutOfRange {
            row: 2,
            col: 0,
            rows: 2,
            cols: 3,
        };
        assert_eq!(m.get(2, 0), Err(expected.clone()));
        assert_eq!(m.set(2, 0, 1.0), Err(expected.clone()));
        assert_eq!(m.increment(2, 0, 1.0), Err(expected));
        assert!(m.get(0, 3).is_err());
        assert!(m.row(5).is_err());
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let m: Matrix<f64> = Matrix::new(2, 2);
        let _ = m[(0, 2)];
    }

    #[test]
    fn test_filled_and_map() {
        let mut m = Matrix::filled(2, 2, -1.0_f64);
        m.map_in_place(|v| v * 2.0);
        assert!(m.as_slice().iter().all(|&v| v == -2.0));
    }

    #[test]
    fn test_empty_matrix() {
        let m: Matrix<f64> = Matrix::new(0, 5);
        assert!(m.is_empty());
        assert!(m.get(0, 0).is_err());
    }
}
