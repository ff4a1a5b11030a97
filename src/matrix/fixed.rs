use std::ops::{Index, IndexMut};

use super::{Matrix, MatrixMut};
use crate::pointer::{ColumnMajor, StaticMatrixPointer};
use crate::simd::Scalar;

/// Column-major `M x N` matrix stored inline.
///
/// Spacing is exactly `M` (no padding) and the storage carries only the
/// element alignment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticMatrix<T, const M: usize, const N: usize> {
    columns: [[T; M]; N],
}

impl<T: Scalar, const M: usize, const N: usize> StaticMatrix<T, M, N> {
    pub fn zeros() -> Self {
        Self {
            columns: [[T::zero(); M]; N],
        }
    }

    /// Matrix with element `(i, j)` set to `f(i, j)`.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut m = Self::zeros();
        for (j, col) in m.columns.iter_mut().enumerate() {
            for (i, x) in col.iter_mut().enumerate() {
                *x = f(i, j);
            }
        }
        m
    }

    #[inline]
    fn raw(&self, i: usize, j: usize) -> *mut T {
        (self.columns.as_ptr() as *const T).wrapping_add(i + M * j) as *mut T
    }
}

impl<T: Scalar, const M: usize, const N: usize> Default for StaticMatrix<T, M, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T, const M: usize, const N: usize> Index<(usize, usize)> for StaticMatrix<T, M, N> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.columns[j][i]
    }
}

impl<T, const M: usize, const N: usize> IndexMut<(usize, usize)> for StaticMatrix<T, M, N> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.columns[j][i]
    }
}

impl<T: Scalar, const M: usize, const N: usize> Matrix for StaticMatrix<T, M, N> {
    type Element = T;
    type Order = ColumnMajor;
    type Pointer = StaticMatrixPointer<T, ColumnMajor, M, false, false>;

    fn rows(&self) -> usize {
        M
    }

    fn columns(&self) -> usize {
        N
    }

    fn spacing(&self) -> usize {
        M
    }

    fn get(&self, i: usize, j: usize) -> T {
        self.columns[j][i]
    }

    fn ptr(&self, i: usize, j: usize) -> Self::Pointer {
        StaticMatrixPointer::new(self.raw(i, j))
    }
}

impl<T: Scalar, const M: usize, const N: usize> MatrixMut for StaticMatrix<T, M, N> {
    fn set(&mut self, i: usize, j: usize, value: T) {
        self.columns[j][i] = value;
    }

    fn ptr_mut(&mut self, i: usize, j: usize) -> Self::Pointer {
        let p = (self.columns.as_mut_ptr() as *mut T).wrapping_add(i + M * j);
        StaticMatrixPointer::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::MatrixPointer;

    #[test]
    fn test_static_layout() {
        let a = StaticMatrix::<f64, 3, 2>::from_fn(|i, j| (10 * i + j) as f64);
        assert_eq!(a.spacing(), 3);
        assert_eq!(a[(2, 1)], 21.0);
        assert_eq!(unsafe { a.ptr(0, 1).offset(2, 0).value() }, 21.0);
        assert_eq!(unsafe { a.ptr(0, 0).trans().offset(1, 2).value() }, 21.0);
    }
}
