use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use super::{Matrix, MatrixMut, round_up};
use crate::pointer::{ColumnMajor, DynamicMatrixPointer, Order, StorageOrder, element_offset};
use crate::simd::Scalar;

/// Heap-allocated dense matrix with run-time shape.
///
/// The major dimension is padded to a multiple of the SIMD width and the
/// padding is zero, so pointers into it are `PADDED`. The buffer is a plain
/// `Vec<T>`, so pointers are not declared aligned.
#[derive(Clone, Debug)]
pub struct DynamicMatrix<T, SO = ColumnMajor> {
    rows: usize,
    columns: usize,
    spacing: usize,
    data: Vec<T>,
    order: PhantomData<SO>,
}

impl<T: Scalar, SO: StorageOrder> DynamicMatrix<T, SO> {
    /// Zero matrix of the given shape.
    pub fn new(rows: usize, columns: usize) -> Self {
        let (major, minor) = match SO::ORDER {
            Order::ColumnMajor => (rows, columns),
            Order::RowMajor => (columns, rows),
        };
        let spacing = round_up(major, T::SIMD_SIZE);
        Self {
            rows,
            columns,
            spacing,
            data: vec![T::zero(); spacing * minor],
            order: PhantomData,
        }
    }

    /// Matrix with element `(i, j)` set to `f(i, j)`.
    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut m = Self::new(rows, columns);
        for j in 0..columns {
            for i in 0..rows {
                m[(i, j)] = f(i, j);
            }
        }
        m
    }

    /// Matrix from row-major element data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * columns`.
    pub fn from_row_slice(rows: usize, columns: usize, data: &[T]) -> Self {
        assert_eq!(
            data.len(),
            rows * columns,
            "expected {}x{}={} elements",
            rows,
            columns,
            rows * columns
        );
        Self::from_fn(rows, columns, |i, j| data[i * columns + j])
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    #[inline]
    fn index_of(&self, i: usize, j: usize) -> usize {
        assert!(
            i < self.rows && j < self.columns,
            "index ({}, {}) out of bounds for {}x{} matrix",
            i,
            j,
            self.rows,
            self.columns
        );
        element_offset::<SO>(i, j, self.spacing)
    }

    /// Pointer to `(i, j)` without the bounds check; `(rows, 0)` and similar
    /// one-past-the-end positions are valid to form but not to dereference.
    #[inline]
    fn raw(&self, i: usize, j: usize) -> *mut T {
        self.data.as_ptr().wrapping_add(element_offset::<SO>(i, j, self.spacing)) as *mut T
    }
}

impl<T: Scalar, SO: StorageOrder> Index<(usize, usize)> for DynamicMatrix<T, SO> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[self.index_of(i, j)]
    }
}

impl<T: Scalar, SO: StorageOrder> IndexMut<(usize, usize)> for DynamicMatrix<T, SO> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        let k = self.index_of(i, j);
        &mut self.data[k]
    }
}

impl<T: Scalar, SO: StorageOrder> Matrix for DynamicMatrix<T, SO> {
    type Element = T;
    type Order = SO;
    type Pointer = DynamicMatrixPointer<T, SO, false, true>;

    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn spacing(&self) -> usize {
        self.spacing
    }

    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }

    fn ptr(&self, i: usize, j: usize) -> Self::Pointer {
        DynamicMatrixPointer::new(self.raw(i, j), self.spacing)
    }
}

impl<T: Scalar, SO: StorageOrder> MatrixMut for DynamicMatrix<T, SO> {
    fn set(&mut self, i: usize, j: usize, value: T) {
        self[(i, j)] = value;
    }

    fn ptr_mut(&mut self, i: usize, j: usize) -> Self::Pointer {
        let p = self.data.as_mut_ptr().wrapping_add(element_offset::<SO>(i, j, self.spacing));
        DynamicMatrixPointer::new(p, self.spacing)
    }
}
