//! Matrix and vector pointers.
//!
//! A pointer is a non-owning cursor to element `(0, 0)` of a view into some
//! dense storage plus the distance between consecutive major lines (the
//! spacing). Kernels only ever see matrices through [`MatrixPointer`], which
//! is why one kernel works for column-major, row-major and transposed
//! operands alike.
//!
//! ```
//! use regblas::{DynamicMatrix, Matrix, MatrixPointer};
//!
//! let a = DynamicMatrix::<f64>::from_fn(3, 2, |i, j| (10 * i + j) as f64);
//! let p = a.ptr(1, 0);
//! assert_eq!(unsafe { p.offset(1, 1).value() }, 21.0);
//! assert_eq!(unsafe { p.trans().offset(1, 1).value() }, 21.0);
//! ```

mod dynamic;
mod fixed;
mod vector;

pub use dynamic::DynamicMatrixPointer;
pub use fixed::StaticMatrixPointer;
pub use vector::VectorPointer;

use std::fmt::Debug;

use crate::matrix::{Matrix, MatrixMut};
use crate::simd::{Scalar, SimdVec, is_aligned};

/// Runtime tag for a storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    ColumnMajor,
    RowMajor,
}

impl Order {
    pub fn transposed(self) -> Order {
        match self {
            Order::ColumnMajor => Order::RowMajor,
            Order::RowMajor => Order::ColumnMajor,
        }
    }
}

/// Type-level storage order.
pub trait StorageOrder: Copy + Default + Debug + Send + Sync + 'static {
    /// The order obtained by swapping rows and columns.
    type Transposed: StorageOrder<Transposed = Self>;

    const ORDER: Order;
}

/// Elements of a column are contiguous.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnMajor;

/// Elements of a row are contiguous.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowMajor;

impl StorageOrder for ColumnMajor {
    type Transposed = RowMajor;
    const ORDER: Order = Order::ColumnMajor;
}

impl StorageOrder for RowMajor {
    type Transposed = ColumnMajor;
    const ORDER: Order = Order::RowMajor;
}

/// Element offset of `(i, j)` for storage order `SO` and the given spacing.
#[inline(always)]
pub fn element_offset<SO: StorageOrder>(i: usize, j: usize, spacing: usize) -> usize {
    match SO::ORDER {
        Order::ColumnMajor => i + spacing * j,
        Order::RowMajor => spacing * i + j,
    }
}

/// A cursor into dense matrix storage.
///
/// Vector loads and stores always run along the contiguous dimension, i.e.
/// down a column for column-major pointers. Implementors only provide
/// addressing; memory access has default implementations on top of
/// [`MatrixPointer::get`].
pub trait MatrixPointer: Copy + Debug {
    type Element: Scalar;
    type Order: StorageOrder;
    type Transposed: MatrixPointer<
            Element = Self::Element,
            Order = <Self::Order as StorageOrder>::Transposed,
        >;

    /// The storage this pointer was created on is aligned to the SIMD width.
    ///
    /// [`MatrixPointer::offset`] keeps the flag, so an offset pointer may sit
    /// off the boundary; memory access goes through
    /// [`MatrixPointer::is_aligned`] instead.
    const ALIGNED: bool;

    /// Reads up to the next multiple of the SIMD width past the logical end
    /// of a major line stay inside zero-initialized storage.
    const PADDED: bool;

    /// Raw address of the current element.
    fn get(&self) -> *mut Self::Element;

    /// Distance in elements between consecutive major lines.
    fn spacing(&self) -> usize;

    /// Pointer to the element `i` rows down and `j` columns right.
    fn offset(&self, i: usize, j: usize) -> Self;

    /// The same storage with rows and columns swapped.
    fn trans(&self) -> Self::Transposed;

    /// The current address is aligned to the SIMD width. Always false
    /// unless [`MatrixPointer::ALIGNED`] is set.
    #[inline(always)]
    fn is_aligned(&self) -> bool {
        Self::ALIGNED && is_aligned::<<Self::Element as Scalar>::Simd>(self.get())
    }

    /// Advances `n` columns in place.
    fn hmove(&mut self, n: usize) {
        *self = self.offset(0, n);
    }

    /// Advances `n` rows in place.
    fn vmove(&mut self, n: usize) {
        *self = self.offset(n, 0);
    }

    /// Loads `SIMD_SIZE` elements along the contiguous dimension.
    ///
    /// # Safety
    ///
    /// The elements must lie inside the storage (or its padding when
    /// [`MatrixPointer::PADDED`] is set).
    #[inline(always)]
    unsafe fn load(&self) -> <Self::Element as Scalar>::Simd {
        unsafe { <Self::Element as Scalar>::Simd::load(self.get(), self.is_aligned()) }
    }

    /// Loads the lanes selected by `mask`, zero elsewhere.
    ///
    /// # Safety
    ///
    /// Every selected element must lie inside the storage.
    #[inline(always)]
    unsafe fn masked_load(
        &self,
        mask: <<Self::Element as Scalar>::Simd as SimdVec>::Mask,
    ) -> <Self::Element as Scalar>::Simd {
        unsafe { <Self::Element as Scalar>::Simd::masked_load(self.get(), mask) }
    }

    /// Vector with every lane equal to the current element.
    ///
    /// # Safety
    ///
    /// The current element must lie inside the storage.
    #[inline(always)]
    unsafe fn broadcast(&self) -> <Self::Element as Scalar>::Simd {
        unsafe { <Self::Element as Scalar>::Simd::broadcast(self.get()) }
    }

    /// Stores `SIMD_SIZE` elements along the contiguous dimension.
    ///
    /// # Safety
    ///
    /// The elements must lie inside writable storage.
    #[inline(always)]
    unsafe fn store(&self, v: <Self::Element as Scalar>::Simd) {
        unsafe { v.store(self.get(), self.is_aligned()) }
    }

    /// Stores the lanes selected by `mask`.
    ///
    /// # Safety
    ///
    /// Every selected element must lie inside writable storage.
    #[inline(always)]
    unsafe fn masked_store(
        &self,
        mask: <<Self::Element as Scalar>::Simd as SimdVec>::Mask,
        v: <Self::Element as Scalar>::Simd,
    ) {
        unsafe { v.masked_store(self.get(), mask) }
    }

    /// The current element.
    ///
    /// # Safety
    ///
    /// The current element must lie inside the storage.
    #[inline(always)]
    unsafe fn value(&self) -> Self::Element {
        unsafe { *self.get() }
    }

    /// Overwrites the current element.
    ///
    /// # Safety
    ///
    /// The current element must lie inside writable storage.
    #[inline(always)]
    unsafe fn set_value(&self, value: Self::Element) {
        unsafe { *self.get() = value }
    }
}

/// Pointer to element `(i, j)` of `matrix`, for reading.
#[inline]
pub fn ptr<M: Matrix>(matrix: &M, i: usize, j: usize) -> M::Pointer {
    matrix.ptr(i, j)
}

/// Pointer to element `(i, j)` of `matrix`, for writing.
#[inline]
pub fn ptr_mut<M: MatrixMut>(matrix: &mut M, i: usize, j: usize) -> M::Pointer {
    matrix.ptr_mut(i, j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DynamicMatrix;

    #[test]
    fn test_element_offset() {
        assert_eq!(element_offset::<ColumnMajor>(2, 3, 8), 26);
        assert_eq!(element_offset::<RowMajor>(2, 3, 8), 19);
    }

    #[test]
    fn test_trans_flips_order() {
        let a = DynamicMatrix::<f64>::from_fn(5, 3, |i, j| (i * 3 + j) as f64);
        let p = ptr(&a, 0, 0);
        let t = p.trans();
        assert_eq!(<<DynamicMatrixPointer<f64, ColumnMajor, false, true> as MatrixPointer>::Transposed as MatrixPointer>::Order::ORDER, Order::RowMajor);
        for i in 0..5 {
            for j in 0..3 {
                assert_eq!(unsafe { t.offset(j, i).value() }, a[(i, j)]);
            }
        }
        assert_eq!(Order::RowMajor.transposed(), Order::ColumnMajor);
    }

    #[test]
    fn test_hmove_vmove() {
        let a = DynamicMatrix::<f64>::from_fn(6, 4, |i, j| (10 * i + j) as f64);
        let mut p = ptr(&a, 0, 0);
        p.hmove(2);
        p.vmove(3);
        assert_eq!(unsafe { p.value() }, 32.0);
        let mut t = p.trans();
        t.hmove(1);
        assert_eq!(unsafe { t.value() }, 42.0);
    }

    #[repr(C, align(32))]
    struct AlignedColumns([f64; 16]);

    #[test]
    fn test_offset_alignment_follows_address() {
        let mut buf = AlignedColumns([0.0; 16]);
        let p = DynamicMatrixPointer::<f64, ColumnMajor, true, true>::new(buf.0.as_mut_ptr(), 8);
        assert!(p.is_aligned());
        assert!(p.offset(4, 1).is_aligned());
        assert!(!p.offset(1, 0).is_aligned());
        assert!(!p.offset(5, 1).is_aligned());

        let a = DynamicMatrix::<f64>::new(8, 2);
        assert!(!a.ptr(0, 0).is_aligned());
    }
}
