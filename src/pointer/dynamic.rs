use std::marker::PhantomData;

use super::{MatrixPointer, StorageOrder, element_offset};
use crate::simd::{Scalar, is_aligned};

/// Matrix pointer with a spacing known only at run time.
///
/// `AF` declares the address SIMD-aligned, `PF` declares the storage padded
/// to a multiple of the SIMD width along the contiguous dimension.
#[derive(Debug)]
pub struct DynamicMatrixPointer<T, SO, const AF: bool, const PF: bool> {
    ptr: *mut T,
    spacing: usize,
    order: PhantomData<SO>,
}

impl<T, SO, const AF: bool, const PF: bool> Clone for DynamicMatrixPointer<T, SO, AF, PF> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, SO, const AF: bool, const PF: bool> Copy for DynamicMatrixPointer<T, SO, AF, PF> {}

impl<T: Scalar, SO: StorageOrder, const AF: bool, const PF: bool> DynamicMatrixPointer<T, SO, AF, PF> {
    /// Wraps `ptr` with the given spacing.
    ///
    /// Creating the pointer is safe; dereferencing it is not. Alignment of
    /// `ptr` is checked in debug builds when `AF` is set.
    #[inline(always)]
    pub fn new(ptr: *mut T, spacing: usize) -> Self {
        debug_assert!(!AF || is_aligned::<T::Simd>(ptr), "pointer declared aligned is not");
        Self {
            ptr,
            spacing,
            order: PhantomData,
        }
    }
}

impl<T: Scalar, SO: StorageOrder, const AF: bool, const PF: bool> MatrixPointer
    for DynamicMatrixPointer<T, SO, AF, PF>
{
    type Element = T;
    type Order = SO;
    type Transposed = DynamicMatrixPointer<T, SO::Transposed, AF, PF>;

    const ALIGNED: bool = AF;
    const PADDED: bool = PF;

    #[inline(always)]
    fn get(&self) -> *mut T {
        self.ptr
    }

    #[inline(always)]
    fn spacing(&self) -> usize {
        self.spacing
    }

    #[inline(always)]
    fn offset(&self, i: usize, j: usize) -> Self {
        Self {
            ptr: self.ptr.wrapping_add(element_offset::<SO>(i, j, self.spacing)),
            spacing: self.spacing,
            order: PhantomData,
        }
    }

    #[inline(always)]
    fn trans(&self) -> Self::Transposed {
        DynamicMatrixPointer {
            ptr: self.ptr,
            spacing: self.spacing,
            order: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{ColumnMajor, RowMajor};

    #[test]
    fn test_row_major_offset() {
        let mut data: Vec<f64> = (0..12).map(|x| x as f64).collect();
        let p = DynamicMatrixPointer::<f64, RowMajor, false, false>::new(data.as_mut_ptr(), 4);
        assert_eq!(unsafe { p.offset(2, 1).value() }, 9.0);
        assert_eq!(unsafe { p.trans().offset(1, 2).value() }, 9.0);
    }

    #[test]
    fn test_column_load() {
        let mut data: Vec<f64> = (0..16).map(|x| x as f64).collect();
        let p = DynamicMatrixPointer::<f64, ColumnMajor, false, false>::new(data.as_mut_ptr(), 8);
        let v = unsafe { p.offset(1, 1).load() };
        use crate::simd::SimdVec;
        assert_eq!(v.extract(0), 9.0);
        assert_eq!(v.extract(3), 12.0);
    }
}
