use std::marker::PhantomData;

use super::{MatrixPointer, StorageOrder, element_offset};
use crate::simd::{Scalar, is_aligned};

/// Matrix pointer whose spacing `S` is a compile-time constant.
///
/// Produced by fixed-size containers; offsets fold into immediate
/// displacements.
#[derive(Debug)]
pub struct StaticMatrixPointer<T, SO, const S: usize, const AF: bool, const PF: bool> {
    ptr: *mut T,
    order: PhantomData<SO>,
}

impl<T, SO, const S: usize, const AF: bool, const PF: bool> Clone for StaticMatrixPointer<T, SO, S, AF, PF> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, SO, const S: usize, const AF: bool, const PF: bool> Copy for StaticMatrixPointer<T, SO, S, AF, PF> {}

impl<T: Scalar, SO: StorageOrder, const S: usize, const AF: bool, const PF: bool>
    StaticMatrixPointer<T, SO, S, AF, PF>
{
    /// Wraps `ptr`; alignment is asserted in debug builds when `AF` is set.
    #[inline(always)]
    pub fn new(ptr: *mut T) -> Self {
        debug_assert!(!AF || is_aligned::<T::Simd>(ptr), "pointer declared aligned is not");
        Self {
            ptr,
            order: PhantomData,
        }
    }
}

impl<T: Scalar, SO: StorageOrder, const S: usize, const AF: bool, const PF: bool> MatrixPointer
    for StaticMatrixPointer<T, SO, S, AF, PF>
{
    type Element = T;
    type Order = SO;
    type Transposed = StaticMatrixPointer<T, SO::Transposed, S, AF, PF>;

    const ALIGNED: bool = AF;
    const PADDED: bool = PF;

    #[inline(always)]
    fn get(&self) -> *mut T {
        self.ptr
    }

    #[inline(always)]
    fn spacing(&self) -> usize {
        S
    }

    #[inline(always)]
    fn offset(&self, i: usize, j: usize) -> Self {
        Self {
            ptr: self.ptr.wrapping_add(element_offset::<SO>(i, j, S)),
            order: PhantomData,
        }
    }

    #[inline(always)]
    fn trans(&self) -> Self::Transposed {
        StaticMatrixPointer {
            ptr: self.ptr,
            order: PhantomData,
        }
    }
}
