use super::{ColumnMajor, DynamicMatrixPointer};
use crate::simd::{Scalar, SimdVec};

/// Cursor over a strided vector.
#[derive(Debug)]
pub struct VectorPointer<T> {
    ptr: *mut T,
    stride: usize,
}

impl<T> Clone for VectorPointer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VectorPointer<T> {}

impl<T: Scalar> VectorPointer<T> {
    #[inline(always)]
    pub fn new(ptr: *mut T, stride: usize) -> Self {
        Self { ptr, stride }
    }

    /// Unit-stride cursor over a slice.
    #[inline(always)]
    pub fn from_slice(x: &[T]) -> Self {
        Self::new(x.as_ptr() as *mut T, 1)
    }

    #[inline(always)]
    pub fn get(&self) -> *mut T {
        self.ptr
    }

    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pointer to element `i`.
    #[inline(always)]
    pub fn offset(&self, i: usize) -> Self {
        Self::new(self.ptr.wrapping_add(i * self.stride), self.stride)
    }

    /// # Safety
    ///
    /// The current element must be readable.
    #[inline(always)]
    pub unsafe fn value(&self) -> T {
        unsafe { *self.ptr }
    }

    /// Loads `SIMD_SIZE` consecutive elements.
    ///
    /// # Safety
    ///
    /// The stride must be 1 and the elements readable.
    #[inline(always)]
    pub unsafe fn load(&self) -> T::Simd {
        debug_assert_eq!(self.stride, 1, "vector loads need unit stride");
        unsafe { T::Simd::load(self.ptr, false) }
    }

    /// # Safety
    ///
    /// The stride must be 1 and every selected element readable.
    #[inline(always)]
    pub unsafe fn masked_load(&self, mask: <T::Simd as SimdVec>::Mask) -> T::Simd {
        debug_assert_eq!(self.stride, 1, "vector loads need unit stride");
        unsafe { T::Simd::masked_load(self.ptr, mask) }
    }

    /// The vector as an `n x 1` column: loads run down the vector.
    ///
    /// Vector loads through the result require unit stride.
    #[inline(always)]
    pub fn column(&self) -> DynamicMatrixPointer<T, ColumnMajor, false, false> {
        DynamicMatrixPointer::new(self.ptr, self.stride.max(1))
    }

    /// The vector as a `1 x n` row: element `j` is at `offset(0, j)`.
    #[inline(always)]
    pub fn row(&self) -> DynamicMatrixPointer<T, ColumnMajor, false, false> {
        DynamicMatrixPointer::new(self.ptr, self.stride)
    }
}
