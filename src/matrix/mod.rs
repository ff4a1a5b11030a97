//! Dense matrix containers.
//!
//! Containers are deliberately minimal: the kernels only need the surface of
//! [`Matrix`] (shape, spacing, storage order and a pointer factory).

mod dynamic;
mod fixed;

pub use dynamic::DynamicMatrix;
pub use fixed::StaticMatrix;

use crate::pointer::{MatrixPointer, StorageOrder};
use crate::simd::Scalar;

/// Read access to dense matrix storage.
pub trait Matrix {
    type Element: Scalar;
    type Order: StorageOrder;
    type Pointer: MatrixPointer<Element = Self::Element, Order = Self::Order>;

    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    /// Distance in elements between consecutive major lines.
    fn spacing(&self) -> usize;

    /// Element `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is out of bounds.
    fn get(&self, i: usize, j: usize) -> Self::Element;

    /// Pointer to element `(i, j)`. Only reads through it are allowed.
    fn ptr(&self, i: usize, j: usize) -> Self::Pointer;

    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.columns())
    }
}

/// Write access to dense matrix storage.
pub trait MatrixMut: Matrix {
    /// Sets element `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is out of bounds.
    fn set(&mut self, i: usize, j: usize, value: Self::Element);

    /// Pointer to element `(i, j)` that may be written through.
    fn ptr_mut(&mut self, i: usize, j: usize) -> Self::Pointer;
}

/// Rounds `n` up to a multiple of `step`.
#[inline]
pub(crate) fn round_up(n: usize, step: usize) -> usize {
    n.div_ceil(step) * step
}
