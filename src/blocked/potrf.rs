//! Blocked Cholesky factorization.
//!
//! Right-looking over row blocks: every tile of `L` is computed from the
//! input tile minus the product of the already finished part of its row
//! and column, then finished with either a triangular solve (below the
//! diagonal) or an in-register factorization (on the diagonal).

use super::tile::{BalancedPolicy, LowerTileVisitor, TILE_STEP, TilePolicy, tile_lower};
use crate::error::{Result, check_shape, check_square};
use crate::kernels::{RegisterMatrix, Side, UpLo};
use crate::matrix::{Matrix, MatrixMut};
use crate::pointer::{ColumnMajor, MatrixPointer};
use crate::simd::Scalar;

struct PotrfTiles<PA, PL> {
    a: PA,
    l: PL,
}

impl<T, PA, PL> LowerTileVisitor<T> for PotrfTiles<PA, PL>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PL: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    #[inline(always)]
    fn off_diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, TILE_STEP>, i: usize, j: usize, m: usize) {
        let lt = self.l.trans();
        unsafe {
            ker.load_partial(T::one(), self.a.offset(i, j), m, TILE_STEP);
            ker.gemm_partial(j, -T::one(), self.l.offset(i, 0), lt.offset(0, j), m, TILE_STEP);
            ker.trsm_partial(Side::Right, UpLo::Upper, false, lt.offset(j, j), m, TILE_STEP);
            ker.store_partial(self.l.offset(i, j), m, TILE_STEP);
        }
    }

    #[inline(always)]
    fn diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, TILE_STEP>, d: usize, m: usize) {
        let n = m.min(TILE_STEP);
        let lt = self.l.trans();
        unsafe {
            ker.load_partial(T::one(), self.a.offset(d, d), m, n);
            ker.gemm_partial(d, -T::one(), self.l.offset(d, 0), lt.offset(0, d), m, n);
        }
        ker.potrf();
        unsafe { ker.store_lower_partial(self.l.offset(d, d), m, n) };
    }
}

/// Pointer-level Cholesky factorization `A = L * L^T` of an `m x m` matrix.
///
/// Only the lower triangle of `A` contributes and only the lower triangle of
/// `L` is written. `A` and `L` may be the same storage.
///
/// # Safety
///
/// Caller must ensure:
/// - `a` addresses a readable `m x m` matrix
/// - `l` addresses the readable and writable lower triangle of an `m x m`
///   matrix, overlapping `a` only exactly
pub unsafe fn potrf_backend<T, P, PA, PL>(policy: &P, m: usize, a: PA, l: PL)
where
    T: Scalar,
    P: TilePolicy,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PL: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    tile_lower(policy, m, &mut PotrfTiles { a, l });
}

/// Cholesky factor of a symmetric positive-definite matrix.
///
/// Reads the lower triangle of `A` and writes the lower factor into `L`;
/// `L`'s strictly upper triangle keeps whatever it held. A matrix that is
/// not positive definite is not detected: the factor fills with NaN.
///
/// ```
/// use regblas::{DynamicMatrix, potrf};
///
/// let a = DynamicMatrix::<f64>::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 10.0]);
/// let mut l = DynamicMatrix::<f64>::new(2, 2);
/// potrf(&a, &mut l).unwrap();
/// assert_eq!(l[(0, 0)], 2.0);
/// assert_eq!(l[(1, 0)], 1.0);
/// assert_eq!(l[(1, 1)], 3.0);
/// ```
pub fn potrf<T, MA, ML>(a: &MA, l: &mut ML) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    ML: MatrixMut<Element = T, Order = ColumnMajor>,
{
    let m = check_square("potrf", "A", a.shape())?;
    check_shape("potrf", "L", l.shape(), (m, m))?;
    unsafe { potrf_backend(&BalancedPolicy, m, a.ptr(0, 0), l.ptr_mut(0, 0)) };
    Ok(())
}
