//! Blocked triangular solve `A * X = B`.

use super::tile::{BalancedPolicy, RowBlockVisitor, TILE_STEP, TilePolicy, row_blocks, row_blocks_rev, visit_rows};
use crate::error::{Result, check_shape, check_square};
use crate::kernels::{RegisterMatrix, Side, UpLo};
use crate::matrix::{Matrix, MatrixMut};
use crate::pointer::{ColumnMajor, MatrixPointer};
use crate::simd::Scalar;

/// Solves one row block of one column tile.
struct SolveBlock<PA, PB, PX> {
    uplo: UpLo,
    unit: bool,
    m: usize,
    j: usize,
    n: usize,
    a: PA,
    b: PB,
    x: PX,
}

impl<T, PA, PB, PX> RowBlockVisitor for SolveBlock<PA, PB, PX>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T, Order = ColumnMajor>,
    PX: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    #[inline(always)]
    fn visit<const RM: usize>(&mut self, i: usize, mi: usize) {
        let (j, nj) = (self.j, self.n);
        let mut ker = RegisterMatrix::<T, RM, TILE_STEP>::new();
        unsafe {
            ker.load_partial(T::one(), self.b.offset(i, j), mi, nj);
            // Subtract the contribution of the rows already solved.
            match self.uplo {
                UpLo::Lower => ker.gemm_partial(i, -T::one(), self.a.offset(i, 0), self.x.offset(0, j), mi, nj),
                UpLo::Upper => {
                    let e = i + mi;
                    ker.gemm_partial(self.m - e, -T::one(), self.a.offset(i, e), self.x.offset(e, j), mi, nj);
                }
            }
            ker.trsm_partial(Side::Left, self.uplo, self.unit, self.a.offset(i, i), mi, nj);
            ker.store_partial(self.x.offset(i, j), mi, nj);
        }
    }
}

/// Pointer-level triangular solve: `X = A^-1 * B` with `A` an `m x m`
/// triangular matrix and `B`, `X` of size `m x n`.
///
/// Row blocks are solved top-down for [`UpLo::Lower`] and bottom-up for
/// [`UpLo::Upper`], each one after subtracting the rows already solved.
/// Only the `uplo` triangle of `A` is read, and its diagonal only when
/// `unit` is false. `B` and `X` may be the same storage.
///
/// # Safety
///
/// Caller must ensure:
/// - `a` addresses the readable `uplo` triangle of an `m x m` matrix
/// - `b` addresses a readable and `x` a writable `m x n` matrix
/// - `x` does not overlap `a`, and overlaps `b` only exactly
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_backend<T, P, PA, PB, PX>(policy: &P, uplo: UpLo, unit: bool, m: usize, n: usize, a: PA, b: PB, x: PX)
where
    T: Scalar,
    P: TilePolicy,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T, Order = ColumnMajor>,
    PX: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    let ss = T::SIMD_SIZE;
    for j in (0..n).step_by(TILE_STEP) {
        let mut block = SolveBlock { uplo, unit, m, j, n: (n - j).min(TILE_STEP), a, b, x };
        match uplo {
            UpLo::Lower => {
                for (i, mi, rm) in row_blocks(policy, m, ss) {
                    visit_rows(rm, &mut block, i, mi);
                }
            }
            UpLo::Upper => {
                for (i, mi, rm) in row_blocks_rev(policy, m, ss) {
                    visit_rows(rm, &mut block, i, mi);
                }
            }
        }
    }
}

/// Solves `A * X = B` for `X`.
///
/// `A` is square and triangular as given by `uplo`; with `unit` its
/// diagonal is taken as one. `B` and `X` have `A`'s row count and the same
/// shape.
///
/// ```
/// use regblas::{DynamicMatrix, UpLo, trsm};
///
/// let a = DynamicMatrix::<f64>::from_row_slice(2, 2, &[2.0, 0.0, 1.0, 4.0]);
/// let b = DynamicMatrix::<f64>::from_row_slice(2, 1, &[2.0, 9.0]);
/// let mut x = DynamicMatrix::<f64>::new(2, 1);
/// trsm(UpLo::Lower, false, &a, &b, &mut x).unwrap();
/// assert_eq!(x[(0, 0)], 1.0);
/// assert_eq!(x[(1, 0)], 2.0);
/// ```
pub fn trsm<T, MA, MB, MX>(uplo: UpLo, unit: bool, a: &MA, b: &MB, x: &mut MX) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MB: Matrix<Element = T, Order = ColumnMajor>,
    MX: MatrixMut<Element = T, Order = ColumnMajor>,
{
    let m = check_square("trsm", "A", a.shape())?;
    let n = b.columns();
    check_shape("trsm", "B", b.shape(), (m, n))?;
    check_shape("trsm", "X", x.shape(), (m, n))?;
    unsafe { trsm_backend(&BalancedPolicy, uplo, unit, m, n, a.ptr(0, 0), b.ptr(0, 0), x.ptr_mut(0, 0)) };
    Ok(())
}
