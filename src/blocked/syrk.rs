//! Symmetric rank-k update on the lower triangle.

use super::tile::{BalancedPolicy, LowerTileVisitor, TILE_STEP, TilePolicy, tile_lower};
use crate::error::{Result, check_shape};
use crate::kernels::RegisterMatrix;
use crate::matrix::{Matrix, MatrixMut};
use crate::pointer::{ColumnMajor, MatrixPointer};
use crate::simd::Scalar;

struct SyrkTiles<T, PA, PC, PD> {
    k: usize,
    alpha: T,
    a: PA,
    beta: T,
    c: PC,
    d: PD,
}

impl<T, PA, PC, PD> LowerTileVisitor<T> for SyrkTiles<T, PA, PC, PD>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PC: MatrixPointer<Element = T, Order = ColumnMajor>,
    PD: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    #[inline(always)]
    fn off_diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, TILE_STEP>, i: usize, j: usize, m: usize) {
        let at = self.a.trans();
        unsafe {
            ker.load_partial(self.beta, self.c.offset(i, j), m, TILE_STEP);
            ker.gemm_partial(self.k, self.alpha, self.a.offset(i, 0), at.offset(0, j), m, TILE_STEP);
            ker.store_partial(self.d.offset(i, j), m, TILE_STEP);
        }
    }

    #[inline(always)]
    fn diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, TILE_STEP>, d: usize, m: usize) {
        let n = m.min(TILE_STEP);
        let at = self.a.trans();
        unsafe {
            ker.load_partial(self.beta, self.c.offset(d, d), m, n);
            ker.gemm_partial(self.k, self.alpha, self.a.offset(d, 0), at.offset(0, d), m, n);
            ker.store_lower_partial(self.d.offset(d, d), m, n);
        }
    }
}

/// Pointer-level SYRK: `D = alpha * A * A^T + beta * C` on and below the
/// diagonal. `A` is `m x k`, `C` and `D` are `m x m`. Elements of `D`
/// above the diagonal are never written.
///
/// # Safety
///
/// Caller must ensure:
/// - `a` addresses a readable `m x k` matrix
/// - `c` addresses a readable `m x m` matrix and `d` the writable lower
///   triangle of one
/// - `d` does not overlap `a`, and overlaps `c` only exactly
#[allow(clippy::too_many_arguments)]
pub unsafe fn syrk_lower_backend<T, P, PA, PC, PD>(policy: &P, m: usize, k: usize, alpha: T, a: PA, beta: T, c: PC, d: PD)
where
    T: Scalar,
    P: TilePolicy,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PC: MatrixPointer<Element = T, Order = ColumnMajor>,
    PD: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    let mut tiles = SyrkTiles { k, alpha, a, beta, c, d };
    tile_lower(policy, m, &mut tiles);
}

/// `D = alpha * A * A^T + beta * C`, lower triangle only.
///
/// `A` is `m x k`, `C` and `D` are `m x m`. Only the lower triangle of `C`
/// contributes to the result and only the lower triangle of `D` is written.
/// With `beta == 0` `C` is not read.
pub fn syrk_lower<T, MA, MC, MD>(alpha: T, a: &MA, beta: T, c: &MC, d: &mut MD) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MC: Matrix<Element = T, Order = ColumnMajor>,
    MD: MatrixMut<Element = T, Order = ColumnMajor>,
{
    let (m, k) = a.shape();
    check_shape("syrk_lower", "C", c.shape(), (m, m))?;
    check_shape("syrk_lower", "D", d.shape(), (m, m))?;
    unsafe { syrk_lower_backend(&BalancedPolicy, m, k, alpha, a.ptr(0, 0), beta, c.ptr(0, 0), d.ptr_mut(0, 0)) };
    Ok(())
}
