//! Rank-1 update `B = alpha * x * y^T + A`.

use super::tile::{BalancedPolicy, TilePolicy, TileVisitor, tile_with};
use crate::error::{Result, check_shape};
use crate::kernels::RegisterMatrix;
use crate::matrix::{Matrix, MatrixMut};
use crate::pointer::{ColumnMajor, MatrixPointer, Order, VectorPointer};
use crate::simd::Scalar;

struct GerTiles<T, PA, PB> {
    alpha: T,
    x: VectorPointer<T>,
    y: VectorPointer<T>,
    a: PA,
    b: PB,
}

impl<T, PA, PB> TileVisitor<T> for GerTiles<T, PA, PB>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    #[inline(always)]
    fn full<const RM: usize, const N: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, N>, i: usize, j: usize) {
        unsafe {
            ker.load(self.a.offset(i, j));
            ker.ger(self.alpha, self.x.offset(i).column(), self.y.offset(j).row());
            ker.store(self.b.offset(i, j));
        }
    }

    #[inline(always)]
    fn partial<const RM: usize, const N: usize>(
        &mut self,
        ker: &mut RegisterMatrix<T, RM, N>,
        i: usize,
        j: usize,
        m: usize,
        n: usize,
    ) {
        unsafe {
            ker.load_partial(T::one(), self.a.offset(i, j), m, n);
            ker.ger_partial(self.alpha, self.x.offset(i).column(), self.y.offset(j).row(), m, n);
            ker.store_partial(self.b.offset(i, j), m, n);
        }
    }
}

/// Pointer-level rank-1 update of an `m x n` matrix.
///
/// `A` and `B` may be the same storage.
///
/// # Safety
///
/// Caller must ensure:
/// - `x` addresses `m` readable elements with unit stride
/// - `y` addresses `n` readable elements (any stride)
/// - `a` addresses a readable and `b` a writable `m x n` matrix
/// - `b` does not overlap `x` or `y`, and overlaps `a` only exactly
#[allow(clippy::too_many_arguments)]
pub unsafe fn ger_backend<T, P, PA, PB>(
    policy: &P,
    m: usize,
    n: usize,
    alpha: T,
    x: VectorPointer<T>,
    y: VectorPointer<T>,
    a: PA,
    b: PB,
) where
    T: Scalar,
    P: TilePolicy,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    debug_assert!(m == 0 || x.stride() == 1, "ger needs a unit-stride x");
    let mut tiles = GerTiles { alpha, x, y, a, b };
    tile_with(policy, Order::ColumnMajor, m, n, &mut tiles);
}

/// `B = alpha * x * y^T + A`, where `A` and `B` are `x.len() x y.len()`.
pub fn ger<T, MA, MB>(alpha: T, x: &[T], y: &[T], a: &MA, b: &mut MB) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MB: MatrixMut<Element = T, Order = ColumnMajor>,
{
    let (m, n) = (x.len(), y.len());
    check_shape("ger", "A", a.shape(), (m, n))?;
    check_shape("ger", "B", b.shape(), (m, n))?;
    unsafe {
        ger_backend(
            &BalancedPolicy,
            m,
            n,
            alpha,
            VectorPointer::from_slice(x),
            VectorPointer::from_slice(y),
            a.ptr(0, 0),
            b.ptr_mut(0, 0),
        );
    }
    Ok(())
}
