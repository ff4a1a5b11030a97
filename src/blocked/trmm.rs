//! Triangular matrix multiply, `C = alpha * A * B` or `C = alpha * B * A`
//! with `A` triangular.

use super::tile::{BalancedPolicy, TilePolicy, TileVisitor, tile_with};
use crate::error::{Result, check_shape, check_square};
use crate::kernels::{RegisterMatrix, Side, UpLo};
use crate::matrix::{Matrix, MatrixMut};
use crate::pointer::{ColumnMajor, MatrixPointer, Order};
use crate::simd::Scalar;

struct TrmmTiles<T, PA, PB, PC> {
    side: Side,
    uplo: UpLo,
    unit: bool,
    alpha: T,
    // Order of `A`.
    size: usize,
    a: PA,
    b: PB,
    c: PC,
}

impl<T, PA, PB, PC> TileVisitor<T> for TrmmTiles<T, PA, PB, PC>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T, Order = ColumnMajor>,
    PC: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    #[inline(always)]
    fn full<const RM: usize, const N: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, N>, i: usize, j: usize) {
        self.partial(ker, i, j, RegisterMatrix::<T, RM, N>::ROWS, N);
    }

    fn partial<const RM: usize, const N: usize>(
        &mut self,
        ker: &mut RegisterMatrix<T, RM, N>,
        i: usize,
        j: usize,
        m: usize,
        n: usize,
    ) {
        let (alpha, uplo, unit) = (self.alpha, self.uplo, self.unit);
        let (a, b) = (self.a, self.b);
        unsafe {
            match (self.side, uplo) {
                (Side::Left, UpLo::Upper) => {
                    let e = i + m;
                    ker.trmm_left_partial(alpha, a.offset(i, i), uplo, unit, b.offset(i, j), m, n);
                    ker.gemm_partial(self.size - e, alpha, a.offset(i, e), b.offset(e, j), m, n);
                }
                (Side::Left, UpLo::Lower) => {
                    ker.gemm_partial(i, alpha, a.offset(i, 0), b.offset(0, j), m, n);
                    ker.trmm_left_partial(alpha, a.offset(i, i), uplo, unit, b.offset(i, j), m, n);
                }
                (Side::Right, UpLo::Lower) => {
                    let e = j + n;
                    ker.trmm_right_partial(alpha, b.offset(i, j), a.offset(j, j), uplo, unit, m, n);
                    ker.gemm_partial(self.size - e, alpha, b.offset(i, e), a.offset(e, j), m, n);
                }
                (Side::Right, UpLo::Upper) => {
                    ker.gemm_partial(j, alpha, b.offset(i, 0), a.offset(0, j), m, n);
                    ker.trmm_right_partial(alpha, b.offset(i, j), a.offset(j, j), uplo, unit, m, n);
                }
            }
            ker.store_partial(self.c.offset(i, j), m, n);
        }
    }
}

/// Pointer-level TRMM on an `m x n` result.
///
/// `A` is `m x m` for [`Side::Left`] and `n x n` for [`Side::Right`]; only
/// its `uplo` triangle is read, and its diagonal only when `unit` is false.
///
/// # Safety
///
/// Caller must ensure:
/// - `a` addresses the readable `uplo` triangle of the square operand
/// - `b` addresses a readable and `c` a writable `m x n` matrix
/// - `c` overlaps neither `a` nor `b`
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_backend<T, P, PA, PB, PC>(
    policy: &P,
    side: Side,
    uplo: UpLo,
    unit: bool,
    m: usize,
    n: usize,
    alpha: T,
    a: PA,
    b: PB,
    c: PC,
) where
    T: Scalar,
    P: TilePolicy,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T, Order = ColumnMajor>,
    PC: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    let size = match side {
        Side::Left => m,
        Side::Right => n,
    };
    let mut tiles = TrmmTiles { side, uplo, unit, alpha, size, a, b, c };
    tile_with(policy, Order::ColumnMajor, m, n, &mut tiles);
}

/// `C = alpha * A * B` ([`Side::Left`]) or `C = alpha * B * A`
/// ([`Side::Right`]) with `A` triangular.
///
/// `B` and `C` are `m x n`; `A` is square with `m` (left) or `n` (right)
/// rows. Elements of `A` outside the `uplo` triangle are never read, nor is
/// its diagonal when `unit` is set.
#[allow(clippy::too_many_arguments)]
pub fn trmm<T, MA, MB, MC>(side: Side, uplo: UpLo, unit: bool, alpha: T, a: &MA, b: &MB, c: &mut MC) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MB: Matrix<Element = T, Order = ColumnMajor>,
    MC: MatrixMut<Element = T, Order = ColumnMajor>,
{
    check_square("trmm", "A", a.shape())?;
    let (m, n) = b.shape();
    let expected = match side {
        Side::Left => m,
        Side::Right => n,
    };
    check_shape("trmm", "A", a.shape(), (expected, expected))?;
    check_shape("trmm", "C", c.shape(), (m, n))?;
    unsafe { trmm_backend(&BalancedPolicy, side, uplo, unit, m, n, alpha, a.ptr(0, 0), b.ptr(0, 0), c.ptr_mut(0, 0)) };
    Ok(())
}

/// `C = alpha * A * B`, `A` upper triangular.
pub fn trmm_left_upper<T, MA, MB, MC>(alpha: T, a: &MA, b: &MB, c: &mut MC) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MB: Matrix<Element = T, Order = ColumnMajor>,
    MC: MatrixMut<Element = T, Order = ColumnMajor>,
{
    trmm(Side::Left, UpLo::Upper, false, alpha, a, b, c)
}

/// `C = alpha * B * A`, `A` lower triangular.
pub fn trmm_right_lower<T, MB, MA, MC>(alpha: T, b: &MB, a: &MA, c: &mut MC) -> Result<()>
where
    T: Scalar,
    MB: Matrix<Element = T, Order = ColumnMajor>,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MC: MatrixMut<Element = T, Order = ColumnMajor>,
{
    trmm(Side::Right, UpLo::Lower, false, alpha, a, b, c)
}
