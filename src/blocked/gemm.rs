//! General matrix multiply `D = alpha * A * B + beta * C`.

use super::tile::{BalancedPolicy, TilePolicy, TileVisitor, tile_with};
use crate::error::{Result, check_shape};
use crate::kernels::RegisterMatrix;
use crate::matrix::{Matrix, MatrixMut};
use crate::pointer::{ColumnMajor, MatrixPointer, Order};
use crate::simd::Scalar;

/// Per-tile work of [`gemm_backend`]. Holds pointers the caller vouched for.
struct GemmTiles<T, PA, PB, PC, PD> {
    k: usize,
    alpha: T,
    a: PA,
    b: PB,
    beta: T,
    c: PC,
    d: PD,
}

impl<T, PA, PB, PC, PD> TileVisitor<T> for GemmTiles<T, PA, PB, PC, PD>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T>,
    PC: MatrixPointer<Element = T, Order = ColumnMajor>,
    PD: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    #[inline(always)]
    fn full<const RM: usize, const N: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, N>, i: usize, j: usize) {
        unsafe {
            ker.load_scaled(self.beta, self.c.offset(i, j));
            ker.gemm(self.k, self.alpha, self.a.offset(i, 0), self.b.offset(0, j));
            ker.store(self.d.offset(i, j));
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
            ker.load_partial(self.beta, self.c.offset(i, j), m, n);
            ker.gemm_partial(self.k, self.alpha, self.a.offset(i, 0), self.b.offset(0, j), m, n);
            ker.store_partial(self.d.offset(i, j), m, n);
        }
    }
}

/// Pointer-level GEMM: `D = alpha * A * B + beta * C`.
///
/// Walks `D` with column-major tile order; each tile reads its block of `C`
/// before writing the same block of `D`, so `C` and `D` may be the same
/// storage.
///
/// # Safety
///
/// Caller must ensure:
/// - `a` addresses a readable `m x k` matrix, `b` a readable `k x n` one
/// - `c` addresses a readable and `d` a writable `m x n` matrix
/// - `d` does not overlap `a` or `b`, and overlaps `c` only exactly
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm_backend<T, P, PA, PB, PC, PD>(
    policy: &P,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: PA,
    b: PB,
    beta: T,
    c: PC,
    d: PD,
) where
    T: Scalar,
    P: TilePolicy,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
    PB: MatrixPointer<Element = T>,
    PC: MatrixPointer<Element = T, Order = ColumnMajor>,
    PD: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    let mut tiles = GemmTiles { k, alpha, a, b, beta, c, d };
    tile_with(policy, Order::ColumnMajor, m, n, &mut tiles);
}

/// `D = alpha * A * B + beta * C`.
///
/// `A` is `m x k`, `B` is `k x n` in either storage order, `C` and `D` are
/// `m x n`. Shapes are checked before anything is read. With `beta == 0`
/// `C` is not read, so it may hold NaN or infinity.
///
/// ```
/// use regblas::{DynamicMatrix, gemm};
///
/// let a = DynamicMatrix::<f64>::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
/// let b = DynamicMatrix::<f64>::identity(2);
/// let c = DynamicMatrix::<f64>::from_fn(2, 2, |_, _| 1.0);
/// let mut d = DynamicMatrix::<f64>::new(2, 2);
///
/// gemm(2.0, &a, &b, -1.0, &c, &mut d).unwrap();
/// assert_eq!(d[(1, 0)], 5.0);
/// ```
pub fn gemm<T, MA, MB, MC, MD>(alpha: T, a: &MA, b: &MB, beta: T, c: &MC, d: &mut MD) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MB: Matrix<Element = T>,
    MC: Matrix<Element = T, Order = ColumnMajor>,
    MD: MatrixMut<Element = T, Order = ColumnMajor>,
{
    let (m, n) = d.shape();
    let k = a.columns();
    check_shape("gemm", "A", a.shape(), (m, k))?;
    check_shape("gemm", "B", b.shape(), (k, n))?;
    check_shape("gemm", "C", c.shape(), (m, n))?;
    // SAFETY: shapes checked above; `d` is borrowed mutably so it cannot
    // overlap the inputs.
    unsafe {
        gemm_backend(
            &BalancedPolicy,
            m,
            n,
            k,
            alpha,
            a.ptr(0, 0),
            b.ptr(0, 0),
            beta,
            c.ptr(0, 0),
            d.ptr_mut(0, 0),
        );
    }
    Ok(())
}

/// `D = A * B + C`.
pub fn gemm_nn<T, MA, MB, MC, MD>(a: &MA, b: &MB, c: &MC, d: &mut MD) -> Result<()>
where
    T: Scalar,
    MA: Matrix<Element = T, Order = ColumnMajor>,
    MB: Matrix<Element = T>,
    MC: Matrix<Element = T, Order = ColumnMajor>,
    MD: MatrixMut<Element = T, Order = ColumnMajor>,
{
    gemm(T::one(), a, b, T::one(), c, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::matrix::{DynamicMatrix, StaticMatrix};
    use crate::pointer::RowMajor;
    use crate::reference;

    #[test]
    fn test_gemm_matches_reference() {
        let (m, n, k) = (13, 7, 5);
        let a = DynamicMatrix::<f64>::from_fn(m, k, |i, j| ((i * 3 + j) % 7) as f64 - 3.0);
        let b = DynamicMatrix::<f64, RowMajor>::from_fn(k, n, |i, j| ((i + 2 * j) % 5) as f64);
        let c = DynamicMatrix::<f64>::from_fn(m, n, |i, j| (i + j) as f64);
        let mut d = DynamicMatrix::<f64>::new(m, n);
        let mut expected = DynamicMatrix::<f64>::new(m, n);
        gemm(2.0, &a, &b, 0.5, &c, &mut d).unwrap();
        reference::gemm(2.0, &a, &b, 0.5, &c, &mut expected);
        for i in 0..m {
            for j in 0..n {
                assert_eq!(d[(i, j)], expected[(i, j)], "at ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_gemm_zero_beta_skips_c() {
        let (m, n, k) = (11, 6, 3);
        let a = DynamicMatrix::<f64>::from_fn(m, k, |i, j| (i + j) as f64);
        let b = DynamicMatrix::<f64>::from_fn(k, n, |i, j| (i * j) as f64 - 1.0);
        let c = DynamicMatrix::<f64>::from_fn(m, n, |_, _| f64::NAN);
        let mut d = DynamicMatrix::<f64>::new(m, n);
        let mut expected = DynamicMatrix::<f64>::new(m, n);
        gemm(1.5, &a, &b, 0.0, &c, &mut d).unwrap();
        reference::gemm(1.5, &a, &b, 0.0, &c, &mut expected);
        for i in 0..m {
            for j in 0..n {
                assert!(d[(i, j)].is_finite());
                assert_eq!(d[(i, j)], expected[(i, j)], "at ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_gemm_in_place_accumulate() {
        let a = DynamicMatrix::<f64>::from_fn(9, 3, |i, j| (i * j) as f64);
        let b = DynamicMatrix::<f64>::from_fn(3, 6, |i, j| (i + j) as f64);
        let mut d = DynamicMatrix::<f64>::from_fn(9, 6, |_, _| 1.0);
        let before = d.clone();
        let mut expected = DynamicMatrix::<f64>::new(9, 6);
        reference::gemm(1.0, &a, &b, 1.0, &before, &mut expected);
        let (m, n) = d.shape();
        unsafe {
            let p = d.ptr_mut(0, 0);
            gemm_backend(&BalancedPolicy, m, n, 3, 1.0, a.ptr(0, 0), b.ptr(0, 0), 1.0, p, p);
        }
        for i in 0..9 {
            for j in 0..6 {
                assert_eq!(d[(i, j)], expected[(i, j)]);
            }
        }
    }

    #[test]
    fn test_gemm_static_operands() {
        let a = StaticMatrix::<f64, 5, 2>::from_fn(|i, j| (i + j) as f64);
        let b = StaticMatrix::<f64, 2, 3>::from_fn(|i, j| (i * j + 1) as f64);
        let c = StaticMatrix::<f64, 5, 3>::zeros();
        let mut d = StaticMatrix::<f64, 5, 3>::zeros();
        gemm_nn(&a, &b, &c, &mut d).unwrap();
        assert_eq!(d[(4, 2)], 4.0 * 1.0 + 5.0 * 3.0);
    }

    #[test]
    fn test_gemm_rejects_bad_shapes() {
        let a = DynamicMatrix::<f64>::new(4, 3);
        let b = DynamicMatrix::<f64>::new(2, 5);
        let c = DynamicMatrix::<f64>::new(4, 5);
        let mut d = DynamicMatrix::<f64>::from_fn(4, 5, |_, _| 9.0);
        let err = gemm(1.0, &a, &b, 1.0, &c, &mut d).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                op: "gemm",
                operand: "B",
                expected: (3, 5),
                got: (2, 5),
            }
        );
        assert_eq!(d[(0, 0)], 9.0);
    }
}
