//! Triangular solve against a single vector, `x = A^-1 * b`.

use super::tile::BalancedPolicy;
use super::trsm::trsm_backend;
use crate::error::{Result, check_shape, check_square};
use crate::kernels::UpLo;
use crate::matrix::Matrix;
use crate::pointer::{ColumnMajor, DynamicMatrixPointer};
use crate::simd::Scalar;

type ColumnPointer<T> = DynamicMatrixPointer<T, ColumnMajor, false, false>;

fn trsv<T, M>(op: &'static str, uplo: UpLo, a: &M, b: &[T], x: &mut [T]) -> Result<()>
where
    T: Scalar,
    M: Matrix<Element = T, Order = ColumnMajor>,
{
    let m = check_square(op, "A", a.shape())?;
    check_shape(op, "b", (b.len(), 1), (m, 1))?;
    check_shape(op, "x", (x.len(), 1), (m, 1))?;
    let spacing = m.max(1);
    let bp = ColumnPointer::new(b.as_ptr() as *mut T, spacing);
    let xp = ColumnPointer::new(x.as_mut_ptr(), spacing);
    unsafe { trsm_backend(&BalancedPolicy, uplo, false, m, 1, a.ptr(0, 0), bp, xp) };
    Ok(())
}

/// Solves `A * x = b` with `A` lower triangular (non-unit diagonal).
///
/// ```
/// use regblas::{DynamicMatrix, trsv_lower};
///
/// let a = DynamicMatrix::<f64>::from_row_slice(2, 2, &[2.0, 0.0, 3.0, 1.0]);
/// let mut x = [0.0; 2];
/// trsv_lower(&a, &[4.0, 7.0], &mut x).unwrap();
/// assert_eq!(x, [2.0, 1.0]);
/// ```
pub fn trsv_lower<T, M>(a: &M, b: &[T], x: &mut [T]) -> Result<()>
where
    T: Scalar,
    M: Matrix<Element = T, Order = ColumnMajor>,
{
    trsv("trsv_lower", UpLo::Lower, a, b, x)
}

/// Solves `A * x = b` with `A` upper triangular (non-unit diagonal).
pub fn trsv_upper<T, M>(a: &M, b: &[T], x: &mut [T]) -> Result<()>
where
    T: Scalar,
    M: Matrix<Element = T, Order = ColumnMajor>,
{
    trsv("trsv_upper", UpLo::Upper, a, b, x)
}
