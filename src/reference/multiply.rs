use super::{assert_shape, triangular};
use crate::kernels::{Side, UpLo};
use crate::matrix::{Matrix, MatrixMut};
use crate::simd::Scalar;

/// `beta * c`, with `c` ignored when `beta` is zero.
fn scaled<T: Scalar>(beta: T, c: T) -> T {
    if beta == T::zero() {
        T::zero()
    } else {
        beta * c
    }
}

/// Reference `D = alpha * A * B + beta * C`. `C` is not read when `beta` is
/// zero.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k)
/// * `b` - Matrix B (k × n), any storage order
/// * `c` - Matrix C (m × n)
/// * `d` - Matrix D (m × n), overwritten
///
/// # Panics
///
/// Panics if the shapes don't match.
pub fn gemm<T, MA, MB, MC, MD>(alpha: T, a: &MA, b: &MB, beta: T, c: &MC, d: &mut MD)
where
    T: Scalar,
    MA: Matrix<Element = T>,
    MB: Matrix<Element = T>,
    MC: Matrix<Element = T>,
    MD: MatrixMut<Element = T>,
{
    let (m, k) = a.shape();
    let n = b.columns();
    assert_shape("B", b, k, n);
    assert_shape("C", c, m, n);
    assert_shape("D", &*d, m, n);
    for i in 0..m {
        for j in 0..n {
            let mut acc = T::zero();
            for p in 0..k {
                acc += a.get(i, p) * b.get(p, j);
            }
            d.set(i, j, alpha * acc + scaled(beta, c.get(i, j)));
        }
    }
}

/// Reference `D = alpha * A * A^T + beta * C` on the lower triangle.
///
/// Elements of `D` above the diagonal are not written.
pub fn syrk_lower<T, MA, MC, MD>(alpha: T, a: &MA, beta: T, c: &MC, d: &mut MD)
where
    T: Scalar,
    MA: Matrix<Element = T>,
    MC: Matrix<Element = T>,
    MD: MatrixMut<Element = T>,
{
    let (m, k) = a.shape();
    assert_shape("C", c, m, m);
    assert_shape("D", &*d, m, m);
    for j in 0..m {
        for i in j..m {
            let mut acc = T::zero();
            for p in 0..k {
                acc += a.get(i, p) * a.get(j, p);
            }
            d.set(i, j, alpha * acc + scaled(beta, c.get(i, j)));
        }
    }
}

/// Reference triangular multiply: `C = alpha * A * B` for [`Side::Left`],
/// `C = alpha * B * A` for [`Side::Right`].
///
/// Only the `uplo` triangle of `A` is read; with `unit` its diagonal is
/// taken as one.
pub fn trmm<T, MA, MB, MC>(side: Side, uplo: UpLo, unit: bool, alpha: T, a: &MA, b: &MB, c: &mut MC)
where
    T: Scalar,
    MA: Matrix<Element = T>,
    MB: Matrix<Element = T>,
    MC: MatrixMut<Element = T>,
{
    let (m, n) = b.shape();
    let size = if side == Side::Left { m } else { n };
    assert_shape("A", a, size, size);
    assert_shape("C", &*c, m, n);
    for i in 0..m {
        for j in 0..n {
            let mut acc = T::zero();
            for p in 0..size {
                acc += match side {
                    Side::Left => triangular(a, uplo, unit, i, p) * b.get(p, j),
                    Side::Right => b.get(i, p) * triangular(a, uplo, unit, p, j),
                };
            }
            c.set(i, j, alpha * acc);
        }
    }
}
