use super::{assert_shape, triangular};
use crate::kernels::UpLo;
use crate::matrix::{Matrix, MatrixMut};
use crate::simd::Scalar;

/// Reference Cholesky factorization `A = L * L^T`.
///
/// Reads the lower triangle of `A` and writes the lower triangle of `L`;
/// elements of `L` above the diagonal are not written.
pub fn potrf<T, MA, ML>(a: &MA, l: &mut ML)
where
    T: Scalar,
    MA: Matrix<Element = T>,
    ML: MatrixMut<Element = T>,
{
    let n = a.rows();
    assert_shape("A", a, n, n);
    assert_shape("L", &*l, n, n);
    for j in 0..n {
        let mut d = a.get(j, j);
        for k in 0..j {
            d -= l.get(j, k) * l.get(j, k);
        }
        let d = d.sqrt();
        l.set(j, j, d);
        for i in j + 1..n {
            let mut s = a.get(i, j);
            for k in 0..j {
                s -= l.get(i, k) * l.get(j, k);
            }
            l.set(i, j, s / d);
        }
    }
}

/// Reference triangular solve `A * X = B`, by substitution one column at a
/// time.
pub fn trsm<T, MA, MB, MX>(uplo: UpLo, unit: bool, a: &MA, b: &MB, x: &mut MX)
where
    T: Scalar,
    MA: Matrix<Element = T>,
    MB: Matrix<Element = T>,
    MX: MatrixMut<Element = T>,
{
    let (m, n) = b.shape();
    assert_shape("A", a, m, m);
    assert_shape("X", &*x, m, n);
    let order: Vec<usize> = match uplo {
        UpLo::Lower => (0..m).collect(),
        UpLo::Upper => (0..m).rev().collect(),
    };
    for j in 0..n {
        for &i in &order {
            let mut acc = b.get(i, j);
            for &k in order.iter().take_while(|&&k| k != i) {
                acc -= triangular(a, uplo, unit, i, k) * x.get(k, j);
            }
            x.set(i, j, acc / triangular(a, uplo, unit, i, i));
        }
    }
}
