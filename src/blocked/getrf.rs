//! LU factorization with partial pivoting, `A = P * L * U`.
//!
//! [`getf2`] is the unblocked right-looking algorithm: one pivot column at a
//! time, eliminated with a rank-1 update of the trailing matrix. [`getrf`]
//! runs it on panels one SIMD register wide and updates the trailing matrix
//! with a unit-lower [`trsm_backend`] and a [`gemm_backend`] instead.
//!
//! Pivots are stored LAPACK style (zero based): row `k` was interchanged with
//! row `ipiv[k]`, in increasing `k`.

use super::gemm::gemm_backend;
use super::ger::ger_backend;
use super::iamax::iamax_backend;
use super::tile::{BalancedPolicy, TilePolicy};
use super::trsm::trsm_backend;
use crate::error::{Error, Result, check_row};
use crate::kernels::UpLo;
use crate::matrix::MatrixMut;
use crate::pointer::{ColumnMajor, MatrixPointer, VectorPointer};
use crate::simd::Scalar;

/// Exchanges rows `r0` and `r1` over `n` columns.
///
/// # Safety
///
/// Both pointers must address `n` readable and writable elements along their
/// row.
pub unsafe fn swap_rows_backend<P: MatrixPointer>(n: usize, r0: P, r1: P) {
    for j in 0..n {
        let (p, q) = (r0.offset(0, j), r1.offset(0, j));
        unsafe {
            let t = p.value();
            p.set_value(q.value());
            q.set_value(t);
        }
    }
}

/// Applies the interchanges `ipiv[k0..k1]` to `n` columns starting at `a`.
///
/// # Safety
///
/// `a` must address a readable and writable matrix with `n` columns and
/// more rows than any of the pivot indices used.
pub unsafe fn laswp_backend<P: MatrixPointer>(n: usize, a: P, k0: usize, k1: usize, ipiv: &[usize]) {
    for (k, &p) in ipiv.iter().enumerate().take(k1).skip(k0) {
        if p != k {
            unsafe { swap_rows_backend(n, a.offset(k, 0), a.offset(p, 0)) };
        }
    }
}

/// Unblocked LU factorization of an `m x n` matrix in place.
///
/// Fails with [`Error::SingularMatrix`] on the first column whose candidate
/// pivots are all exactly zero; the columns before it are factored, the rest
/// is left partially updated.
///
/// # Safety
///
/// `a` must address a readable and writable `m x n` matrix and `ipiv` must
/// hold at least `min(m, n)` entries.
pub unsafe fn getf2_backend<T, PA>(m: usize, n: usize, a: PA, ipiv: &mut [usize]) -> Result<()>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    for k in 0..m.min(n) {
        let column = VectorPointer::new(a.offset(k, k).get(), 1);
        let p = k + unsafe { iamax_backend(m - k, column) };
        let pivot = unsafe { a.offset(p, k).value() };
        if pivot == T::zero() {
            return Err(Error::SingularMatrix { column: k });
        }

        ipiv[k] = p;
        if p != k {
            unsafe { swap_rows_backend(n, a.offset(k, 0), a.offset(p, 0)) };
        }

        let pivot = unsafe { a.offset(k, k).value() };
        for i in k + 1..m {
            let q = a.offset(i, k);
            unsafe { q.set_value(q.value() / pivot) };
        }

        if k + 1 < m && k + 1 < n {
            let x = VectorPointer::new(a.offset(k + 1, k).get(), 1);
            let y = VectorPointer::new(a.offset(k, k + 1).get(), a.spacing());
            let trailing = a.offset(k + 1, k + 1);
            unsafe { ger_backend(&BalancedPolicy, m - k - 1, n - k - 1, -T::one(), x, y, trailing, trailing) };
        }
    }
    Ok(())
}

/// Blocked LU factorization of an `m x n` matrix in place.
///
/// # Safety
///
/// Same as [`getf2_backend`].
pub unsafe fn getrf_backend<T, P, PA>(policy: &P, m: usize, n: usize, a: PA, ipiv: &mut [usize]) -> Result<()>
where
    T: Scalar,
    P: TilePolicy,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    let nb = T::SIMD_SIZE;
    let mut k = 0;
    while k + nb < m && k + nb < n {
        unsafe { factor_panel(m - k, nb, a, k, ipiv)? };
        unsafe {
            laswp_backend(k, a, k, k + nb, ipiv);
            laswp_backend(n - k - nb, a.offset(0, k + nb), k, k + nb, ipiv);
            // U12 = L11^-1 * A12
            trsm_backend(policy, UpLo::Lower, true, nb, n - k - nb, a.offset(k, k), a.offset(k, k + nb), a.offset(k, k + nb));
            // A22 -= L21 * U12
            let a22 = a.offset(k + nb, k + nb);
            gemm_backend(policy, m - k - nb, n - k - nb, nb, -T::one(), a.offset(k + nb, k), a.offset(k, k + nb), T::one(), a22, a22);
        }
        k += nb;
    }
    if k < m.min(n) {
        unsafe {
            factor_panel(m - k, n - k, a, k, ipiv)?;
            laswp_backend(k, a, k, m.min(n), ipiv);
        }
    }
    Ok(())
}

/// Runs [`getf2_backend`] on the `rows x cols` block at `(k, k)` and makes
/// its pivots and errors absolute.
unsafe fn factor_panel<T, PA>(rows: usize, cols: usize, a: PA, k: usize, ipiv: &mut [usize]) -> Result<()>
where
    T: Scalar,
    PA: MatrixPointer<Element = T, Order = ColumnMajor>,
{
    let end = k + rows.min(cols);
    unsafe { getf2_backend(rows, cols, a.offset(k, k), &mut ipiv[k..end]) }.map_err(|e| match e {
        Error::SingularMatrix { column } => Error::SingularMatrix { column: column + k },
        other => other,
    })?;
    for p in &mut ipiv[k..end] {
        *p += k;
    }
    Ok(())
}

fn check_pivots(ipiv: &[usize], m: usize, n: usize) -> Result<()> {
    let expected = m.min(n);
    if ipiv.len() < expected {
        return Err(Error::PivotLength {
            expected,
            got: ipiv.len(),
        });
    }
    Ok(())
}

/// Unblocked LU factorization with partial pivoting, in place.
///
/// On success `A` holds `U` on and above the diagonal and the unit lower
/// factor `L` below it, and `ipiv[..min(m, n)]` the row interchanges.
pub fn getf2<T, M>(a: &mut M, ipiv: &mut [usize]) -> Result<()>
where
    T: Scalar,
    M: MatrixMut<Element = T, Order = ColumnMajor>,
{
    let (m, n) = a.shape();
    check_pivots(ipiv, m, n)?;
    unsafe { getf2_backend(m, n, a.ptr_mut(0, 0), ipiv) }
}

/// Blocked LU factorization with partial pivoting, in place.
///
/// Same contract as [`getf2`]. A column without a nonzero pivot candidate
/// fails with [`Error::SingularMatrix`].
///
/// ```
/// use regblas::{DynamicMatrix, getrf};
///
/// let mut a = DynamicMatrix::<f64>::from_row_slice(2, 2, &[1.0, 2.0, 4.0, 4.0]);
/// let mut ipiv = [0; 2];
/// getrf(&mut a, &mut ipiv).unwrap();
/// assert_eq!(ipiv, [1, 1]);
/// assert_eq!(a[(0, 0)], 4.0);
/// assert_eq!(a[(1, 0)], 0.25);
/// assert_eq!(a[(1, 1)], 1.0);
/// ```
pub fn getrf<T, M>(a: &mut M, ipiv: &mut [usize]) -> Result<()>
where
    T: Scalar,
    M: MatrixMut<Element = T, Order = ColumnMajor>,
{
    let (m, n) = a.shape();
    check_pivots(ipiv, m, n)?;
    unsafe { getrf_backend(&BalancedPolicy, m, n, a.ptr_mut(0, 0), ipiv) }
}

/// Applies the row interchanges `ipiv[k0..k1]` to `A`, in increasing order.
///
/// Nothing is swapped unless every interchange in range names rows of `A`.
pub fn laswp<T, M>(a: &mut M, k0: usize, k1: usize, ipiv: &[usize]) -> Result<()>
where
    T: Scalar,
    M: MatrixMut<Element = T>,
{
    if ipiv.len() < k1 {
        return Err(Error::PivotLength {
            expected: k1,
            got: ipiv.len(),
        });
    }
    let rows = a.rows();
    for (k, &p) in ipiv.iter().enumerate().take(k1).skip(k0) {
        check_row(k, rows)?;
        check_row(p, rows)?;
    }
    unsafe { laswp_backend(a.columns(), a.ptr_mut(0, 0), k0, k1, ipiv) };
    Ok(())
}

/// Exchanges rows `i` and `j` of `A`.
pub fn swap_rows<T, M>(a: &mut M, i: usize, j: usize) -> Result<()>
where
    T: Scalar,
    M: MatrixMut<Element = T>,
{
    let rows = a.rows();
    check_row(i, rows)?;
    check_row(j, rows)?;
    if i != j {
        let n = a.columns();
        let p = a.ptr_mut(0, 0);
        unsafe { swap_rows_backend(n, p.offset(i, 0), p.offset(j, 0)) };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::matrix::{DynamicMatrix, Matrix};

    fn sample(m: usize, n: usize) -> DynamicMatrix<f64> {
        let mut rng = StdRng::seed_from_u64((m * 1000 + n) as u64);
        DynamicMatrix::from_fn(m, n, |_, _| rng.gen_range(-1.0..1.0))
    }

    /// Checks `P * A = L * U` for a factored copy `lu` of `a`.
    fn check_lu(a: &DynamicMatrix<f64>, lu: &DynamicMatrix<f64>, ipiv: &[usize]) {
        let (m, n) = a.shape();
        let r = m.min(n);
        let mut pa = a.clone();
        laswp(&mut pa, 0, r, ipiv).unwrap();
        for i in 0..m {
            for j in 0..n {
                let mut s = 0.0;
                for k in 0..=i.min(j).min(r - 1) {
                    let l = if i == k { 1.0 } else { lu[(i, k)] };
                    s += l * lu[(k, j)];
                }
                assert_abs_diff_eq!(s, pa[(i, j)], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_getf2_reconstructs() {
        for (m, n) in [(1, 1), (3, 3), (5, 3), (3, 5), (8, 8)] {
            let a = sample(m, n);
            let mut lu = a.clone();
            let mut ipiv = vec![0; m.min(n)];
            getf2(&mut lu, &mut ipiv).unwrap();
            check_lu(&a, &lu, &ipiv);
        }
    }

    #[test]
    fn test_getrf_reconstructs() {
        for (m, n) in [(4, 4), (9, 9), (13, 7), (7, 13), (16, 16), (21, 18)] {
            let a = sample(m, n);
            let mut lu = a.clone();
            let mut ipiv = vec![0; m.min(n)];
            getrf(&mut lu, &mut ipiv).unwrap();
            check_lu(&a, &lu, &ipiv);
            // Partial pivoting keeps |L| <= 1.
            for j in 0..m.min(n) {
                for i in j + 1..m {
                    assert!(lu[(i, j)].abs() <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_getrf_zero_column_is_singular() {
        let mut a = sample(9, 9);
        for i in 0..9 {
            a[(i, 5)] = 0.0;
        }
        let mut ipiv = [0; 9];
        assert_eq!(getrf(&mut a.clone(), &mut ipiv), Err(Error::SingularMatrix { column: 5 }));
        assert_eq!(getf2(&mut a, &mut ipiv), Err(Error::SingularMatrix { column: 5 }));
    }

    #[test]
    fn test_getrf_short_pivot_buffer() {
        let mut a = sample(5, 4);
        let mut ipiv = [0; 3];
        assert_eq!(getrf(&mut a, &mut ipiv), Err(Error::PivotLength { expected: 4, got: 3 }));
    }

    #[test]
    fn test_swap_rows() {
        let mut a = sample(4, 3);
        let before = a.clone();
        swap_rows(&mut a, 0, 3).unwrap();
        for j in 0..3 {
            assert_eq!(a[(0, j)], before[(3, j)]);
            assert_eq!(a[(3, j)], before[(0, j)]);
            assert_eq!(a[(1, j)], before[(1, j)]);
        }
    }

    #[test]
    fn test_row_out_of_range_is_an_error() {
        let mut a = sample(3, 3);
        let before = a.clone();
        assert_eq!(laswp(&mut a, 0, 1, &[7]), Err(Error::RowOutOfRange { index: 7, rows: 3 }));
        // A bad entry later in the range leaves the matrix untouched.
        assert_eq!(laswp(&mut a, 0, 2, &[2, 5]), Err(Error::RowOutOfRange { index: 5, rows: 3 }));
        assert_eq!(laswp(&mut a, 0, 4, &[0, 1, 2, 0]), Err(Error::RowOutOfRange { index: 3, rows: 3 }));
        assert_eq!(swap_rows(&mut a, 1, 3), Err(Error::RowOutOfRange { index: 3, rows: 3 }));
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(a[(i, j)], before[(i, j)]);
            }
        }
    }
}
