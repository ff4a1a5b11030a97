use super::{RegisterMatrix, UpLo};
use crate::pointer::{ColumnMajor, MatrixPointer};
use crate::simd::{Scalar, SimdVec};

impl<T: Scalar, const RM: usize, const N: usize> RegisterMatrix<T, RM, N> {
    /// `R += alpha * A * B` with `A` a `ROWS x ROWS` triangular matrix.
    ///
    /// # Safety
    ///
    /// See [`RegisterMatrix::trmm_left_partial`].
    #[inline(always)]
    pub unsafe fn trmm_left<PA, PB>(&mut self, alpha: T, a: PA, uplo: UpLo, unit: bool, b: PB)
    where
        PA: MatrixPointer<Element = T>,
        PB: MatrixPointer<Element = T>,
    {
        unsafe { self.trmm_left_partial(alpha, a, uplo, unit, b, Self::ROWS, N) };
    }

    /// `R(0..m, 0..n) += alpha * A(0..m, 0..m) * B(0..m, 0..n)`, `A` triangular.
    ///
    /// Only the `uplo` triangle of `A` is read. With `unit` the diagonal is
    /// taken as one and not read at all.
    ///
    /// # Safety
    ///
    /// `a` must address the referenced triangle of an `m x m` matrix and `b`
    /// a readable `m x n` window.
    #[inline(always)]
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn trmm_left_partial<PA, PB>(
        &mut self,
        alpha: T,
        a: PA,
        uplo: UpLo,
        unit: bool,
        b: PB,
        m: usize,
        n: usize,
    ) where
        PA: MatrixPointer<Element = T>,
        PB: MatrixPointer<Element = T>,
    {
        let ss = Self::SS;
        let m = m.min(Self::ROWS);
        let n = n.min(N);
        let alpha_v = T::Simd::splat(alpha);
        let mut ax = [T::Simd::zero(); RM];
        for k in 0..m {
            // Rows of column k inside the triangle, and the ones read from A.
            let (lo, hi) = match uplo {
                UpLo::Upper => (0, k + 1),
                UpLo::Lower => (k, m),
            };
            let (read_lo, read_hi) = match (uplo, unit) {
                (UpLo::Upper, true) => (0, k),
                (UpLo::Lower, true) => (k + 1, m),
                _ => (lo, hi),
            };
            let (r0, r1) = (lo / ss, hi.div_ceil(ss));
            for r in r0..r1 {
                let mut col = unsafe { Self::column_segment(a, r, k, read_lo, read_hi) };
                if unit && r == k / ss {
                    col = col.replace(k % ss, T::one());
                }
                ax[r] = alpha_v.mul(col);
            }
            for j in 0..n {
                let bx = unsafe { b.offset(k, j).broadcast() };
                for r in r0..r1 {
                    self.v[r][j] = T::Simd::fmadd(ax[r], bx, self.v[r][j]);
                }
            }
        }
    }

    /// `R += alpha * B * A` with `A` an `N x N` triangular matrix.
    ///
    /// # Safety
    ///
    /// See [`RegisterMatrix::trmm_right_partial`].
    #[inline(always)]
    pub unsafe fn trmm_right<PB, PA>(&mut self, alpha: T, b: PB, a: PA, uplo: UpLo, unit: bool)
    where
        PB: MatrixPointer<Element = T, Order = ColumnMajor>,
        PA: MatrixPointer<Element = T>,
    {
        unsafe { self.trmm_right_partial(alpha, b, a, uplo, unit, Self::ROWS, N) };
    }

    /// `R(0..m, 0..n) += alpha * B(0..m, 0..n) * A(0..n, 0..n)`, `A` triangular.
    ///
    /// Reads `A` like [`RegisterMatrix::trmm_left_partial`] does.
    ///
    /// # Safety
    ///
    /// `b` must address a readable `m x n` window and `a` the referenced
    /// triangle of an `n x n` matrix.
    #[inline(always)]
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn trmm_right_partial<PB, PA>(
        &mut self,
        alpha: T,
        b: PB,
        a: PA,
        uplo: UpLo,
        unit: bool,
        m: usize,
        n: usize,
    ) where
        PB: MatrixPointer<Element = T, Order = ColumnMajor>,
        PA: MatrixPointer<Element = T>,
    {
        let ss = Self::SS;
        let n = n.min(N);
        let regs = Self::registers_for(m);
        let alpha_v = T::Simd::splat(alpha);
        let mut bx = [T::Simd::zero(); RM];
        for k in 0..n {
            for (r, x) in bx.iter_mut().enumerate().take(regs) {
                let q = b.offset(r * ss, k);
                let col = if (r + 1) * ss <= m {
                    unsafe { q.load() }
                } else {
                    unsafe { q.masked_load(Self::rows_below(r, m)) }
                };
                *x = alpha_v.mul(col);
            }
            // Columns j of A with a nonzero in row k.
            let (lo, hi) = match uplo {
                UpLo::Lower => (0, k + 1),
                UpLo::Upper => (k, n),
            };
            for j in lo..hi {
                let a_kj = if unit && j == k {
                    T::Simd::splat(T::one())
                } else {
                    unsafe { a.offset(k, j).broadcast() }
                };
                for r in 0..regs {
                    self.v[r][j] = T::Simd::fmadd(bx[r], a_kj, self.v[r][j]);
                }
            }
        }
    }

    /// `R += alpha * A * B`, `A` upper triangular with a non-unit diagonal.
    ///
    /// # Safety
    ///
    /// See [`RegisterMatrix::trmm_left_partial`].
    #[inline(always)]
    pub unsafe fn trmm_left_upper<PA, PB>(&mut self, alpha: T, a: PA, b: PB)
    where
        PA: MatrixPointer<Element = T>,
        PB: MatrixPointer<Element = T>,
    {
        unsafe { self.trmm_left(alpha, a, UpLo::Upper, false, b) };
    }

    /// `R += alpha * B * A`, `A` lower triangular with a non-unit diagonal.
    ///
    /// # Safety
    ///
    /// See [`RegisterMatrix::trmm_right_partial`].
    #[inline(always)]
    pub unsafe fn trmm_right_lower<PB, PA>(&mut self, alpha: T, b: PB, a: PA)
    where
        PB: MatrixPointer<Element = T, Order = ColumnMajor>,
        PA: MatrixPointer<Element = T>,
    {
        unsafe { self.trmm_right(alpha, b, a, UpLo::Lower, false) };
    }
}
