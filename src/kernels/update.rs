use super::RegisterMatrix;
use crate::pointer::{ColumnMajor, MatrixPointer};
use crate::simd::{Scalar, SimdVec};

impl<T: Scalar, const RM: usize, const N: usize> RegisterMatrix<T, RM, N> {
    /// `R *= alpha`.
    #[inline(always)]
    pub fn scale(&mut self, alpha: T) {
        let alpha = T::Simd::splat(alpha);
        for row in self.v.iter_mut() {
            for x in row.iter_mut() {
                *x = x.mul(alpha);
            }
        }
    }

    /// `R += beta * A`.
    ///
    /// # Safety
    ///
    /// `p` must address a readable `ROWS x N` window.
    #[inline(always)]
    pub unsafe fn axpy<P>(&mut self, beta: T, p: P)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        let beta = T::Simd::splat(beta);
        for j in 0..N {
            for r in 0..RM {
                let x = unsafe { p.offset(r * Self::SS, j).load() };
                self.v[r][j] = T::Simd::fmadd(beta, x, self.v[r][j]);
            }
        }
    }

    /// `R(0..m, 0..n) += beta * A(0..m, 0..n)`.
    ///
    /// # Safety
    ///
    /// `p` must address a readable `m x n` window.
    #[inline(always)]
    pub unsafe fn axpy_partial<P>(&mut self, beta: T, p: P, m: usize, n: usize)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        let beta = T::Simd::splat(beta);
        let regs = Self::registers_for(m);
        for j in 0..n.min(N) {
            for r in 0..regs {
                let x = unsafe { p.offset(r * Self::SS, j).masked_load(Self::rows_below(r, m)) };
                self.v[r][j] = T::Simd::fmadd(beta, x, self.v[r][j]);
            }
        }
    }

    /// Rank-1 update `R(i, j) += alpha * a(i) * b(j)`.
    ///
    /// `a` is read as a column (`ROWS` contiguous elements), `b` as a row
    /// (`N` elements at `b.offset(0, j)`, broadcast one at a time).
    ///
    /// # Safety
    ///
    /// `a` must address `ROWS` readable rows and `b` `N` readable columns.
    #[inline(always)]
    pub unsafe fn ger<PA, PB>(&mut self, alpha: T, a: PA, b: PB)
    where
        PA: MatrixPointer<Element = T, Order = ColumnMajor>,
        PB: MatrixPointer<Element = T>,
    {
        let alpha = T::Simd::splat(alpha);
        let mut ax = [T::Simd::zero(); RM];
        for (r, x) in ax.iter_mut().enumerate() {
            *x = alpha.mul(unsafe { a.offset(r * Self::SS, 0).load() });
        }
        for j in 0..N {
            let bx = unsafe { b.offset(0, j).broadcast() };
            for r in 0..RM {
                self.v[r][j] = T::Simd::fmadd(ax[r], bx, self.v[r][j]);
            }
        }
    }

    /// Rank-1 update restricted to `R(0..m, 0..n)`.
    ///
    /// Only `a(0..m)` and `b(0..n)` are read.
    ///
    /// # Safety
    ///
    /// `a` must address `m` readable rows and `b` `n` readable columns.
    #[inline(always)]
    pub unsafe fn ger_partial<PA, PB>(&mut self, alpha: T, a: PA, b: PB, m: usize, n: usize)
    where
        PA: MatrixPointer<Element = T, Order = ColumnMajor>,
        PB: MatrixPointer<Element = T>,
    {
        let alpha = T::Simd::splat(alpha);
        let regs = Self::registers_for(m);
        let mut ax = [T::Simd::zero(); RM];
        for (r, x) in ax.iter_mut().enumerate().take(regs) {
            let q = a.offset(r * Self::SS, 0);
            let col = if (r + 1) * Self::SS <= m {
                unsafe { q.load() }
            } else {
                unsafe { q.masked_load(Self::rows_below(r, m)) }
            };
            *x = alpha.mul(col);
        }
        for j in 0..n.min(N) {
            let bx = unsafe { b.offset(0, j).broadcast() };
            for r in 0..regs {
                self.v[r][j] = T::Simd::fmadd(ax[r], bx, self.v[r][j]);
            }
        }
    }

    /// `R += alpha * A * B` with `A` of size `ROWS x k` and `B` of size `k x N`.
    ///
    /// Accumulates `k` rank-1 updates in order, walking `A` right and `B`
    /// down.
    ///
    /// # Safety
    ///
    /// `a` must address a readable `ROWS x k` window and `b` a `k x N` one.
    #[inline(always)]
    pub unsafe fn gemm<PA, PB>(&mut self, k: usize, alpha: T, mut a: PA, mut b: PB)
    where
        PA: MatrixPointer<Element = T, Order = ColumnMajor>,
        PB: MatrixPointer<Element = T>,
    {
        for _ in 0..k {
            unsafe { self.ger(alpha, a, b) };
            a.hmove(1);
            b.vmove(1);
        }
    }

    /// `R(0..m, 0..n) += alpha * A(0..m, 0..k) * B(0..k, 0..n)`.
    ///
    /// # Safety
    ///
    /// `a` must address a readable `m x k` window and `b` a `k x n` one.
    #[inline(always)]
    pub unsafe fn gemm_partial<PA, PB>(&mut self, k: usize, alpha: T, mut a: PA, mut b: PB, m: usize, n: usize)
    where
        PA: MatrixPointer<Element = T, Order = ColumnMajor>,
        PB: MatrixPointer<Element = T>,
    {
        for _ in 0..k {
            unsafe { self.ger_partial(alpha, a, b, m, n) };
            a.hmove(1);
            b.vmove(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::kernels::RegisterMatrix;
    use crate::matrix::{DynamicMatrix, Matrix, MatrixMut};
    use crate::pointer::RowMajor;

    #[test]
    fn test_gemm_small_integers() {
        // 4x3 times 3x4, exact in floating point.
        let a = DynamicMatrix::<f64>::from_fn(4, 3, |i, j| (i + 2 * j) as f64);
        let b = DynamicMatrix::<f64, RowMajor>::from_fn(3, 4, |i, j| (3 * i + j) as f64 - 4.0);
        let mut ker = RegisterMatrix::<f64, 1, 4>::new();
        unsafe { ker.gemm(3, 1.0, a.ptr(0, 0), b.ptr(0, 0)) };
        for i in 0..4 {
            for j in 0..4 {
                let expected: f64 = (0..3).map(|k| a[(i, k)] * b[(k, j)]).sum();
                assert_eq!(ker.get(i, j), expected);
            }
        }
    }

    #[test]
    fn test_gemm_partial_leaves_outside_untouched() {
        let a = DynamicMatrix::<f64>::from_fn(6, 2, |i, j| (i * j + 1) as f64);
        let b = DynamicMatrix::<f64>::from_fn(2, 3, |i, j| (i + j) as f64);
        let mut ker = RegisterMatrix::<f64, 2, 4>::new();
        unsafe { ker.gemm_partial(2, 2.0, a.ptr(0, 0), b.ptr(0, 0), 6, 3) };
        for i in 0..8 {
            for j in 0..4 {
                let expected: f64 = if i < 6 && j < 3 {
                    2.0 * (0..2).map(|k| a[(i, k)] * b[(k, j)]).sum::<f64>()
                } else {
                    0.0
                };
                assert_eq!(ker.get(i, j), expected);
            }
        }
    }

    #[test]
    fn test_axpy_and_scale() {
        let a = DynamicMatrix::<f64>::from_fn(4, 2, |i, j| (i + j) as f64);
        let mut ker = RegisterMatrix::<f64, 1, 2>::new();
        unsafe {
            ker.axpy(2.0, a.ptr(0, 0));
            ker.axpy_partial(1.0, a.ptr(0, 0), 3, 1);
        }
        ker.scale(0.5);
        assert_eq!(ker.get(2, 0), 0.5 * (2.0 * 2.0 + 2.0));
        assert_eq!(ker.get(3, 0), 0.5 * (2.0 * 3.0));
        assert_eq!(ker.get(3, 1), 0.5 * (2.0 * 4.0));

        let mut d = DynamicMatrix::<f64>::new(4, 2);
        unsafe { ker.store(d.ptr_mut(0, 0)) };
        assert_eq!(d[(1, 1)], 2.0);
    }
}
