use super::RegisterMatrix;
use crate::pointer::{ColumnMajor, MatrixPointer};
use crate::simd::{Scalar, SimdVec};

impl<T: Scalar, const RM: usize, const N: usize> RegisterMatrix<T, RM, N> {
    /// `R = A`.
    ///
    /// # Safety
    ///
    /// `p` must address a readable `ROWS x N` window.
    #[inline(always)]
    pub unsafe fn load<P>(&mut self, p: P)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        for j in 0..N {
            for r in 0..RM {
                self.v[r][j] = unsafe { p.offset(r * Self::SS, j).load() };
            }
        }
    }

    /// `R = beta * A`. With `beta == 0` the block is zeroed and `A` is not
    /// read, so NaN or infinity in `A` does not leak through.
    ///
    /// # Safety
    ///
    /// `p` must address a readable `ROWS x N` window.
    #[inline(always)]
    pub unsafe fn load_scaled<P>(&mut self, beta: T, p: P)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        if beta == T::zero() {
            self.reset();
            return;
        }
        let beta = T::Simd::splat(beta);
        for j in 0..N {
            for r in 0..RM {
                self.v[r][j] = beta.mul(unsafe { p.offset(r * Self::SS, j).load() });
            }
        }
    }

    /// `R(0..m, 0..n) = beta * A(0..m, 0..n)`; the rest of `R` is left as is.
    /// As with [`RegisterMatrix::load_scaled`], `beta == 0` zeroes the window
    /// without reading `A`.
    ///
    /// Rows past `m` are masked off unless the pointer is padded and its
    /// current address is aligned, in which case the padding of the last
    /// register is read too (it is zero by the container contract).
    ///
    /// # Safety
    ///
    /// `p` must address a readable `m x n` window.
    #[inline(always)]
    pub unsafe fn load_partial<P>(&mut self, beta: T, p: P, m: usize, n: usize)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        let regs = Self::registers_for(m);
        if beta == T::zero() {
            for j in 0..n.min(N) {
                for r in 0..regs {
                    self.v[r][j] = T::Simd::zero();
                }
            }
            return;
        }
        let beta = T::Simd::splat(beta);
        for j in 0..n.min(N) {
            for r in 0..regs {
                let q = p.offset(r * Self::SS, j);
                let x = if (r + 1) * Self::SS <= m || (P::PADDED && q.is_aligned()) {
                    unsafe { q.load() }
                } else {
                    unsafe { q.masked_load(Self::rows_below(r, m)) }
                };
                self.v[r][j] = beta.mul(x);
            }
        }
    }

    /// `A = R`.
    ///
    /// # Safety
    ///
    /// `p` must address a writable `ROWS x N` window.
    #[inline(always)]
    pub unsafe fn store<P>(&self, p: P)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        for j in 0..N {
            for r in 0..RM {
                unsafe { p.offset(r * Self::SS, j).store(self.v[r][j]) };
            }
        }
    }

    /// `A(0..m, 0..n) = R(0..m, 0..n)`. Nothing outside the window is written.
    ///
    /// # Safety
    ///
    /// `p` must address a writable `m x n` window.
    #[inline(always)]
    pub unsafe fn store_partial<P>(&self, p: P, m: usize, n: usize)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        let regs = Self::registers_for(m);
        for j in 0..n.min(N) {
            for r in 0..regs {
                let q = p.offset(r * Self::SS, j);
                if (r + 1) * Self::SS <= m {
                    unsafe { q.store(self.v[r][j]) };
                } else {
                    unsafe { q.masked_store(Self::rows_below(r, m), self.v[r][j]) };
                }
            }
        }
    }

    /// Stores the elements on and below the diagonal (`i >= j`).
    ///
    /// # Safety
    ///
    /// `p` must address a writable `ROWS x N` window.
    #[inline(always)]
    pub unsafe fn store_lower<P>(&self, p: P)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        unsafe { self.store_lower_partial(p, Self::ROWS, N) };
    }

    /// Stores the elements of the `m x n` window on and below the diagonal.
    ///
    /// # Safety
    ///
    /// `p` must address a writable `m x n` window.
    #[inline(always)]
    pub unsafe fn store_lower_partial<P>(&self, p: P, m: usize, n: usize)
    where
        P: MatrixPointer<Element = T, Order = ColumnMajor>,
    {
        let ss = Self::SS;
        let regs = Self::registers_for(m);
        for j in 0..n.min(N) {
            for r in j / ss..regs {
                let q = p.offset(r * ss, j);
                if r * ss >= j && (r + 1) * ss <= m {
                    unsafe { q.store(self.v[r][j]) };
                } else {
                    unsafe { q.masked_store(Self::rows_between(r, j, m), self.v[r][j]) };
                }
            }
        }
    }
}
