use super::{RegisterMatrix, Side, UpLo};
use crate::pointer::MatrixPointer;
use crate::simd::{Scalar, SimdVec};

impl<T: Scalar, const RM: usize, const N: usize> RegisterMatrix<T, RM, N> {
    /// In-place Cholesky factorization of the block.
    ///
    /// Treats the block as the leading `N` columns of a symmetric matrix whose
    /// lower triangle is stored: on exit the top `N x N` part holds the lower
    /// Cholesky factor and the rows below hold the matching panel
    /// `A21 * L11^-T`. Entries above the diagonal are garbage and must be
    /// written back with [`RegisterMatrix::store_lower`].
    ///
    /// A block that is not positive definite yields NaN or infinity.
    #[inline(always)]
    pub fn potrf(&mut self) {
        const {
            assert!(RM * T::SIMD_SIZE >= N, "potrf needs at least as many rows as columns");
        }
        let ss = Self::SS;
        for k in 0..N {
            let kr = k / ss;
            for j in 0..k {
                let a_kj = T::Simd::splat(self.get(k, j));
                for r in kr..RM {
                    self.v[r][k] = T::Simd::fnmadd(a_kj, self.v[r][j], self.v[r][k]);
                }
            }
            let d = T::Simd::splat(self.get(k, k).sqrt());
            for r in 0..kr {
                self.v[r][k] = T::Simd::zero();
            }
            for r in kr..RM {
                self.v[r][k] = self.v[r][k].div(d);
            }
        }
    }

    /// Triangular solve against the whole block.
    ///
    /// See [`RegisterMatrix::trsm_partial`].
    ///
    /// # Safety
    ///
    /// `a` must address the referenced triangle of a `ROWS x ROWS` (left) or
    /// `N x N` (right) matrix.
    #[inline(always)]
    pub unsafe fn trsm<P>(&mut self, side: Side, uplo: UpLo, unit: bool, a: P)
    where
        P: MatrixPointer<Element = T>,
    {
        unsafe { self.trsm_partial(side, uplo, unit, a, Self::ROWS, N) };
    }

    /// Triangular solve in place on the `m x n` window.
    ///
    /// On entry the block holds `B`; on exit it holds `X` with
    /// `A * X = B` ([`Side::Left`], `A` is `m x m`) or `X * A = B`
    /// ([`Side::Right`], `A` is `n x n`). Only the diagonal and the `uplo`
    /// triangle of `A` are read; with `unit` the diagonal is taken as one and
    /// not read at all.
    ///
    /// # Safety
    ///
    /// `a` must address the referenced elements of the triangular operand.
    #[inline(always)]
    pub unsafe fn trsm_partial<P>(&mut self, side: Side, uplo: UpLo, unit: bool, a: P, m: usize, n: usize)
    where
        P: MatrixPointer<Element = T>,
    {
        let m = m.min(Self::ROWS);
        let n = n.min(N);
        match side {
            Side::Right => unsafe { self.trsm_right(uplo, unit, a, n) },
            Side::Left => unsafe { self.trsm_left(uplo, unit, a, m, n) },
        }
    }

    /// `X * A = B`: columns are solved one after another, each one a
    /// vector operation over all rows.
    #[inline(always)]
    unsafe fn trsm_right<P>(&mut self, uplo: UpLo, unit: bool, a: P, n: usize)
    where
        P: MatrixPointer<Element = T>,
    {
        match uplo {
            UpLo::Upper => {
                for j in 0..n {
                    for k in 0..j {
                        let a_kj = unsafe { a.offset(k, j).broadcast() };
                        for r in 0..RM {
                            self.v[r][j] = T::Simd::fnmadd(a_kj, self.v[r][k], self.v[r][j]);
                        }
                    }
                    if !unit {
                        let d = unsafe { a.offset(j, j).broadcast() };
                        for r in 0..RM {
                            self.v[r][j] = self.v[r][j].div(d);
                        }
                    }
                }
            }
            UpLo::Lower => {
                for j in (0..n).rev() {
                    for k in j + 1..n {
                        let a_kj = unsafe { a.offset(k, j).broadcast() };
                        for r in 0..RM {
                            self.v[r][j] = T::Simd::fnmadd(a_kj, self.v[r][k], self.v[r][j]);
                        }
                    }
                    if !unit {
                        let d = unsafe { a.offset(j, j).broadcast() };
                        for r in 0..RM {
                            self.v[r][j] = self.v[r][j].div(d);
                        }
                    }
                }
            }
        }
    }

    /// `A * X = B`: rows are solved one after another; once row `k` is known
    /// its contribution is eliminated from the remaining rows with one masked
    /// column of `A` per register.
    #[inline(always)]
    unsafe fn trsm_left<P>(&mut self, uplo: UpLo, unit: bool, a: P, m: usize, n: usize)
    where
        P: MatrixPointer<Element = T>,
    {
        let ss = Self::SS;
        let mut x = [T::zero(); N];
        let solve_row = |ker: &mut Self, k: usize, x: &mut [T; N]| {
            let d = if unit { T::one() } else { unsafe { a.offset(k, k).value() } };
            for (j, xj) in x.iter_mut().enumerate().take(n) {
                *xj = ker.get(k, j) / d;
                ker.set(k, j, *xj);
            }
        };
        match uplo {
            UpLo::Lower => {
                for k in 0..m {
                    solve_row(self, k, &mut x);
                    for r in k / ss..Self::registers_for(m) {
                        let col = unsafe { Self::column_segment(a, r, k, k + 1, m) };
                        for j in 0..n {
                            self.v[r][j] = T::Simd::fnmadd(col, T::Simd::splat(x[j]), self.v[r][j]);
                        }
                    }
                }
            }
            UpLo::Upper => {
                for k in (0..m).rev() {
                    solve_row(self, k, &mut x);
                    for r in 0..k.div_ceil(ss) {
                        let col = unsafe { Self::column_segment(a, r, k, 0, k) };
                        for j in 0..n {
                            self.v[r][j] = T::Simd::fnmadd(col, T::Simd::splat(x[j]), self.v[r][j]);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::kernels::{RegisterMatrix, Side, UpLo};
    use crate::matrix::{DynamicMatrix, Matrix, MatrixMut};
    use crate::pointer::MatrixPointer;
    use crate::simd::Scalar;

    #[test]
    fn test_potrf_3x3() {
        let a = DynamicMatrix::<f64>::from_row_slice(3, 3, &[4.0, 2.0, 2.0, 2.0, 5.0, 1.0, 2.0, 1.0, 6.0]);
        let mut l = DynamicMatrix::<f64>::new(3, 3);
        let mut ker = RegisterMatrix::<f64, 1, 4>::new();
        unsafe {
            ker.load_partial(1.0, a.ptr(0, 0), 3, 3);
            ker.potrf();
            ker.store_lower_partial(l.ptr_mut(0, 0), 3, 3);
        }
        // Hand-computed factor.
        let expected = [
            [2.0, 0.0, 0.0],
            [1.0, 2.0, 0.0],
            [1.0, 0.0, 5.0f64.sqrt()],
        ];
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(l[(i, j)], expected[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_potrf_tall_block() {
        // 8x4 block: top 4x4 factor plus the panel below it.
        let ss = f64::SIMD_SIZE;
        let m = 2 * ss;
        let r = DynamicMatrix::<f64>::from_fn(m, m, |i, j| ((i * 7 + j * 3) % 5) as f64 - 2.0);
        let a = DynamicMatrix::<f64>::from_fn(m, m, |i, j| {
            (0..m).map(|k| r[(i, k)] * r[(j, k)]).sum::<f64>() + if i == j { m as f64 } else { 0.0 }
        });
        let mut ker = RegisterMatrix::<f64, 2, 4>::new();
        let mut l = DynamicMatrix::<f64>::new(m, 4);
        unsafe {
            ker.load(a.ptr(0, 0));
            ker.potrf();
            ker.store_lower(l.ptr_mut(0, 0));
        }
        // L * L^T reproduces the leading columns of A.
        for i in 0..m {
            for j in 0..4.min(i + 1) {
                let s: f64 = (0..=j).map(|k| l[(i, k)] * l[(j, k)]).sum();
                assert_abs_diff_eq!(s, a[(i, j)], epsilon = 1e-10);
            }
        }
        assert_eq!(l[(0, 1)], 0.0);
    }

    fn triangular(n: usize, uplo: UpLo) -> DynamicMatrix<f64> {
        DynamicMatrix::from_fn(n, n, |i, j| {
            let inside = match uplo {
                UpLo::Lower => i >= j,
                UpLo::Upper => i <= j,
            };
            if i == j {
                4.0 + i as f64
            } else if inside {
                ((i + 2 * j) % 3) as f64 - 1.0
            } else {
                // Never referenced: poison it.
                f64::NAN
            }
        })
    }

    #[test]
    fn test_trsm_all_variants() {
        let (m, n) = (7, 3);
        let b = DynamicMatrix::<f64>::from_fn(m, n, |i, j| (i as f64) - 0.5 * (j as f64));
        for side in [Side::Left, Side::Right] {
            for uplo in [UpLo::Lower, UpLo::Upper] {
                for unit in [false, true] {
                    let size = if side == Side::Left { m } else { n };
                    let a = triangular(size, uplo);
                    let mut ker = RegisterMatrix::<f64, 2, 4>::new();
                    let mut x = DynamicMatrix::<f64>::new(m, n);
                    unsafe {
                        ker.load_partial(1.0, b.ptr(0, 0), m, n);
                        ker.trsm_partial(side, uplo, unit, a.ptr(0, 0), m, n);
                        ker.store_partial(x.ptr_mut(0, 0), m, n);
                    }
                    let at = |i: usize, k: usize| -> f64 {
                        if i == k {
                            if unit { 1.0 } else { a[(i, k)] }
                        } else if (uplo == UpLo::Lower && i > k) || (uplo == UpLo::Upper && i < k) {
                            a[(i, k)]
                        } else {
                            0.0
                        }
                    };
                    for i in 0..m {
                        for j in 0..n {
                            let back: f64 = match side {
                                Side::Left => (0..m).map(|k| at(i, k) * x[(k, j)]).sum(),
                                Side::Right => (0..n).map(|k| x[(i, k)] * at(k, j)).sum(),
                            };
                            assert_abs_diff_eq!(back, b[(i, j)], epsilon = 1e-10);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_trsm_right_upper_transposed_operand() {
        // The Cholesky driver solves X * L^T = B through a transposed pointer.
        let l = triangular(4, UpLo::Lower);
        let b = DynamicMatrix::<f64>::from_fn(4, 4, |i, j| (i * 4 + j) as f64);
        let mut ker = RegisterMatrix::<f64, 1, 4>::new();
        let mut x = DynamicMatrix::<f64>::new(4, 4);
        unsafe {
            ker.load(b.ptr(0, 0));
            ker.trsm(Side::Right, UpLo::Upper, false, l.ptr(0, 0).trans());
            ker.store(x.ptr_mut(0, 0));
        }
        for i in 0..4 {
            for j in 0..4 {
                let back: f64 = (0..=j).map(|k| x[(i, k)] * l[(j, k)]).sum();
                assert_abs_diff_eq!(back, b[(i, j)], epsilon = 1e-10);
            }
        }
    }
}
