use crate::pointer::{MatrixPointer, Order, StorageOrder};
use crate::simd::{REGISTER_CAPACITY, Scalar, SimdVec, lanes_below, lanes_between};

/// An `RM * SS` by `N` matrix block held in `RM * N` SIMD registers.
///
/// `RM` is the number of registers per column (1, 2 or 3 in the drivers),
/// each register holding `SS = T::SIMD_SIZE` consecutive rows. Element
/// `(i, j)` lives in lane `i % SS` of register `(i / SS, j)`.
///
/// ```
/// use regblas::{DynamicMatrix, Matrix, MatrixMut, RegisterMatrix};
///
/// let a = DynamicMatrix::<f64>::from_fn(4, 4, |i, j| (i + j) as f64);
/// let mut d = DynamicMatrix::<f64>::new(4, 4);
///
/// let mut ker = RegisterMatrix::<f64, 1, 4>::new();
/// unsafe {
///     ker.load(a.ptr(0, 0));
///     ker.scale(2.0);
///     ker.store(d.ptr_mut(0, 0));
/// }
/// assert_eq!(d[(3, 2)], 10.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RegisterMatrix<T: Scalar, const RM: usize, const N: usize> {
    pub(super) v: [[T::Simd; N]; RM],
}

impl<T: Scalar, const RM: usize, const N: usize> RegisterMatrix<T, RM, N> {
    pub(super) const SS: usize = T::SIMD_SIZE;

    /// Number of rows, `RM * SS`.
    pub const ROWS: usize = RM * T::SIMD_SIZE;

    /// Number of columns.
    pub const COLUMNS: usize = N;

    /// A zero block.
    #[inline(always)]
    pub fn new() -> Self {
        const {
            assert!(RM >= 1 && N >= 1, "register block must not be empty");
            assert!(RM * N <= REGISTER_CAPACITY, "register block exceeds the register file");
        }
        Self {
            v: [[T::Simd::zero(); N]; RM],
        }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        Self::ROWS
    }

    #[inline(always)]
    pub fn columns(&self) -> usize {
        N
    }

    /// Number of SIMD registers in use.
    #[inline(always)]
    pub fn registers(&self) -> usize {
        RM * N
    }

    #[inline(always)]
    pub fn simd_size(&self) -> usize {
        Self::SS
    }

    /// Element `(i, j)`.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.v[i / Self::SS][j].extract(i % Self::SS)
    }

    /// Overwrites element `(i, j)`.
    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let r = i / Self::SS;
        self.v[r][j] = self.v[r][j].replace(i % Self::SS, value);
    }

    /// Sets every element to zero.
    #[inline(always)]
    pub fn reset(&mut self) {
        for row in self.v.iter_mut() {
            for x in row.iter_mut() {
                *x = T::Simd::zero();
            }
        }
    }

    /// Number of registers per column that hold any of the first `m` rows.
    #[inline(always)]
    pub(super) fn registers_for(m: usize) -> usize {
        m.div_ceil(Self::SS).min(RM)
    }

    /// Lanes of register `r` that hold rows `< m`.
    #[inline(always)]
    pub(super) fn rows_below(r: usize, m: usize) -> <T::Simd as SimdVec>::Mask {
        lanes_below::<T::Simd>(m as i64 - (r * Self::SS) as i64)
    }

    /// Lanes of register `r` that hold rows in `lo..hi`.
    #[inline(always)]
    pub(super) fn rows_between(r: usize, lo: usize, hi: usize) -> <T::Simd as SimdVec>::Mask {
        let base = (r * Self::SS) as i64;
        lanes_between::<T::Simd>(lo as i64 - base, hi as i64 - base)
    }

    /// Rows `lo..hi` of column `k` of `a` that fall into register `r`,
    /// zero elsewhere. Other elements of `a` are not read.
    ///
    /// # Safety
    ///
    /// The addressed elements must be readable.
    #[inline(always)]
    pub(super) unsafe fn column_segment<P>(a: P, r: usize, k: usize, lo: usize, hi: usize) -> T::Simd
    where
        P: MatrixPointer<Element = T>,
    {
        let base = r * Self::SS;
        match <P::Order as StorageOrder>::ORDER {
            Order::ColumnMajor => unsafe { a.offset(base, k).masked_load(Self::rows_between(r, lo, hi)) },
            Order::RowMajor => {
                let mut x = T::Simd::zero();
                for lane in 0..Self::SS {
                    let i = base + lane;
                    if i >= lo && i < hi {
                        x = x.replace(lane, unsafe { a.offset(i, k).value() });
                    }
                }
                x
            }
        }
    }
}

impl<T: Scalar, const RM: usize, const N: usize> Default for RegisterMatrix<T, RM, N> {
    fn default() -> Self {
        Self::new()
    }
}
