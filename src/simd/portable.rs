//! Portable backend: plain arrays of `W` lanes.
//!
//! Used whenever the AVX2+FMA backend is not compiled in. Lane arithmetic
//! goes through `Float::mul_add`, so fused operations round once exactly like
//! the hardware FMA path.

use super::{Scalar, SimdIndex, SimdMask, SimdVec, is_aligned};

/// `W` lanes of `T`, aligned like a 256-bit register.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C, align(32))]
pub struct Portable<T, const W: usize>(pub [T; W]);

/// Boolean lane mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortableMask<const W: usize>(pub [bool; W]);

/// Integer lane vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortableIndex<const W: usize>(pub [i64; W]);

impl<const W: usize> SimdMask for PortableMask<W> {
    #[inline(always)]
    fn and(self, other: Self) -> Self {
        Self(std::array::from_fn(|l| self.0[l] && other.0[l]))
    }

    #[inline(always)]
    fn or(self, other: Self) -> Self {
        Self(std::array::from_fn(|l| self.0[l] || other.0[l]))
    }

    #[inline(always)]
    fn not(self) -> Self {
        Self(self.0.map(|b| !b))
    }

    #[inline(always)]
    fn test(self, lane: usize) -> bool {
        self.0[lane]
    }

    #[inline(always)]
    fn any(self) -> bool {
        self.0.iter().any(|&b| b)
    }
}

impl<const W: usize> SimdIndex for PortableIndex<W> {
    type Mask = PortableMask<W>;

    #[inline(always)]
    fn sequence() -> Self {
        Self(std::array::from_fn(|l| l as i64))
    }

    #[inline(always)]
    fn splat(value: i64) -> Self {
        Self([value; W])
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self(std::array::from_fn(|l| self.0[l] + other.0[l]))
    }

    #[inline(always)]
    fn lt(self, other: Self) -> PortableMask<W> {
        PortableMask(std::array::from_fn(|l| self.0[l] < other.0[l]))
    }

    #[inline(always)]
    fn ge(self, other: Self) -> PortableMask<W> {
        PortableMask(std::array::from_fn(|l| self.0[l] >= other.0[l]))
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: PortableMask<W>) -> Self {
        Self(std::array::from_fn(|l| if mask.0[l] { other.0[l] } else { self.0[l] }))
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> i64 {
        self.0[lane]
    }
}

impl<T: Scalar, const W: usize> Portable<T, W> {
    #[inline(always)]
    fn map2(self, other: Self, f: impl Fn(T, T) -> T) -> Self {
        Self(std::array::from_fn(|l| f(self.0[l], other.0[l])))
    }
}

impl<T: Scalar, const W: usize> SimdVec for Portable<T, W> {
    type Elem = T;
    type Mask = PortableMask<W>;
    type Index = PortableIndex<W>;

    const SIZE: usize = W;

    #[inline(always)]
    fn zero() -> Self {
        Self([T::zero(); W])
    }

    #[inline(always)]
    fn splat(value: T) -> Self {
        Self([value; W])
    }

    #[inline(always)]
    unsafe fn load(src: *const T, aligned: bool) -> Self {
        debug_assert!(!aligned || is_aligned::<Self>(src), "misaligned vector load");
        // SAFETY: the caller guarantees `W` readable elements at `src`.
        Self(std::array::from_fn(|l| unsafe { *src.add(l) }))
    }

    #[inline(always)]
    unsafe fn masked_load(src: *const T, mask: PortableMask<W>) -> Self {
        // SAFETY: only lanes selected by `mask` are dereferenced.
        Self(std::array::from_fn(|l| if mask.0[l] { unsafe { *src.add(l) } } else { T::zero() }))
    }

    #[inline(always)]
    unsafe fn broadcast(src: *const T) -> Self {
        // SAFETY: the caller guarantees `src` is readable.
        Self([unsafe { *src }; W])
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut T, aligned: bool) {
        debug_assert!(!aligned || is_aligned::<Self>(dst), "misaligned vector store");
        for (l, &x) in self.0.iter().enumerate() {
            // SAFETY: the caller guarantees `W` writable elements at `dst`.
            unsafe { *dst.add(l) = x };
        }
    }

    #[inline(always)]
    unsafe fn masked_store(self, dst: *mut T, mask: PortableMask<W>) {
        for (l, &x) in self.0.iter().enumerate() {
            if mask.0[l] {
                // SAFETY: only lanes selected by `mask` are written.
                unsafe { *dst.add(l) = x };
            }
        }
    }

    #[inline(always)]
    fn fmadd(a: Self, b: Self, c: Self) -> Self {
        Self(std::array::from_fn(|l| a.0[l].mul_add(b.0[l], c.0[l])))
    }

    #[inline(always)]
    fn fnmadd(a: Self, b: Self, c: Self) -> Self {
        Self(std::array::from_fn(|l| (-a.0[l]).mul_add(b.0[l], c.0[l])))
    }

    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        self.map2(other, |x, y| x * y)
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self.map2(other, |x, y| x + y)
    }

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        self.map2(other, |x, y| x - y)
    }

    #[inline(always)]
    fn div(self, other: Self) -> Self {
        self.map2(other, |x, y| x / y)
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self(self.0.map(|x| -x))
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self(self.0.map(|x| x.abs()))
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        self.map2(other, |x, y| if y > x { y } else { x })
    }

    #[inline(always)]
    fn hmax(self) -> T {
        self.0
            .iter()
            .skip(1)
            .fold(self.0[0], |acc, &x| if x > acc { x } else { acc })
    }

    #[inline(always)]
    fn gt(self, other: Self) -> PortableMask<W> {
        PortableMask(std::array::from_fn(|l| self.0[l] > other.0[l]))
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: PortableMask<W>) -> Self {
        Self(std::array::from_fn(|l| if mask.0[l] { other.0[l] } else { self.0[l] }))
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> T {
        self.0[lane]
    }

    #[inline(always)]
    fn replace(mut self, lane: usize, value: T) -> Self {
        self.0[lane] = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::lanes_below;

    type P4 = Portable<f64, 4>;

    #[test]
    fn test_masked_load_does_not_read_past_mask() {
        // Only three elements exist; lane 3 must not be touched.
        let data = [1.0, 2.0, 3.0];
        let v = unsafe { P4::masked_load(data.as_ptr(), lanes_below::<P4>(3)) };
        assert_eq!(v.0, [1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_fnmadd_single_rounding() {
        let a = P4::splat(0.1);
        let b = P4::splat(10.0);
        let c = P4::splat(1.0);
        assert_eq!(P4::fnmadd(a, b, c).0[0], (-0.1f64).mul_add(10.0, 1.0));
    }

    #[test]
    fn test_aligned_load() {
        let buf = Portable::<f32, 8>([1.0; 8]);
        let v = unsafe { Portable::<f32, 8>::load(buf.0.as_ptr(), true) };
        assert_eq!(v, buf);
    }

    #[test]
    fn test_index_blend() {
        let a = PortableIndex::<4>::sequence();
        let b = PortableIndex::<4>::splat(9);
        let mask = PortableMask([false, true, false, true]);
        assert_eq!(a.blend(b, mask).0, [0, 9, 2, 9]);
        assert_eq!(mask.not().0, [true, false, true, false]);
        assert!(mask.or(mask.not()).0.iter().all(|&x| x));
    }
}
