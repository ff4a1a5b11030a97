//! SIMD vector abstraction.
//!
//! Every kernel in this crate is written against [`SimdVec`], never against
//! raw intrinsics. The backend is chosen at compile time:
//!
//! | Target | `f64` vector | `f32` vector |
//! |---|---|---|
//! | x86_64 with `avx2` + `fma` enabled | [`avx2::F64x4`] | [`avx2::F32x8`] |
//! | anything else | [`portable::Portable<f64, 4>`] | [`portable::Portable<f32, 8>`] |
//!
//! Both backends share the same lane counts so tile shapes, and therefore
//! rounding behaviour, do not depend on the build flags. Build with
//! `RUSTFLAGS="-C target-cpu=native"` to get the AVX2 path.

#[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
pub mod avx2;
pub mod portable;

use std::fmt::Debug;

use num_traits::{Float, NumAssign};

/// Number of architectural vector registers the kernels may occupy.
///
/// Register-block shapes are checked against this at compile time.
pub const REGISTER_CAPACITY: usize = 16;

/// `true` when the AVX2+FMA backend was compiled in.
pub const HAS_AVX2: bool = cfg!(all(
    target_arch = "x86_64",
    target_feature = "avx2",
    target_feature = "fma"
));

/// Element types the kernels can work with (`f32`, `f64`).
pub trait Scalar: Float + NumAssign + Default + Debug + Send + Sync + 'static {
    /// Vector type holding [`Scalar::SIMD_SIZE`] lanes of `Self`.
    type Simd: SimdVec<Elem = Self>;

    /// Lane count of [`Scalar::Simd`].
    const SIMD_SIZE: usize = <Self::Simd as SimdVec>::SIZE;
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
impl Scalar for f64 {
    type Simd = avx2::F64x4;
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
impl Scalar for f32 {
    type Simd = avx2::F32x8;
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma")))]
impl Scalar for f64 {
    type Simd = portable::Portable<f64, 4>;
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma")))]
impl Scalar for f32 {
    type Simd = portable::Portable<f32, 8>;
}

/// Lane mask produced by comparisons and consumed by masked loads/stores.
pub trait SimdMask: Copy + Debug {
    /// Lane-wise AND.
    fn and(self, other: Self) -> Self;

    /// Lane-wise OR.
    fn or(self, other: Self) -> Self;

    /// Lane-wise NOT.
    fn not(self) -> Self;

    /// Whether lane `lane` is set.
    fn test(self, lane: usize) -> bool;

    /// Whether any lane is set.
    fn any(self) -> bool;
}

/// Integer vector with the same lane count as its floating-point partner.
///
/// Used to build masks from the lane sequence (`0, 1, 2, ...`) and to track
/// winning indices in [`SimdVec::imax`].
pub trait SimdIndex: Copy + Debug {
    type Mask: SimdMask;

    /// `(0, 1, ..., SIZE - 1)`.
    fn sequence() -> Self;

    fn splat(value: i64) -> Self;

    /// Lane-wise `self + other` (the `+=` of the index vector).
    fn add(self, other: Self) -> Self;

    /// Lane-wise `self < other`.
    fn lt(self, other: Self) -> Self::Mask;

    /// Lane-wise `self >= other`.
    fn ge(self, other: Self) -> Self::Mask;

    /// Lanes of `other` where `mask` is set, lanes of `self` elsewhere.
    fn blend(self, other: Self, mask: Self::Mask) -> Self;

    fn extract(self, lane: usize) -> i64;
}

/// A hardware vector register of [`SimdVec::SIZE`] lanes.
///
/// Memory operations are `unsafe`: the caller guarantees the addressed lanes
/// are valid. Masked operations never touch memory of masked-off lanes.
pub trait SimdVec: Copy + Debug {
    type Elem: Scalar;
    type Mask: SimdMask;
    type Index: SimdIndex<Mask = Self::Mask>;

    const SIZE: usize;

    fn zero() -> Self;

    fn splat(value: Self::Elem) -> Self;

    /// Loads `SIZE` contiguous elements.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reading `SIZE` elements. If `aligned` is true
    /// it must also be aligned to the vector width; this is checked by a
    /// debug assertion only.
    unsafe fn load(src: *const Self::Elem, aligned: bool) -> Self;

    /// Loads lanes selected by `mask`; the other lanes are zero.
    ///
    /// # Safety
    ///
    /// `src.add(lane)` must be readable for every set lane.
    unsafe fn masked_load(src: *const Self::Elem, mask: Self::Mask) -> Self;

    /// Every lane equal to `*src`.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reading one element.
    unsafe fn broadcast(src: *const Self::Elem) -> Self;

    /// Stores `SIZE` contiguous elements.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writing `SIZE` elements, and aligned to the
    /// vector width if `aligned` is true.
    unsafe fn store(self, dst: *mut Self::Elem, aligned: bool);

    /// Stores the lanes selected by `mask`.
    ///
    /// # Safety
    ///
    /// `dst.add(lane)` must be writable for every set lane.
    unsafe fn masked_store(self, dst: *mut Self::Elem, mask: Self::Mask);

    /// `a * b + c` with a single rounding.
    fn fmadd(a: Self, b: Self, c: Self) -> Self;

    /// `c - a * b` with a single rounding.
    fn fnmadd(a: Self, b: Self, c: Self) -> Self;

    fn mul(self, other: Self) -> Self;
    fn add(self, other: Self) -> Self;
    fn sub(self, other: Self) -> Self;
    fn div(self, other: Self) -> Self;
    fn neg(self) -> Self;
    fn abs(self) -> Self;

    /// Lane-wise maximum.
    fn max(self, other: Self) -> Self;

    /// Maximum across all lanes.
    fn hmax(self) -> Self::Elem;

    /// Lane-wise `self > other`.
    fn gt(self, other: Self) -> Self::Mask;

    /// Lanes of `other` where `mask` is set, lanes of `self` elsewhere.
    fn blend(self, other: Self, mask: Self::Mask) -> Self;

    fn extract(self, lane: usize) -> Self::Elem;

    fn replace(self, lane: usize, value: Self::Elem) -> Self;

    /// Vertical max with index tracking.
    ///
    /// Per lane, keeps `(self, index)` unless `other` is strictly greater, in
    /// which case `(other, other_index)` wins. Ties keep the first operand, so
    /// feeding indices in increasing order tracks the lowest winning index.
    fn imax(self, index: Self::Index, other: Self, other_index: Self::Index) -> (Self, Self::Index) {
        let mask = other.gt(self);
        (self.blend(other, mask), index.blend(other_index, mask))
    }

    /// Horizontal maximum together with the lowest index holding it.
    fn hmax_index(self, index: Self::Index) -> (Self::Elem, i64) {
        let mut best = self.extract(0);
        let mut best_index = index.extract(0);
        for lane in 1..Self::SIZE {
            let value = self.extract(lane);
            let value_index = index.extract(lane);
            if value > best || (value == best && value_index < best_index) {
                best = value;
                best_index = value_index;
            }
        }
        (best, best_index)
    }
}

/// Mask selecting lanes `0..n` (all lanes when `n >= SIZE`, none when `n <= 0`).
#[inline(always)]
pub fn lanes_below<V: SimdVec>(n: i64) -> V::Mask {
    V::Index::sequence().lt(V::Index::splat(n))
}

/// Mask selecting lanes in `lo..hi`. Bounds may fall outside `0..SIZE`.
#[inline(always)]
pub fn lanes_between<V: SimdVec>(lo: i64, hi: i64) -> V::Mask {
    let seq = V::Index::sequence();
    seq.ge(V::Index::splat(lo)).and(seq.lt(V::Index::splat(hi)))
}

/// Whether `ptr` is aligned to the width of `V`.
#[inline(always)]
pub fn is_aligned<V: SimdVec>(ptr: *const V::Elem) -> bool {
    (ptr as usize) % (V::SIZE * std::mem::size_of::<V::Elem>()) == 0
}
