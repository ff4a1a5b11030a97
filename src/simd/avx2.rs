//! AVX2 + FMA backend (`__m256d` / `__m256`).
//!
//! Only compiled when both target features are enabled for the whole build,
//! so the intrinsics below are always available and need no runtime check.

#![allow(unused_unsafe)]

use std::arch::x86_64::*;
use std::fmt;

use super::{SimdIndex, SimdMask, SimdVec, is_aligned};

/// Four `f64` lanes.
#[derive(Clone, Copy)]
pub struct F64x4(pub __m256d);

/// Eight `f32` lanes.
#[derive(Clone, Copy)]
pub struct F32x8(pub __m256);

/// All-ones / all-zeros lane mask for [`F64x4`].
#[derive(Clone, Copy)]
pub struct M64x4(pub __m256i);

/// All-ones / all-zeros lane mask for [`F32x8`].
#[derive(Clone, Copy)]
pub struct M32x8(pub __m256i);

/// Four `i64` index lanes.
#[derive(Clone, Copy)]
pub struct I64x4(pub __m256i);

/// Eight `i32` index lanes.
#[derive(Clone, Copy)]
pub struct I32x8(pub __m256i);

#[inline(always)]
fn to_i64(v: __m256i) -> [i64; 4] {
    let mut out = [0i64; 4];
    unsafe { _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, v) };
    out
}

#[inline(always)]
fn to_i32(v: __m256i) -> [i32; 8] {
    let mut out = [0i32; 8];
    unsafe { _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, v) };
    out
}

macro_rules! impl_mask {
    ($mask:ident, $lanes:ident) => {
        impl SimdMask for $mask {
            #[inline(always)]
            fn and(self, other: Self) -> Self {
                Self(unsafe { _mm256_and_si256(self.0, other.0) })
            }

            #[inline(always)]
            fn or(self, other: Self) -> Self {
                Self(unsafe { _mm256_or_si256(self.0, other.0) })
            }

            #[inline(always)]
            fn not(self) -> Self {
                Self(unsafe { _mm256_xor_si256(self.0, _mm256_set1_epi32(-1)) })
            }

            #[inline(always)]
            fn test(self, lane: usize) -> bool {
                $lanes(self.0)[lane] != 0
            }

            #[inline(always)]
            fn any(self) -> bool {
                unsafe { _mm256_testz_si256(self.0, self.0) == 0 }
            }
        }

        impl fmt::Debug for $mask {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let lanes = $lanes(self.0);
                f.debug_list().entries(lanes.iter().map(|&x| x != 0)).finish()
            }
        }
    };
}

impl_mask!(M64x4, to_i64);
impl_mask!(M32x8, to_i32);

impl SimdIndex for I64x4 {
    type Mask = M64x4;

    #[inline(always)]
    fn sequence() -> Self {
        Self(unsafe { _mm256_set_epi64x(3, 2, 1, 0) })
    }

    #[inline(always)]
    fn splat(value: i64) -> Self {
        Self(unsafe { _mm256_set1_epi64x(value) })
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self(unsafe { _mm256_add_epi64(self.0, other.0) })
    }

    #[inline(always)]
    fn lt(self, other: Self) -> M64x4 {
        M64x4(unsafe { _mm256_cmpgt_epi64(other.0, self.0) })
    }

    #[inline(always)]
    fn ge(self, other: Self) -> M64x4 {
        self.lt(other).not()
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: M64x4) -> Self {
        Self(unsafe { _mm256_blendv_epi8(self.0, other.0, mask.0) })
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> i64 {
        to_i64(self.0)[lane]
    }
}

impl SimdIndex for I32x8 {
    type Mask = M32x8;

    #[inline(always)]
    fn sequence() -> Self {
        Self(unsafe { _mm256_set_epi32(7, 6, 5, 4, 3, 2, 1, 0) })
    }

    #[inline(always)]
    fn splat(value: i64) -> Self {
        let value = value.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        Self(unsafe { _mm256_set1_epi32(value) })
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self(unsafe { _mm256_add_epi32(self.0, other.0) })
    }

    #[inline(always)]
    fn lt(self, other: Self) -> M32x8 {
        M32x8(unsafe { _mm256_cmpgt_epi32(other.0, self.0) })
    }

    #[inline(always)]
    fn ge(self, other: Self) -> M32x8 {
        self.lt(other).not()
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: M32x8) -> Self {
        Self(unsafe { _mm256_blendv_epi8(self.0, other.0, mask.0) })
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> i64 {
        to_i32(self.0)[lane] as i64
    }
}

impl fmt::Debug for I64x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("I64x4").field(&to_i64(self.0)).finish()
    }
}

impl fmt::Debug for I32x8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("I32x8").field(&to_i32(self.0)).finish()
    }
}

impl F64x4 {
    #[inline(always)]
    fn lanes(self) -> [f64; 4] {
        let mut out = [0.0; 4];
        unsafe { _mm256_storeu_pd(out.as_mut_ptr(), self.0) };
        out
    }
}

impl F32x8 {
    #[inline(always)]
    fn lanes(self) -> [f32; 8] {
        let mut out = [0.0; 8];
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), self.0) };
        out
    }
}

impl fmt::Debug for F64x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("F64x4").field(&self.lanes()).finish()
    }
}

impl fmt::Debug for F32x8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("F32x8").field(&self.lanes()).finish()
    }
}

impl SimdVec for F64x4 {
    type Elem = f64;
    type Mask = M64x4;
    type Index = I64x4;

    const SIZE: usize = 4;

    #[inline(always)]
    fn zero() -> Self {
        Self(unsafe { _mm256_setzero_pd() })
    }

    #[inline(always)]
    fn splat(value: f64) -> Self {
        Self(unsafe { _mm256_set1_pd(value) })
    }

    #[inline(always)]
    unsafe fn load(src: *const f64, aligned: bool) -> Self {
        debug_assert!(!aligned || is_aligned::<Self>(src), "misaligned vector load");
        if aligned {
            Self(unsafe { _mm256_load_pd(src) })
        } else {
            Self(unsafe { _mm256_loadu_pd(src) })
        }
    }

    #[inline(always)]
    unsafe fn masked_load(src: *const f64, mask: M64x4) -> Self {
        Self(unsafe { _mm256_maskload_pd(src, mask.0) })
    }

    #[inline(always)]
    unsafe fn broadcast(src: *const f64) -> Self {
        Self(unsafe { _mm256_broadcast_sd(&*src) })
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut f64, aligned: bool) {
        debug_assert!(!aligned || is_aligned::<Self>(dst), "misaligned vector store");
        if aligned {
            unsafe { _mm256_store_pd(dst, self.0) }
        } else {
            unsafe { _mm256_storeu_pd(dst, self.0) }
        }
    }

    #[inline(always)]
    unsafe fn masked_store(self, dst: *mut f64, mask: M64x4) {
        unsafe { _mm256_maskstore_pd(dst, mask.0, self.0) }
    }

    #[inline(always)]
    fn fmadd(a: Self, b: Self, c: Self) -> Self {
        Self(unsafe { _mm256_fmadd_pd(a.0, b.0, c.0) })
    }

    #[inline(always)]
    fn fnmadd(a: Self, b: Self, c: Self) -> Self {
        Self(unsafe { _mm256_fnmadd_pd(a.0, b.0, c.0) })
    }

    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Self(unsafe { _mm256_mul_pd(self.0, other.0) })
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self(unsafe { _mm256_add_pd(self.0, other.0) })
    }

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self(unsafe { _mm256_sub_pd(self.0, other.0) })
    }

    #[inline(always)]
    fn div(self, other: Self) -> Self {
        Self(unsafe { _mm256_div_pd(self.0, other.0) })
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self(unsafe { _mm256_xor_pd(self.0, _mm256_set1_pd(-0.0)) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self(unsafe { _mm256_andnot_pd(_mm256_set1_pd(-0.0), self.0) })
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        Self(unsafe { _mm256_max_pd(self.0, other.0) })
    }

    #[inline(always)]
    fn hmax(self) -> f64 {
        unsafe {
            let hi = _mm256_extractf128_pd::<1>(self.0);
            let lo = _mm256_castpd256_pd128(self.0);
            let m = _mm_max_pd(lo, hi);
            let m = _mm_max_sd(m, _mm_unpackhi_pd(m, m));
            _mm_cvtsd_f64(m)
        }
    }

    #[inline(always)]
    fn gt(self, other: Self) -> M64x4 {
        M64x4(unsafe { _mm256_castpd_si256(_mm256_cmp_pd::<_CMP_GT_OQ>(self.0, other.0)) })
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: M64x4) -> Self {
        Self(unsafe { _mm256_blendv_pd(self.0, other.0, _mm256_castsi256_pd(mask.0)) })
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> f64 {
        self.lanes()[lane]
    }

    #[inline(always)]
    fn replace(self, lane: usize, value: f64) -> Self {
        let mut lanes = self.lanes();
        lanes[lane] = value;
        Self(unsafe { _mm256_loadu_pd(lanes.as_ptr()) })
    }
}

impl SimdVec for F32x8 {
    type Elem = f32;
    type Mask = M32x8;
    type Index = I32x8;

    const SIZE: usize = 8;

    #[inline(always)]
    fn zero() -> Self {
        Self(unsafe { _mm256_setzero_ps() })
    }

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self(unsafe { _mm256_set1_ps(value) })
    }

    #[inline(always)]
    unsafe fn load(src: *const f32, aligned: bool) -> Self {
        debug_assert!(!aligned || is_aligned::<Self>(src), "misaligned vector load");
        if aligned {
            Self(unsafe { _mm256_load_ps(src) })
        } else {
            Self(unsafe { _mm256_loadu_ps(src) })
        }
    }

    #[inline(always)]
    unsafe fn masked_load(src: *const f32, mask: M32x8) -> Self {
        Self(unsafe { _mm256_maskload_ps(src, mask.0) })
    }

    #[inline(always)]
    unsafe fn broadcast(src: *const f32) -> Self {
        Self(unsafe { _mm256_broadcast_ss(&*src) })
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut f32, aligned: bool) {
        debug_assert!(!aligned || is_aligned::<Self>(dst), "misaligned vector store");
        if aligned {
            unsafe { _mm256_store_ps(dst, self.0) }
        } else {
            unsafe { _mm256_storeu_ps(dst, self.0) }
        }
    }

    #[inline(always)]
    unsafe fn masked_store(self, dst: *mut f32, mask: M32x8) {
        unsafe { _mm256_maskstore_ps(dst, mask.0, self.0) }
    }

    #[inline(always)]
    fn fmadd(a: Self, b: Self, c: Self) -> Self {
        Self(unsafe { _mm256_fmadd_ps(a.0, b.0, c.0) })
    }

    #[inline(always)]
    fn fnmadd(a: Self, b: Self, c: Self) -> Self {
        Self(unsafe { _mm256_fnmadd_ps(a.0, b.0, c.0) })
    }

    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Self(unsafe { _mm256_mul_ps(self.0, other.0) })
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self(unsafe { _mm256_add_ps(self.0, other.0) })
    }

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self(unsafe { _mm256_sub_ps(self.0, other.0) })
    }

    #[inline(always)]
    fn div(self, other: Self) -> Self {
        Self(unsafe { _mm256_div_ps(self.0, other.0) })
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self(unsafe { _mm256_xor_ps(self.0, _mm256_set1_ps(-0.0)) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self(unsafe { _mm256_andnot_ps(_mm256_set1_ps(-0.0), self.0) })
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        Self(unsafe { _mm256_max_ps(self.0, other.0) })
    }

    #[inline(always)]
    fn hmax(self) -> f32 {
        self.lanes()
            .iter()
            .skip(1)
            .fold(self.extract(0), |acc, &x| if x > acc { x } else { acc })
    }

    #[inline(always)]
    fn gt(self, other: Self) -> M32x8 {
        M32x8(unsafe { _mm256_castps_si256(_mm256_cmp_ps::<_CMP_GT_OQ>(self.0, other.0)) })
    }

    #[inline(always)]
    fn blend(self, other: Self, mask: M32x8) -> Self {
        Self(unsafe { _mm256_blendv_ps(self.0, other.0, _mm256_castsi256_ps(mask.0)) })
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> f32 {
        self.lanes()[lane]
    }

    #[inline(always)]
    fn replace(self, lane: usize, value: f32) -> Self {
        let mut lanes = self.lanes();
        lanes[lane] = value;
        Self(unsafe { _mm256_loadu_ps(lanes.as_ptr()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmax_f64() {
        let data = [1.0, -7.0, 3.5, 2.0];
        let v = unsafe { F64x4::load(data.as_ptr(), false) };
        assert_eq!(v.hmax(), 3.5);
    }

    #[test]
    fn test_i32_index_masks() {
        let mask = I32x8::sequence().lt(I32x8::splat(5));
        assert!(mask.test(4));
        assert!(!mask.test(5));
        assert!(I32x8::sequence().ge(I32x8::splat(7)).test(7));
    }
}
