//! Index of the element with the largest absolute value.

use crate::error::{Error, Result};
use crate::pointer::VectorPointer;
use crate::simd::{Scalar, SimdIndex, SimdVec};

/// Pointer-level IAMAX over `n` elements.
///
/// Unit-stride vectors of at least one register are scanned with vector
/// max-with-index, keeping one running winner per lane, then reduced
/// horizontally; the remaining tail and strided vectors go element by
/// element. Ties resolve to the lowest index. Returns 0 when `n == 0`.
///
/// # Safety
///
/// `x` must address `n` readable elements.
pub unsafe fn iamax_backend<T: Scalar>(n: usize, x: VectorPointer<T>) -> usize {
    let ss = T::SIMD_SIZE;
    let (mut best, mut best_index, tail) = if x.stride() != 1 || n < ss {
        (T::neg_infinity(), 0, 0)
    } else {
        type Index<T> = <<T as Scalar>::Simd as SimdVec>::Index;
        let step = Index::<T>::splat(ss as i64);
        let mut index = Index::<T>::sequence();
        let mut vmax = unsafe { x.load() }.abs();
        let mut imax = index;
        let mut i = ss;
        while i + ss <= n {
            index = index.add(step);
            let v = unsafe { x.offset(i).load() }.abs();
            (vmax, imax) = vmax.imax(imax, v, index);
            i += ss;
        }
        let (value, lane_index) = vmax.hmax_index(imax);
        (value, lane_index as usize, i)
    };
    for i in tail..n {
        let v = unsafe { x.offset(i).value() }.abs();
        if v > best {
            best = v;
            best_index = i;
        }
    }
    best_index
}

/// Index of the first element of `x` with the largest absolute value.
///
/// ```
/// use regblas::iamax;
///
/// assert_eq!(iamax(&[1.0, -7.0, 3.0, 7.0]).unwrap(), 1);
/// ```
pub fn iamax<T: Scalar>(x: &[T]) -> Result<usize> {
    if x.is_empty() {
        return Err(Error::EmptyVector { op: "iamax" });
    }
    Ok(unsafe { iamax_backend(x.len(), VectorPointer::from_slice(x)) })
}
