use super::assert_shape;
use crate::matrix::{Matrix, MatrixMut};
use crate::simd::Scalar;

/// Reference rank-1 update `B = alpha * x * y^T + A`.
pub fn ger<T, MA, MB>(alpha: T, x: &[T], y: &[T], a: &MA, b: &mut MB)
where
    T: Scalar,
    MA: Matrix<Element = T>,
    MB: MatrixMut<Element = T>,
{
    let (m, n) = (x.len(), y.len());
    assert_shape("A", a, m, n);
    assert_shape("B", &*b, m, n);
    for j in 0..n {
        for i in 0..m {
            b.set(i, j, alpha * x[i] * y[j] + a.get(i, j));
        }
    }
}

/// Reference index of the element with the largest absolute value.
///
/// Ties go to the lowest index; `None` for an empty slice.
pub fn iamax<T: Scalar>(x: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, v) in x.iter().enumerate() {
        let v = v.abs();
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DynamicMatrix;

    #[test]
    fn test_iamax() {
        assert_eq!(iamax::<f64>(&[]), None);
        assert_eq!(iamax(&[1.0, -3.0, 3.0, 2.0]), Some(1));
        assert_eq!(iamax(&[0.5f32; 7]), Some(0));
    }

    #[test]
    fn test_ger() {
        let a = DynamicMatrix::<f64>::from_fn(2, 3, |_, _| 1.0);
        let mut b = DynamicMatrix::<f64>::new(2, 3);
        ger(2.0, &[1.0, 2.0], &[1.0, 0.0, -1.0], &a, &mut b);
        assert_eq!(b[(1, 0)], 5.0);
        assert_eq!(b[(0, 1)], 1.0);
        assert_eq!(b[(1, 2)], -3.0);
    }
}
