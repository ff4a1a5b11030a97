//! Naive nested-loop versions of every blocked operation.
//!
//! These go through [`Matrix::get`](crate::Matrix::get) and
//! [`MatrixMut::set`](crate::MatrixMut::set) one element at a time and are
//! meant as the ground truth the register-block code is tested (and
//! benchmarked) against. They panic on shape mismatches instead of
//! returning errors.

use num_traits::{One, Zero};

mod factor;
mod multiply;
mod vector;

pub use factor::{potrf, trsm};
pub use multiply::{gemm, syrk_lower, trmm};
pub use vector::{ger, iamax};

use crate::kernels::UpLo;
use crate::matrix::Matrix;

/// Element `(i, k)` of the triangular matrix `A` as the algorithms see it:
/// zero outside the `uplo` triangle, one on the diagonal when `unit`.
fn triangular<M>(a: &M, uplo: UpLo, unit: bool, i: usize, k: usize) -> M::Element
where
    M: Matrix,
{
    let inside = match uplo {
        UpLo::Lower => i > k,
        UpLo::Upper => i < k,
    };
    if i == k {
        if unit { M::Element::one() } else { a.get(i, k) }
    } else if inside {
        a.get(i, k)
    } else {
        M::Element::zero()
    }
}

fn assert_shape<M: Matrix>(name: &str, m: &M, rows: usize, columns: usize) {
    assert_eq!(
        m.shape(),
        (rows, columns),
        "{}: expected {}x{}, got {}x{}",
        name,
        rows,
        columns,
        m.rows(),
        m.columns()
    );
}
