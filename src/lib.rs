//! Register-blocked dense linear algebra in Rust.
//!
//! I wanted to see how far you get on small and medium matrices by keeping
//! a whole output tile in SIMD registers and never packing anything. The
//! answer is: pretty far. Every algorithm here is a loop over register-sized
//! tiles, and every tile goes load, accumulate, (factor or solve), store.
//!
//! ## Usage
//!
//! ```
//! use regblas::{DynamicMatrix, gemm, potrf};
//!
//! let a = DynamicMatrix::<f64>::from_fn(20, 20, |i, j| if i == j { 20.0 } else { 1.0 });
//! let b = DynamicMatrix::<f64>::identity(20);
//! let c = DynamicMatrix::<f64>::new(20, 20);
//! let mut d = DynamicMatrix::<f64>::new(20, 20);
//!
//! gemm(1.0, &a, &b, 0.0, &c, &mut d).unwrap();
//! assert_eq!(d[(3, 3)], 20.0);
//!
//! let mut l = DynamicMatrix::<f64>::new(20, 20);
//! potrf(&a, &mut l).unwrap();
//! assert!((l[(0, 0)] - 20f64.sqrt()).abs() < 1e-12);
//! ```
//!
//! Build with `RUSTFLAGS="-C target-cpu=native"` on an AVX2 + FMA machine to
//! get the intrinsics backend; anything else uses the portable one, with the
//! same tile shapes.
//!
//! ## What's inside
//!
//! - `RegisterMatrix<T, RM, N>`: a tile held in `RM * N` vector registers
//! - Matrix pointers that work for column-major, row-major and transposed views
//! - Tiling drivers with a pluggable tile-height policy
//! - GEMM, SYRK, Cholesky, TRSM, TRMM, TRSV, GER, IAMAX, LU with pivoting
//! - Naive reference versions of all of them, for testing

pub mod blocked;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod pointer;
pub mod reference;
pub mod simd;

pub use blocked::{
    BalancedPolicy, GreedyPolicy, TILE_STEP, TilePolicy, gemm, gemm_nn, ger, getf2, getrf, iamax, laswp, potrf,
    swap_rows, syrk_lower, trmm, trmm_left_upper, trmm_right_lower, trsm, trsv_lower, trsv_upper,
};
pub use error::{Error, Result};
pub use kernels::{RegisterMatrix, Side, UpLo};
pub use matrix::{DynamicMatrix, Matrix, MatrixMut, StaticMatrix};
pub use pointer::{
    ColumnMajor, DynamicMatrixPointer, MatrixPointer, Order, RowMajor, StaticMatrixPointer, StorageOrder,
    VectorPointer, ptr, ptr_mut,
};
pub use simd::Scalar;
