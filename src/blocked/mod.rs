//! Whole-matrix algorithms built from register-block kernels.
//!
//! Each module pairs an `unsafe` pointer-level backend (`*_backend`), which
//! takes a [`TilePolicy`](tile::TilePolicy) and raw matrix pointers, with a
//! safe entry point that checks shapes and calls the backend with
//! [`BalancedPolicy`](tile::BalancedPolicy).
//!
//! | Module | Operation |
//! |---|---|
//! | `gemm` | `D = alpha * A * B + beta * C` |
//! | `syrk` | `D = alpha * A * A^T + beta * C`, lower triangle |
//! | `potrf` | Cholesky factor `A = L * L^T` |
//! | `trsm` | `X = A^-1 * B`, `A` triangular |
//! | `trmm` | `C = alpha * A * B` or `alpha * B * A`, `A` triangular |
//! | `trsv` | `x = A^-1 * b` |
//! | `ger` | `B = alpha * x * y^T + A` |
//! | `iamax` | index of the largest `|x_i|` |
//! | `getrf` | LU with partial pivoting, row interchanges |
//!
//! [`tile`] holds the drivers that decide the tile shapes.

pub mod gemm;
pub mod ger;
pub mod getrf;
pub mod iamax;
pub mod potrf;
pub mod syrk;
pub mod tile;
pub mod trmm;
pub mod trsm;
pub mod trsv;

pub use gemm::{gemm, gemm_backend, gemm_nn};
pub use ger::{ger, ger_backend};
pub use getrf::{getf2, getf2_backend, getrf, getrf_backend, laswp, laswp_backend, swap_rows, swap_rows_backend};
pub use iamax::{iamax, iamax_backend};
pub use potrf::{potrf, potrf_backend};
pub use syrk::{syrk_lower, syrk_lower_backend};
pub use tile::{BalancedPolicy, GreedyPolicy, TILE_STEP, TilePolicy};
pub use trmm::{trmm, trmm_backend, trmm_left_upper, trmm_right_lower};
pub use trsm::{trsm, trsm_backend};
pub use trsv::{trsv_lower, trsv_upper};
