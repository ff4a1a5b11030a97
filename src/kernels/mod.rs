//! Register-resident micro-kernels.
//!
//! [`RegisterMatrix`] keeps an `RM * SS` by `N` block in SIMD registers
//! (`SS` being the lane count of the element type) and offers the block-level
//! operations every blocked driver is built from:
//!
//! | Operation | File |
//! |---|---|
//! | load / store / store_lower (full and partial) | `load_store.rs` |
//! | scale, axpy, ger, gemm | `update.rs` |
//! | potrf, trsm | `factor.rs` |
//! | trmm | `trmm.rs` |
//!
//! A block lives for one tile: it is reset or loaded, updated any number of
//! times, then stored.

mod factor;
mod load_store;
mod register_matrix;
mod trmm;
mod update;

pub use register_matrix::RegisterMatrix;

/// Which side of the unknown the triangular operand sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// `A * X = B` / `A * B`
    Left,
    /// `X * A = B` / `B * A`
    Right,
}

/// Which triangle of the operand is referenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpLo {
    Upper,
    Lower,
}
