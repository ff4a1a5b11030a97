//! Error type for the whole-matrix entry points.
//!
//! Kernel and pointer level operations never fail: their contracts are
//! documented in `# Safety` sections. Only shape validation and exact-zero LU
//! pivots surface here, so callers can tell a bad call apart from a matrix
//! that merely produced NaNs.

/// Errors reported by the orchestrator functions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{op}: {operand} has shape {got:?}, expected {expected:?}")]
    DimensionMismatch {
        op: &'static str,
        operand: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("{op}: {operand} must be square, got {rows}x{cols}")]
    NotSquare {
        op: &'static str,
        operand: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("{op}: vector must not be empty")]
    EmptyVector { op: &'static str },

    #[error("matrix is singular: pivot in column {column} is exactly zero")]
    SingularMatrix { column: usize },

    #[error("pivot buffer holds {got} entries, expected at least {expected}")]
    PivotLength { expected: usize, got: usize },

    #[error("row {index} is outside a matrix with {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },
}

/// Checks that `index` names a row of a matrix with `rows` rows.
pub(crate) fn check_row(index: usize, rows: usize) -> Result<()> {
    if index < rows {
        Ok(())
    } else {
        Err(Error::RowOutOfRange { index, rows })
    }
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Checks that `operand` has exactly the `expected` shape.
pub(crate) fn check_shape(
    op: &'static str,
    operand: &'static str,
    got: (usize, usize),
    expected: (usize, usize),
) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            op,
            operand,
            expected,
            got,
        })
    }
}

/// Checks that `operand` is square and returns its order.
pub(crate) fn check_square(op: &'static str, operand: &'static str, shape: (usize, usize)) -> Result<usize> {
    if shape.0 == shape.1 {
        Ok(shape.0)
    } else {
        Err(Error::NotSquare {
            op,
            operand,
            rows: shape.0,
            cols: shape.1,
        })
    }
}
