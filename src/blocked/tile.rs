//! Tiling driver: covers an `M x N` output with register-block tiles.
//!
//! Tiles are `TILE_STEP` columns wide. Their height is picked per row
//! position by a [`TilePolicy`] as 3, 2 or 1 SIMD registers; only the final
//! sub-register remainder gets a tile taller than the rows it covers, and that
//! one is handed to the partial callback.
//!
//! Because a block's height is a const generic, callers supply a
//! [`TileVisitor`] (a pair of generic callbacks) rather than closures.

use std::marker::PhantomData;

use crate::kernels::RegisterMatrix;
use crate::pointer::Order;
use crate::simd::Scalar;

/// Kernel column count used by every driver.
pub const TILE_STEP: usize = 4;

/// Picks the height of the next row block.
pub trait TilePolicy {
    /// Number of SIMD registers per column (1, 2 or 3) for the next block when
    /// `remaining > 0` rows are left. A block covers
    /// `min(registers * simd_size, remaining)` rows.
    fn registers(&self, remaining: usize, simd_size: usize) -> usize;
}

/// Largest fit, except that a `4 * SS` remainder is split `2 + 2` instead of
/// `3 + 1`. The default everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalancedPolicy;

/// Plain largest fit: `3 * SS` while it fits, then `2 * SS`, then `SS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GreedyPolicy;

impl TilePolicy for BalancedPolicy {
    #[inline]
    fn registers(&self, remaining: usize, simd_size: usize) -> usize {
        if remaining >= 3 * simd_size && remaining != 4 * simd_size {
            3
        } else if remaining >= 2 * simd_size {
            2
        } else {
            1
        }
    }
}

impl TilePolicy for GreedyPolicy {
    #[inline]
    fn registers(&self, remaining: usize, simd_size: usize) -> usize {
        (remaining / simd_size).clamp(1, 3)
    }
}

/// Per-tile callbacks of [`tile`].
///
/// `full` is called when the tile lies entirely inside the matrix,
/// `partial` when it is cut by the bottom or right edge; `m` and `n` are the
/// rows and columns actually inside. The kernel arrives zeroed.
pub trait TileVisitor<T: Scalar> {
    fn full<const RM: usize, const N: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, N>, i: usize, j: usize);

    fn partial<const RM: usize, const N: usize>(
        &mut self,
        ker: &mut RegisterMatrix<T, RM, N>,
        i: usize,
        j: usize,
        m: usize,
        n: usize,
    );
}

/// Per-row-block callback for drivers that walk row blocks themselves.
pub trait RowBlockVisitor {
    /// Visit rows `i..i + m` with a kernel `RM` registers tall
    /// (`m <= RM * SS`).
    fn visit<const RM: usize>(&mut self, i: usize, m: usize);
}

/// Calls `visitor.visit::<RM>` for `registers` in 1..=3.
#[inline]
pub fn visit_rows<V: RowBlockVisitor>(registers: usize, visitor: &mut V, i: usize, m: usize) {
    match registers {
        0 | 1 => visitor.visit::<1>(i, m),
        2 => visitor.visit::<2>(i, m),
        _ => visitor.visit::<3>(i, m),
    }
}

/// Row blocks of `0..m` from top to bottom as `(i, rows, registers)`.
pub fn row_blocks<P: TilePolicy>(policy: &P, m: usize, simd_size: usize) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    let mut i = 0;
    std::iter::from_fn(move || {
        if i >= m {
            return None;
        }
        let rm = policy.registers(m - i, simd_size);
        let rows = (rm * simd_size).min(m - i);
        let block = (i, rows, rm);
        i += rows;
        Some(block)
    })
}

/// Row blocks of `0..m` from bottom to top, sized from the bottom edge so the
/// partial block (if any) is the topmost one.
pub fn row_blocks_rev<P: TilePolicy>(policy: &P, m: usize, simd_size: usize) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    let mut end = m;
    std::iter::from_fn(move || {
        if end == 0 {
            return None;
        }
        let rm = policy.registers(end, simd_size);
        let rows = (rm * simd_size).min(end);
        end -= rows;
        Some((end, rows, rm))
    })
}

/// Covers `m x n` with tiles using [`BalancedPolicy`].
///
/// With [`Order::ColumnMajor`] traversal column tiles are the outer loop and
/// row blocks the inner one; [`Order::RowMajor`] swaps the loops. Zero `m` or
/// `n` makes no calls.
pub fn tile<T: Scalar, V: TileVisitor<T>>(traversal: Order, m: usize, n: usize, visitor: &mut V) {
    tile_with(&BalancedPolicy, traversal, m, n, visitor);
}

/// [`tile`] with an explicit block-height policy.
pub fn tile_with<T, P, V>(policy: &P, traversal: Order, m: usize, n: usize, visitor: &mut V)
where
    T: Scalar,
    P: TilePolicy,
    V: TileVisitor<T>,
{
    let ss = T::SIMD_SIZE;
    match traversal {
        Order::ColumnMajor => {
            for j in (0..n).step_by(TILE_STEP) {
                let nj = (n - j).min(TILE_STEP);
                for (i, mi, rm) in row_blocks(policy, m, ss) {
                    visit_tile::<T, V>(rm, visitor, i, j, mi, nj);
                }
            }
        }
        Order::RowMajor => {
            for (i, mi, rm) in row_blocks(policy, m, ss) {
                for j in (0..n).step_by(TILE_STEP) {
                    let nj = (n - j).min(TILE_STEP);
                    visit_tile::<T, V>(rm, visitor, i, j, mi, nj);
                }
            }
        }
    }
}

/// Builds a zero kernel `registers` tall and hands it to `visitor`.
#[inline]
pub fn visit_tile<T: Scalar, V: TileVisitor<T>>(registers: usize, visitor: &mut V, i: usize, j: usize, m: usize, n: usize) {
    match registers {
        0 | 1 => visit_tile_with::<T, V, 1>(visitor, i, j, m, n),
        2 => visit_tile_with::<T, V, 2>(visitor, i, j, m, n),
        _ => visit_tile_with::<T, V, 3>(visitor, i, j, m, n),
    }
}

#[inline(always)]
fn visit_tile_with<T: Scalar, V: TileVisitor<T>, const RM: usize>(visitor: &mut V, i: usize, j: usize, m: usize, n: usize) {
    let mut ker = RegisterMatrix::<T, RM, TILE_STEP>::new();
    if m == ker.rows() && n == TILE_STEP {
        visitor.full(&mut ker, i, j);
    } else {
        visitor.partial(&mut ker, i, j, m, n);
    }
}

/// Per-tile callbacks of [`tile_lower`].
pub trait LowerTileVisitor<T: Scalar> {
    /// Tile strictly below the diagonal: rows `i..i + m`, columns
    /// `j..j + TILE_STEP`.
    fn off_diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, TILE_STEP>, i: usize, j: usize, m: usize);

    /// Tile on the diagonal at `(d, d)`: `m` rows and `min(m, TILE_STEP)`
    /// columns, of which only the lower triangle belongs to the output.
    fn diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<T, RM, TILE_STEP>, d: usize, m: usize);
}

/// Covers the lower triangle of an `m x m` matrix, row block by row block.
///
/// For each row block the tiles left of the diagonal are visited first, in
/// increasing column order. The diagonal block is then covered by a chain of
/// diagonal tiles moving `TILE_STEP` down and right each step, the kernel
/// shrinking with the rows left in the block. This is the order a Cholesky
/// factorization needs: every tile is visited after all tiles it depends on.
pub fn tile_lower<T, P, V>(policy: &P, m: usize, visitor: &mut V)
where
    T: Scalar,
    P: TilePolicy,
    V: LowerTileVisitor<T>,
{
    let ss = T::SIMD_SIZE;
    for (i, mi, rm) in row_blocks(policy, m, ss) {
        visit_rows(rm, &mut OffDiagonalRow { visitor: &mut *visitor, scalar: PhantomData::<T> }, i, mi);
        for d in (i..i + mi).step_by(TILE_STEP) {
            let rows = i + mi - d;
            visit_rows(rows.div_ceil(ss), &mut DiagonalTile { visitor: &mut *visitor, scalar: PhantomData::<T> }, d, rows);
        }
    }
}

struct OffDiagonalRow<'a, T, V> {
    visitor: &'a mut V,
    scalar: PhantomData<T>,
}

impl<T: Scalar, V: LowerTileVisitor<T>> RowBlockVisitor for OffDiagonalRow<'_, T, V> {
    fn visit<const RM: usize>(&mut self, i: usize, m: usize) {
        for j in (0..i).step_by(TILE_STEP) {
            let mut ker = RegisterMatrix::<T, RM, TILE_STEP>::new();
            self.visitor.off_diagonal(&mut ker, i, j, m);
        }
    }
}

struct DiagonalTile<'a, T, V> {
    visitor: &'a mut V,
    scalar: PhantomData<T>,
}

impl<T: Scalar, V: LowerTileVisitor<T>> RowBlockVisitor for DiagonalTile<'_, T, V> {
    fn visit<const RM: usize>(&mut self, d: usize, m: usize) {
        let mut ker = RegisterMatrix::<T, RM, TILE_STEP>::new();
        self.visitor.diagonal(&mut ker, d, m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every tile as `(i, j, m, n, full)`.
    struct Recorder(Vec<(usize, usize, usize, usize, bool)>);

    impl TileVisitor<f64> for Recorder {
        fn full<const RM: usize, const N: usize>(&mut self, ker: &mut RegisterMatrix<f64, RM, N>, i: usize, j: usize) {
            self.0.push((i, j, ker.rows(), ker.columns(), true));
        }

        fn partial<const RM: usize, const N: usize>(
            &mut self,
            ker: &mut RegisterMatrix<f64, RM, N>,
            i: usize,
            j: usize,
            m: usize,
            n: usize,
        ) {
            assert!(m <= ker.rows() && n <= ker.columns());
            assert!(m < ker.rows() || n < ker.columns());
            self.0.push((i, j, m, n, false));
        }
    }

    fn check_partition<P: TilePolicy>(policy: &P, traversal: Order, m: usize, n: usize) {
        let mut rec = Recorder(Vec::new());
        tile_with::<f64, _, _>(policy, traversal, m, n, &mut rec);
        let mut hits = vec![0u8; m * n];
        for &(i, j, mi, nj, _) in &rec.0 {
            for ii in i..i + mi {
                for jj in j..j + nj {
                    assert!(ii < m && jj < n, "tile ({}, {}) leaves {}x{}", i, j, m, n);
                    hits[ii * n + jj] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&h| h == 1), "{:?} {}x{} not partitioned", traversal, m, n);
    }

    fn check_partition_grid<P: TilePolicy>(policy: &P, traversal: Order) {
        for m in 1..100 {
            for n in 1..100 {
                check_partition(policy, traversal, m, n);
            }
        }
    }

    #[test]
    fn test_partition_column_major() {
        check_partition_grid(&BalancedPolicy, Order::ColumnMajor);
        check_partition_grid(&GreedyPolicy, Order::ColumnMajor);
    }

    #[test]
    fn test_partition_row_major() {
        check_partition_grid(&BalancedPolicy, Order::RowMajor);
        check_partition_grid(&GreedyPolicy, Order::RowMajor);
    }

    #[test]
    fn test_traversal_orders_visit_same_tiles() {
        for (m, n) in [(1, 1), (13, 9), (16, 16), (37, 22), (99, 99)] {
            let mut by_col = Recorder(Vec::new());
            let mut by_row = Recorder(Vec::new());
            tile::<f64, _>(Order::ColumnMajor, m, n, &mut by_col);
            tile::<f64, _>(Order::RowMajor, m, n, &mut by_row);
            // Row-major order visits tiles sorted by row, then column.
            let mut sorted = by_col.0.clone();
            sorted.sort_by_key(|t| (t.0, t.1));
            assert_eq!(sorted, by_row.0, "{}x{}", m, n);
        }
    }

    #[test]
    fn test_empty_makes_no_calls() {
        let mut rec = Recorder(Vec::new());
        tile::<f64, _>(Order::ColumnMajor, 0, 5, &mut rec);
        tile::<f64, _>(Order::RowMajor, 5, 0, &mut rec);
        assert!(rec.0.is_empty());
    }

    #[test]
    fn test_four_register_remainder_splits_evenly() {
        let ss = f64::SIMD_SIZE;
        let heights: Vec<usize> = row_blocks(&BalancedPolicy, 4 * ss, ss).map(|b| b.1).collect();
        assert_eq!(heights, vec![2 * ss, 2 * ss]);
        let heights: Vec<usize> = row_blocks(&GreedyPolicy, 4 * ss, ss).map(|b| b.1).collect();
        assert_eq!(heights, vec![3 * ss, ss]);
        let heights: Vec<usize> = row_blocks(&BalancedPolicy, 7 * ss, ss).map(|b| b.1).collect();
        assert_eq!(heights, vec![3 * ss, 2 * ss, 2 * ss]);
        let heights: Vec<usize> = row_blocks(&BalancedPolicy, 4 * ss + 1, ss).map(|b| b.1).collect();
        assert_eq!(heights, vec![3 * ss, ss, 1]);
    }

    #[test]
    fn test_reverse_blocks_cover_from_bottom() {
        let ss = f64::SIMD_SIZE;
        let blocks: Vec<_> = row_blocks_rev(&BalancedPolicy, 3 * ss + 2, ss).collect();
        assert_eq!(blocks, vec![(2, 3 * ss, 3), (0, 2, 1)]);
    }

    #[test]
    fn test_only_edge_tiles_are_partial() {
        let ss = f64::SIMD_SIZE;
        let mut rec = Recorder(Vec::new());
        tile::<f64, _>(Order::ColumnMajor, 5 * ss, 8, &mut rec);
        assert!(rec.0.iter().all(|t| t.4));
        assert_eq!(rec.0.len(), 4);
    }

    /// Marks the lower-triangle elements each tile writes.
    struct LowerRecorder {
        m: usize,
        hits: Vec<u8>,
        heights: Vec<usize>,
    }

    impl LowerTileVisitor<f64> for LowerRecorder {
        fn off_diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<f64, RM, TILE_STEP>, i: usize, j: usize, m: usize) {
            assert!(m <= ker.rows());
            assert!(j + TILE_STEP <= i);
            for ii in i..i + m {
                for jj in j..j + TILE_STEP {
                    self.hits[ii * self.m + jj] += 1;
                }
            }
        }

        fn diagonal<const RM: usize>(&mut self, ker: &mut RegisterMatrix<f64, RM, TILE_STEP>, d: usize, m: usize) {
            assert!(m <= ker.rows());
            self.heights.push(ker.rows());
            for ii in d..d + m {
                for jj in d..(d + m.min(TILE_STEP)).min(ii + 1) {
                    self.hits[ii * self.m + jj] += 1;
                }
            }
        }
    }

    fn check_lower_partition<P: TilePolicy>(policy: &P) {
        for m in 0..100 {
            let mut rec = LowerRecorder { m, hits: vec![0; m * m], heights: Vec::new() };
            tile_lower::<f64, _, _>(policy, m, &mut rec);
            for i in 0..m {
                for j in 0..m {
                    let expected = u8::from(i >= j);
                    assert_eq!(rec.hits[i * m + j], expected, "m={} at ({}, {})", m, i, j);
                }
            }
        }
    }

    #[test]
    fn test_lower_partition() {
        check_lower_partition(&BalancedPolicy);
        check_lower_partition(&GreedyPolicy);
    }

    #[test]
    fn test_diagonal_kernel_shrinks() {
        let ss = f64::SIMD_SIZE;
        let m = 3 * ss;
        let mut rec = LowerRecorder { m, hits: vec![0; m * m], heights: Vec::new() };
        tile_lower::<f64, _, _>(&BalancedPolicy, m, &mut rec);
        assert_eq!(rec.heights.first(), Some(&(3 * ss)));
        assert_eq!(rec.heights.last(), Some(&ss));
        assert!(rec.heights.windows(2).all(|w| w[0] >= w[1]));
    }
}
