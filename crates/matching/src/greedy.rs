//! Greedy largest-count matching of rows to columns.
//!
//! Each round picks the largest remaining cell, pairs its row with its
//! column and removes both from later rounds. Ties go to the cell seen
//! first in row-major order. Rows and columns left over once one axis is
//! exhausted keep their original relative order at the end.

use serde::Serialize;

use crate::matrix::Grid;

/// One matched row/column pair, as indices into the input grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct GridMatch {
    pub row: usize,
    pub col: usize,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GreedyMatching {
    /// Matches in the order they were chosen.
    pub matches: Vec<GridMatch>,
    /// Every row index exactly once: matched rows first, then the rest.
    pub row_order: Vec<usize>,
    /// Every column index exactly once: matched columns first, then the rest.
    pub col_order: Vec<usize>,
}

pub fn greedy_match(grid: &Grid) -> GreedyMatching {
    let (rows, cols) = (grid.rows(), grid.cols());
    // `None` marks a cell whose row or column is already taken.
    let mut work: Vec<Option<u64>> = grid.cells().iter().copied().map(Some).collect();
    let mut row_taken = vec![false; rows];
    let mut col_taken = vec![false; cols];
    let mut result = GreedyMatching::default();

    for _ in 0..rows.min(cols) {
        let mut best: Option<(usize, u64)> = None;
        for (idx, cell) in work.iter().enumerate() {
            let Some(value) = *cell else { continue };
            if best.is_none_or(|(_, current)| value > current) {
                best = Some((idx, value));
            }
        }
        let Some((idx, count)) = best else { break };
        let (row, col) = (idx / cols, idx % cols);

        for c in 0..cols {
            work[row * cols + c] = None;
        }
        for r in 0..rows {
            work[r * cols + col] = None;
        }
        row_taken[row] = true;
        col_taken[col] = true;

        result.matches.push(GridMatch { row, col, count });
        result.row_order.push(row);
        result.col_order.push(col);
    }

    result.row_order.extend((0..rows).filter(|&r| !row_taken[r]));
    result.col_order.extend((0..cols).filter(|&c| !col_taken[c]));
    result
}
