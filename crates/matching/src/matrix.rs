use std::collections::BTreeSet;
use std::fmt;

use foundation::ids::{AxisLabel, ClusterId, Side};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    Empty,
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A matrix row (`Side::Left`) or column (`Side::Right`) names a cluster
    /// the cluster map of that side does not know.
    UnknownCluster { side: Side, id: ClusterId },
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::Empty => write!(f, "contingency matrix is empty"),
            MatrixError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "contingency matrix is not rectangular: row {row} has {found} cells, expected {expected}"
            ),
            MatrixError::UnknownCluster { side, id } => write!(
                f,
                "contingency matrix references cluster {id} absent from the {side} cluster map"
            ),
        }
    }
}

impl std::error::Error for MatrixError {}

/// Dense row-major grid of counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u64>,
}

impl Grid {
    /// Builds a grid from nested rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::Ragged {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[u64] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    pub fn row(&self, row: usize) -> &[u64] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// Copy without the first row and first column.
    fn without_leading(&self) -> Grid {
        let rows = self.rows.saturating_sub(1);
        let cols = self.cols.saturating_sub(1);
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 1..self.rows {
            cells.extend_from_slice(&self.row(r)[1..]);
        }
        Grid { rows, cols, cells }
    }
}

/// Transition counts between t0 clusters (rows) and t1 clusters (columns).
///
/// Layout: row 0 and column 0 hold the *no cluster* sentinel; row `i >= 1` is
/// t0 cluster `i - 1` and column `j >= 1` is t1 cluster `j - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyMatrix {
    grid: Grid,
}

impl ContingencyMatrix {
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self, MatrixError> {
        let grid = Grid::from_rows(rows)?;
        if grid.rows == 0 || grid.cols == 0 {
            return Err(MatrixError::Empty);
        }
        Ok(Self { grid })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of real (non-sentinel) t0 clusters.
    pub fn real_rows(&self) -> usize {
        self.grid.rows - 1
    }

    /// Number of real (non-sentinel) t1 clusters.
    pub fn real_cols(&self) -> usize {
        self.grid.cols - 1
    }

    /// Counts between real clusters only.
    pub fn real_counts(&self) -> Grid {
        self.grid.without_leading()
    }

    pub fn row_cluster(&self, row: usize) -> ClusterId {
        index_to_cluster(row)
    }

    pub fn col_cluster(&self, col: usize) -> ClusterId {
        index_to_cluster(col)
    }

    pub fn row_index(&self, id: ClusterId) -> Option<usize> {
        cluster_to_index(id, self.grid.rows)
    }

    pub fn col_index(&self, id: ClusterId) -> Option<usize> {
        cluster_to_index(id, self.grid.cols)
    }

    pub fn row_clusters(&self) -> impl Iterator<Item = ClusterId> + '_ {
        (1..self.grid.rows).map(index_to_cluster)
    }

    pub fn col_clusters(&self) -> impl Iterator<Item = ClusterId> + '_ {
        (1..self.grid.cols).map(index_to_cluster)
    }

    pub fn value(&self, row: ClusterId, col: ClusterId) -> Option<u64> {
        self.grid.get(self.row_index(row)?, self.col_index(col)?)
    }

    /// Count shown for a pair of axis labels; the padding label is always 0.
    pub fn label_value(&self, row: AxisLabel, col: AxisLabel) -> u64 {
        match (row.cluster(), col.cluster()) {
            (Some(r), Some(c)) => self.value(r, c).unwrap_or(0),
            _ => 0,
        }
    }

    /// Real t1 clusters that receive at least one trajectory from t0 `row`.
    pub fn successors(&self, row: ClusterId) -> BTreeSet<ClusterId> {
        let Some(r) = row.real().and_then(|id| self.row_index(id)) else {
            return BTreeSet::new();
        };
        (1..self.grid.cols)
            .filter(|&c| self.grid.get(r, c).unwrap_or(0) > 0)
            .map(index_to_cluster)
            .collect()
    }

    /// Real t0 clusters that send at least one trajectory to t1 `col`.
    pub fn predecessors(&self, col: ClusterId) -> BTreeSet<ClusterId> {
        let Some(c) = col.real().and_then(|id| self.col_index(id)) else {
            return BTreeSet::new();
        };
        (1..self.grid.rows)
            .filter(|&r| self.grid.get(r, c).unwrap_or(0) > 0)
            .map(index_to_cluster)
            .collect()
    }

    /// Clusters reachable from `id` on the opposite side of `side`.
    pub fn reachable(&self, side: Side, id: ClusterId) -> BTreeSet<ClusterId> {
        match side {
            Side::Left => self.successors(id),
            Side::Right => self.predecessors(id),
        }
    }

    /// Checks every real row/column id against the known cluster ids of
    /// each side.
    pub fn validate_against(
        &self,
        t0_clusters: &BTreeSet<ClusterId>,
        t1_clusters: &BTreeSet<ClusterId>,
    ) -> Result<(), MatrixError> {
        if let Some(id) = self.row_clusters().find(|id| !t0_clusters.contains(id)) {
            return Err(MatrixError::UnknownCluster {
                side: Side::Left,
                id,
            });
        }
        if let Some(id) = self.col_clusters().find(|id| !t1_clusters.contains(id)) {
            return Err(MatrixError::UnknownCluster {
                side: Side::Right,
                id,
            });
        }
        Ok(())
    }
}

fn index_to_cluster(index: usize) -> ClusterId {
    ClusterId::new(index as i64 - 1)
}

fn cluster_to_index(id: ClusterId, len: usize) -> Option<usize> {
    let index = usize::try_from(id.raw().checked_add(1)?).ok()?;
    (index < len).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::{ContingencyMatrix, Grid, MatrixError};
    use foundation::ids::{AxisLabel, ClusterId, Side};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn c(id: i64) -> ClusterId {
        ClusterId::new(id)
    }

    fn sample() -> ContingencyMatrix {
        // sentinel row/col first; two t0 clusters, three t1 clusters.
        ContingencyMatrix::from_rows(vec![
            vec![4, 1, 0, 0],
            vec![0, 7, 0, 2],
            vec![1, 0, 0, 5],
        ])
        .unwrap()
    }

    #[test]
    fn rejects_empty_and_ragged_input() {
        assert_eq!(ContingencyMatrix::from_rows(vec![]), Err(MatrixError::Empty));
        assert_eq!(
            ContingencyMatrix::from_rows(vec![vec![]]),
            Err(MatrixError::Empty)
        );
        assert_eq!(
            ContingencyMatrix::from_rows(vec![vec![1, 2], vec![3]]),
            Err(MatrixError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn maps_indices_to_cluster_ids() {
        let m = sample();
        assert_eq!(m.real_rows(), 2);
        assert_eq!(m.real_cols(), 3);
        assert_eq!(m.row_cluster(0), ClusterId::NONE);
        assert_eq!(m.row_index(c(1)), Some(2));
        assert_eq!(m.col_index(c(3)), None);
        assert_eq!(m.value(c(0), c(0)), Some(7));
        assert_eq!(m.value(ClusterId::NONE, ClusterId::NONE), Some(4));
        assert_eq!(m.label_value(AxisLabel::Cluster(c(1)), AxisLabel::NotPresent), 0);
        assert_eq!(
            m.label_value(AxisLabel::Cluster(c(1)), AxisLabel::Cluster(c(2))),
            5
        );
    }

    #[test]
    fn real_counts_strip_sentinels() {
        let real = sample().real_counts();
        assert_eq!(real, Grid::from_rows(vec![vec![7, 0, 2], vec![0, 0, 5]]).unwrap());
    }

    #[test]
    fn reachability_skips_sentinel_and_zero_cells() {
        let m = sample();
        assert_eq!(m.successors(c(0)), BTreeSet::from([c(0), c(2)]));
        assert_eq!(m.predecessors(c(2)), BTreeSet::from([c(0), c(1)]));
        assert_eq!(m.predecessors(c(1)), BTreeSet::new());
        assert_eq!(m.reachable(Side::Right, c(0)), BTreeSet::from([c(0)]));
        assert!(m.successors(ClusterId::NONE).is_empty());
    }

    #[test]
    fn ids_outside_the_matrix_have_no_index() {
        let m = sample();
        assert_eq!(m.row_index(c(i64::MAX)), None);
        assert_eq!(m.col_index(c(3)), None);
        assert!(m.successors(c(i64::MAX)).is_empty());
        assert!(m.predecessors(c(i64::MAX)).is_empty());
    }

    #[test]
    fn validation_names_the_missing_cluster() {
        let m = sample();
        let t0 = BTreeSet::from([c(0), c(1)]);
        let t1 = BTreeSet::from([c(0), c(1), c(2)]);
        assert_eq!(m.validate_against(&t0, &t1), Ok(()));

        let short_t1 = BTreeSet::from([c(0), c(2)]);
        assert_eq!(
            m.validate_against(&t0, &short_t1),
            Err(MatrixError::UnknownCluster {
                side: Side::Right,
                id: c(1)
            })
        );
    }
}
