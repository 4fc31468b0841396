use foundation::ids::{AxisLabel, ClusterId};
use serde::Serialize;
use tracing::debug;

use crate::greedy::greedy_match;
use crate::matrix::ContingencyMatrix;

/// A t0 cluster paired with the t1 cluster it sends the most trajectories to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPair {
    pub old: ClusterId,
    pub new: ClusterId,
    pub count: u64,
}

/// Axis order for displaying a contingency matrix.
///
/// Both axes start with the *no cluster* sentinel, continue with matched
/// clusters in match order followed by unmatched ones, and end with the
/// padding label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrespondenceOrdering {
    pub rows: Vec<AxisLabel>,
    pub cols: Vec<AxisLabel>,
    pub pairs: Vec<MatchedPair>,
}

impl CorrespondenceOrdering {
    pub fn from_matrix(matrix: &ContingencyMatrix) -> Self {
        let real = matrix.real_counts();
        let matching = greedy_match(&real);

        let pairs: Vec<MatchedPair> = matching
            .matches
            .iter()
            .map(|m| MatchedPair {
                old: ClusterId::new(m.row as i64),
                new: ClusterId::new(m.col as i64),
                count: m.count,
            })
            .collect();

        let rows = axis(&matching.row_order);
        let cols = axis(&matching.col_order);
        debug!(
            rows = rows.len(),
            cols = cols.len(),
            pairs = pairs.len(),
            "correspondence ordering built"
        );
        Self { rows, cols, pairs }
    }

    pub fn row_position(&self, label: AxisLabel) -> Option<usize> {
        self.rows.iter().position(|l| *l == label)
    }

    pub fn col_position(&self, label: AxisLabel) -> Option<usize> {
        self.cols.iter().position(|l| *l == label)
    }

    pub fn partner_of_old(&self, old: ClusterId) -> Option<ClusterId> {
        self.pairs.iter().find(|p| p.old == old).map(|p| p.new)
    }

    pub fn partner_of_new(&self, new: ClusterId) -> Option<ClusterId> {
        self.pairs.iter().find(|p| p.new == new).map(|p| p.old)
    }
}

fn axis(order: &[usize]) -> Vec<AxisLabel> {
    let mut labels = Vec::with_capacity(order.len() + 2);
    labels.push(AxisLabel::Cluster(ClusterId::NONE));
    labels.extend(
        order
            .iter()
            .map(|&i| AxisLabel::Cluster(ClusterId::new(i as i64))),
    );
    labels.push(AxisLabel::NotPresent);
    labels
}

#[cfg(test)]
mod tests {
    use super::{CorrespondenceOrdering, MatchedPair};
    use crate::matrix::ContingencyMatrix;
    use foundation::ids::{AxisLabel, ClusterId};
    use pretty_assertions::assert_eq;

    fn c(id: i64) -> AxisLabel {
        AxisLabel::Cluster(ClusterId::new(id))
    }

    #[test]
    fn sentinels_bracket_the_matched_order() {
        let matrix = ContingencyMatrix::from_rows(vec![
            vec![0, 3, 1],
            vec![2, 5, 1],
            vec![0, 2, 9],
        ])
        .unwrap();
        let ordering = CorrespondenceOrdering::from_matrix(&matrix);

        assert_eq!(ordering.rows, vec![c(-1), c(1), c(0), AxisLabel::NotPresent]);
        assert_eq!(ordering.cols, vec![c(-1), c(1), c(0), AxisLabel::NotPresent]);
        assert_eq!(
            ordering.pairs,
            vec![
                MatchedPair {
                    old: ClusterId::new(1),
                    new: ClusterId::new(1),
                    count: 9
                },
                MatchedPair {
                    old: ClusterId::new(0),
                    new: ClusterId::new(0),
                    count: 5
                },
            ]
        );
        assert_eq!(ordering.row_position(c(0)), Some(2));
        assert_eq!(ordering.col_position(AxisLabel::NotPresent), Some(3));
        assert_eq!(
            ordering.partner_of_new(ClusterId::new(1)),
            Some(ClusterId::new(1))
        );
    }

    #[test]
    fn uneven_cluster_counts_keep_every_id() {
        let matrix = ContingencyMatrix::from_rows(vec![
            vec![0, 0, 0, 0],
            vec![1, 0, 6, 0],
        ])
        .unwrap();
        let ordering = CorrespondenceOrdering::from_matrix(&matrix);

        assert_eq!(ordering.rows, vec![c(-1), c(0), AxisLabel::NotPresent]);
        assert_eq!(
            ordering.cols,
            vec![c(-1), c(1), c(0), c(2), AxisLabel::NotPresent]
        );
        assert_eq!(ordering.partner_of_old(ClusterId::new(0)), Some(ClusterId::new(1)));
    }

    #[test]
    fn sentinel_only_matrix_yields_bare_axes() {
        let matrix = ContingencyMatrix::from_rows(vec![vec![12]]).unwrap();
        let ordering = CorrespondenceOrdering::from_matrix(&matrix);
        assert_eq!(ordering.rows, vec![c(-1), AxisLabel::NotPresent]);
        assert!(ordering.pairs.is_empty());
    }

    #[test]
    fn serializes_labels_as_strings() {
        let matrix = ContingencyMatrix::from_rows(vec![vec![0, 0], vec![0, 4]]).unwrap();
        let ordering = CorrespondenceOrdering::from_matrix(&matrix);
        let json = serde_json::to_value(&ordering).unwrap();
        assert_eq!(json["rows"], serde_json::json!(["-1", "0", "-"]));
    }
}
