use std::collections::BTreeSet;

use foundation::ids::{ClusterId, NodeId, Side, SidePair};
use foundation::time::TimeOffset;
use matching::{ContingencyMatrix, CorrespondenceOrdering, MatrixError};
use streaming::NodeClusterMap;

use crate::selection::{CellFocus, Highlight, Lasso, SelectionEvent};

/// Everything needed to relate clusters across one pair of time steps.
///
/// Built once per query and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Correspondence {
    pub t0: TimeOffset,
    pub t1: TimeOffset,
    pub maps: SidePair<NodeClusterMap>,
    pub matrix: ContingencyMatrix,
    pub ordering: CorrespondenceOrdering,
}

impl Correspondence {
    /// Validates `matrix` against both cluster maps and orders its axes.
    pub fn new(
        t0: TimeOffset,
        maps: SidePair<NodeClusterMap>,
        matrix: ContingencyMatrix,
    ) -> Result<Self, MatrixError> {
        matrix.validate_against(&maps.left.clusters(), &maps.right.clusters())?;
        let ordering = CorrespondenceOrdering::from_matrix(&matrix);
        Ok(Self {
            t0,
            t1: t0.paired(),
            maps,
            matrix,
            ordering,
        })
    }

    pub fn offset(&self, side: Side) -> TimeOffset {
        match side {
            Side::Left => self.t0,
            Side::Right => self.t1,
        }
    }

    pub fn cluster_of(&self, side: Side, node: &NodeId) -> ClusterId {
        self.maps.get(side).cluster_of(node)
    }

    /// Highlight produced by `event`.
    ///
    /// `None` means the event selects nothing real (a cell with a sentinel
    /// or padding axis, a sentinel node, or an empty lasso) and the current
    /// highlight should stay as it is.
    pub fn translate(&self, event: &SelectionEvent) -> Option<Highlight> {
        match event {
            SelectionEvent::Cleared => Some(Highlight::default()),
            SelectionEvent::CellSelected { old, new, .. } => {
                // A cell on the sentinel or padding row/column selects nothing.
                let t0 = old.cluster().and_then(ClusterId::real)?;
                let t1 = new.cluster().and_then(ClusterId::real)?;
                let mut highlight = Highlight::default();
                highlight.clusters.left.insert(t0);
                highlight.clusters.right.insert(t1);
                highlight.cells.insert(CellFocus::Cell {
                    row: *old,
                    col: *new,
                });
                Some(highlight)
            }
            SelectionEvent::NodeSelected { cluster, side, .. } => {
                self.spread(*side, cluster.real().into_iter().collect(), None)
            }
            SelectionEvent::RegionSelected {
                side,
                lassoed,
                clusters,
            } => {
                let real = clusters.iter().filter_map(|c| c.real()).collect();
                let lasso = Lasso {
                    side: *side,
                    lines: lassoed.clone(),
                };
                self.spread(*side, real, Some(lasso))
            }
        }
    }

    /// Highlights `clusters` on `side`, their matrix rows or columns, and
    /// every cluster they reach on the other side.
    fn spread(
        &self,
        side: Side,
        clusters: BTreeSet<ClusterId>,
        lasso: Option<Lasso>,
    ) -> Option<Highlight> {
        if clusters.is_empty() {
            return None;
        }
        let mut highlight = Highlight::default();
        for &cluster in &clusters {
            highlight
                .clusters
                .get_mut(side.opposite())
                .extend(self.matrix.reachable(side, cluster));
            highlight.cells.insert(match side {
                Side::Left => CellFocus::Row { cluster },
                Side::Right => CellFocus::Col { cluster },
            });
        }
        *highlight.clusters.get_mut(side) = clusters;
        highlight.lasso = lasso;
        Some(highlight)
    }
}
