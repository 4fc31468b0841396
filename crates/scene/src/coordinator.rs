//! Selection/highlight coordination across the linked views.
//!
//! Each attached view subscribes to the selection bus and restyles itself
//! from the translated highlight. Dispatch is synchronous and follows
//! registration order: event log, highlight record, graphs, maps, table.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use foundation::ids::{AxisLabel, NodeId, Side, SidePair};
use foundation::math::{Polygon, Vec2, Viewport};
use foundation::time::TimeOffset;
use matching::{ContingencyMatrix, CorrespondenceOrdering, MatrixError};
use parking_lot::Mutex;
use runtime::EventBus;
use serde::Serialize;
use streaming::{LinePayload, NetworkPayload};
use tracing::debug;

use crate::correspondence::Correspondence;
use crate::mounts::{ViewKind, ViewMounts};
use crate::selection::{Highlight, SelectionEvent};
use crate::views::{
    CellInstruction, EdgeInstruction, GraphView, HighlightTarget, LineInstruction, MapView,
    NodeInstruction, RegionPick, TableView,
};

/// Payloads of one query, t0 on the left and t1 on the right.
#[derive(Debug, Clone)]
pub struct StepData {
    pub t0: TimeOffset,
    pub networks: SidePair<Arc<NetworkPayload>>,
    pub lines: SidePair<Arc<Vec<LinePayload>>>,
    pub table: Vec<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    UnknownLabel(AxisLabel),
    UnknownNode { side: Side, node: NodeId },
    /// No matrix cell at ordered position (`x`, `y`).
    NoCell { x: usize, y: usize },
    Detached(ViewKind),
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectError::UnknownLabel(label) => write!(f, "no matrix axis label {label}"),
            SelectError::UnknownNode { side, node } => {
                write!(f, "no node {node} in the {side} graph")
            }
            SelectError::NoCell { x, y } => write!(f, "no matrix cell at column {x}, row {y}"),
            SelectError::Detached(kind) => write!(f, "the {kind} view is not mounted"),
        }
    }
}

impl std::error::Error for SelectError {}

type Shared<V> = Arc<Mutex<V>>;

pub struct Coordinator {
    bus: EventBus<SelectionEvent>,
    correspondence: Arc<Correspondence>,
    mounts: ViewMounts,
    highlight: Shared<Highlight>,
    graphs: SidePair<Option<Shared<GraphView>>>,
    maps: SidePair<Option<Shared<MapView>>>,
    table: Option<Shared<TableView>>,
}

impl Coordinator {
    /// Validates the step's matrix and builds the attached views.
    pub fn build(data: &StepData, mounts: ViewMounts) -> Result<Self, MatrixError> {
        let maps = data.networks.as_ref().map(|_, n| n.cluster_map());
        let matrix = ContingencyMatrix::from_rows(data.table.clone())?;
        let correspondence = Arc::new(Correspondence::new(data.t0, maps, matrix)?);

        let graphs = data.networks.as_ref().map(|side, network| {
            mounts.is_attached(ViewKind::graph(side)).then(|| {
                shared(GraphView::new(
                    side,
                    Arc::clone(network),
                    correspondence.maps.get(side).clone(),
                ))
            })
        });
        let line_views = data.lines.as_ref().map(|side, lines| {
            mounts
                .is_attached(ViewKind::map(side))
                .then(|| shared(MapView::new(side, lines, correspondence.maps.get(side))))
        });
        let table = mounts.is_attached(ViewKind::Table).then(|| {
            shared(TableView::new(
                correspondence.matrix.clone(),
                correspondence.ordering.clone(),
            ))
        });

        let mut coordinator = Self {
            bus: EventBus::new(),
            correspondence,
            mounts,
            highlight: shared(Highlight::default()),
            graphs,
            maps: line_views,
            table,
        };
        coordinator.wire();
        debug!(
            t0 = %coordinator.correspondence.t0,
            subscribers = coordinator.bus.subscriber_count(),
            "coordinator ready"
        );
        Ok(coordinator)
    }

    fn wire(&mut self) {
        self.bus
            .subscribe(|event: &SelectionEvent| debug!(?event, "selection event"));

        let record = Arc::clone(&self.highlight);
        let correspondence = Arc::clone(&self.correspondence);
        self.bus.subscribe(move |event: &SelectionEvent| {
            if let Some(highlight) = correspondence.translate(event) {
                *record.lock() = highlight;
            }
        });

        for side in Side::BOTH {
            if let Some(view) = self.graphs.get(side).clone() {
                self.subscribe_view(view);
            }
        }
        for side in Side::BOTH {
            if let Some(view) = self.maps.get(side).clone() {
                self.subscribe_view(view);
            }
        }
        if let Some(view) = self.table.clone() {
            self.subscribe_view(view);
        }
    }

    fn subscribe_view<V: HighlightTarget + 'static>(&mut self, view: Shared<V>) {
        let correspondence = Arc::clone(&self.correspondence);
        self.bus.subscribe(move |event: &SelectionEvent| {
            if let Some(highlight) = correspondence.translate(event) {
                view.lock().apply(&highlight);
            }
        });
    }

    pub fn correspondence(&self) -> &Correspondence {
        &self.correspondence
    }

    pub fn mounts(&self) -> &ViewMounts {
        &self.mounts
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight.lock().clone()
    }

    /// Publishes `event` to every subscriber.
    pub fn emit(&mut self, event: SelectionEvent) {
        self.bus.publish(&event);
    }

    pub fn select_cell(&mut self, old: AxisLabel, new: AxisLabel) -> Result<(), SelectError> {
        let ordering = &self.correspondence.ordering;
        if ordering.row_position(old).is_none() {
            return Err(SelectError::UnknownLabel(old));
        }
        if ordering.col_position(new).is_none() {
            return Err(SelectError::UnknownLabel(new));
        }
        let value = self.correspondence.matrix.label_value(old, new);
        self.emit(SelectionEvent::CellSelected { old, new, value });
        Ok(())
    }

    /// Selects the cell drawn at ordered position (`x`, `y`) in the table.
    pub fn click_cell(&mut self, x: usize, y: usize) -> Result<(), SelectError> {
        let table = self
            .table
            .clone()
            .ok_or(SelectError::Detached(ViewKind::Table))?;
        let event = table.lock().click(x, y).ok_or(SelectError::NoCell { x, y })?;
        self.emit(event);
        Ok(())
    }

    pub fn select_node(&mut self, side: Side, node: NodeId) -> Result<(), SelectError> {
        let known = self.correspondence.maps.get(side).iter().any(|(n, _)| *n == node)
            || self
                .graphs
                .get(side)
                .as_ref()
                .is_some_and(|g| g.lock().contains_node(&node));
        if !known {
            return Err(SelectError::UnknownNode { side, node });
        }
        let cluster = self.correspondence.cluster_of(side, &node);
        self.emit(SelectionEvent::NodeSelected {
            node,
            cluster,
            side,
        });
        Ok(())
    }

    /// Lassoes lines on the `side` map. `polygon` is in container pixels.
    pub fn select_region(
        &mut self,
        side: Side,
        polygon: Vec<Vec2>,
        viewport: &Viewport,
    ) -> Result<RegionPick, SelectError> {
        let kind = ViewKind::map(side);
        let map = self.maps.get(side).clone().ok_or(SelectError::Detached(kind))?;
        let pick = map.lock().lasso(&Polygon::new(polygon), viewport);
        self.emit(SelectionEvent::RegionSelected {
            side,
            lassoed: pick.lassoed.clone(),
            clusters: pick.clusters.clone(),
        });
        Ok(pick)
    }

    pub fn clear(&mut self) {
        self.emit(SelectionEvent::Cleared);
    }

    pub fn snapshot(&self) -> Snapshot {
        let graphs = self.graphs.as_ref().map(|_, g| {
            g.as_ref().map(|g| {
                let g = g.lock();
                GraphSnapshot {
                    nodes: g.nodes(),
                    edges: g.edges(),
                }
            })
        });
        let maps = self
            .maps
            .as_ref()
            .map(|_, m| m.as_ref().map(|m| m.lock().lines()));
        let table = self.table.as_ref().map(|t| {
            let t = t.lock();
            TableSnapshot {
                rows: t.ordering().rows.clone(),
                cols: t.ordering().cols.clone(),
                cells: t.cells(),
            }
        });
        Snapshot {
            t0: self.correspondence.t0,
            t1: self.correspondence.t1,
            highlight: self.highlight(),
            ordering: self.correspondence.ordering.clone(),
            graphs,
            maps,
            table,
        }
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("t0", &self.correspondence.t0)
            .field("bus", &self.bus)
            .field("mounts", &self.mounts)
            .finish()
    }
}

fn shared<V>(view: V) -> Shared<V> {
    Arc::new(Mutex::new(view))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeInstruction>,
    pub edges: Vec<EdgeInstruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub rows: Vec<AxisLabel>,
    pub cols: Vec<AxisLabel>,
    pub cells: Vec<CellInstruction>,
}

/// Render instructions for every attached view. Detached views are `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub t0: TimeOffset,
    pub t1: TimeOffset,
    pub highlight: Highlight,
    pub ordering: CorrespondenceOrdering,
    pub graphs: SidePair<Option<GraphSnapshot>>,
    pub maps: SidePair<Option<Vec<LineInstruction>>>,
    pub table: Option<TableSnapshot>,
}

impl Snapshot {
    pub fn lassoed(&self, side: Side) -> BTreeSet<NodeId> {
        match &self.highlight.lasso {
            Some(lasso) if lasso.side == side => lasso.lines.clone(),
            _ => BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coordinator, SelectError, StepData};
    use crate::mounts::{MountNames, ViewKind, ViewMounts};
    use crate::palette::{NODE_DEFAULT, NODE_SELECTED};
    use crate::selection::{CellFocus, Highlight};
    use crate::views::LineState;
    use foundation::ids::{AxisLabel, ClusterId, NodeId, Side, SidePair};
    use foundation::math::{LatLon, Vec2, Viewport, project};
    use foundation::time::TimeOffset;
    use matching::MatrixError;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use streaming::{LinePayload, NetworkPayload, NodeRecord};

    fn network(pairs: &[(&str, i64)]) -> NetworkPayload {
        NetworkPayload {
            nodes: pairs
                .iter()
                .map(|(n, _)| NodeRecord { id: NodeId::from(*n) })
                .collect(),
            clusters: Default::default(),
            node_clusters: pairs
                .iter()
                .map(|(n, c)| (NodeId::from(*n), ClusterId::new(*c)))
                .collect(),
        }
    }

    fn lines(points: &[(&str, f64, f64)]) -> Vec<LinePayload> {
        points
            .iter()
            .map(|(id, lat, lon)| LinePayload {
                id: NodeId::from(*id),
                coords: vec![LatLon::new(*lat, *lon), LatLon::new(*lat + 0.5, *lon + 0.5)],
                centroid: None,
            })
            .collect()
    }

    fn step() -> StepData {
        StepData {
            t0: TimeOffset(0),
            networks: SidePair::new(
                Arc::new(network(&[("a", 0), ("b", 1), ("x", -1)])),
                Arc::new(network(&[("a", 1), ("b", 0), ("x", -1)])),
            ),
            lines: SidePair::new(
                Arc::new(lines(&[("a", 0.0, 0.0), ("b", 30.0, 30.0), ("x", -40.0, 100.0)])),
                Arc::new(lines(&[("a", 0.0, 3.0), ("b", 30.0, 33.0), ("x", -40.0, 103.0)])),
            ),
            // t0 cluster 0 moved to t1 cluster 1 and vice versa.
            table: vec![vec![1, 0, 0], vec![0, 0, 4], vec![0, 6, 0]],
        }
    }

    fn label(id: i64) -> AxisLabel {
        AxisLabel::Cluster(ClusterId::new(id))
    }

    #[test]
    fn ordering_and_default_snapshot() {
        let coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.t1, TimeOffset(3));
        assert_eq!(
            snapshot.ordering.rows,
            vec![label(-1), label(1), label(0), AxisLabel::NotPresent]
        );
        assert_eq!(
            snapshot.ordering.cols,
            vec![label(-1), label(0), label(1), AxisLabel::NotPresent]
        );
        assert!(snapshot.highlight.is_empty());
        let left = snapshot.graphs.left.unwrap();
        assert!(left.nodes.iter().all(|n| n.cluster.is_sentinel() || n.style == NODE_DEFAULT));
    }

    #[test]
    fn cell_selection_round_trip() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        coordinator.select_cell(label(0), label(1)).unwrap();

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.highlight.clusters.left, BTreeSet::from([ClusterId::new(0)]));
        assert_eq!(snapshot.highlight.clusters.right, BTreeSet::from([ClusterId::new(1)]));

        let left = snapshot.graphs.left.unwrap();
        let a = left.nodes.iter().find(|n| n.id == NodeId::from("a")).unwrap();
        assert_eq!(a.style, NODE_SELECTED);
        let right = snapshot.graphs.right.unwrap();
        let b = right.nodes.iter().find(|n| n.id == NodeId::from("b")).unwrap();
        assert_eq!(b.style, NODE_DEFAULT);

        let right_lines = snapshot.maps.right.unwrap();
        let a_line = right_lines.iter().find(|l| l.id == NodeId::from("a")).unwrap();
        assert_eq!(a_line.state, LineState::Selected);

        let table = snapshot.table.unwrap();
        let stroked: Vec<_> = table.cells.iter().filter(|c| c.stroke.is_some()).collect();
        assert_eq!(stroked.len(), 1);
        assert_eq!((stroked[0].row, stroked[0].col, stroked[0].value), (label(0), label(1), 4));
    }

    #[test]
    fn node_selection_highlights_reachable_clusters() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        coordinator.select_node(Side::Right, NodeId::from("b")).unwrap();
        let highlight = coordinator.highlight();
        assert_eq!(highlight.clusters.right, BTreeSet::from([ClusterId::new(0)]));
        assert_eq!(highlight.clusters.left, BTreeSet::from([ClusterId::new(1)]));
        assert_eq!(
            highlight.cells,
            BTreeSet::from([CellFocus::Col {
                cluster: ClusterId::new(0)
            }])
        );
    }

    #[test]
    fn sentinel_selection_keeps_the_previous_highlight() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        coordinator.select_node(Side::Left, NodeId::from("a")).unwrap();
        let before = coordinator.snapshot();

        coordinator.select_node(Side::Left, NodeId::from("x")).unwrap();
        coordinator.select_cell(label(-1), AxisLabel::NotPresent).unwrap();
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn half_sentinel_cell_marks_nothing() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        let fresh = coordinator.snapshot();

        coordinator.select_cell(label(-1), label(1)).unwrap();
        coordinator.select_cell(label(0), AxisLabel::NotPresent).unwrap();

        let snapshot = coordinator.snapshot();
        assert!(snapshot.highlight.is_empty());
        let table = snapshot.table.as_ref().unwrap();
        assert!(table.cells.iter().all(|c| c.stroke.is_none() && c.opacity == 1.0));
        for side in Side::BOTH {
            let lines = snapshot.maps.get(side).as_ref().unwrap();
            assert!(lines.iter().all(|l| l.state == LineState::Default));
        }
        assert_eq!(snapshot, fresh);
    }

    #[test]
    fn clicking_a_table_position_selects_its_cell() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        // Rows are [-1, 1, 0, -] and columns [-1, 0, 1, -].
        coordinator.click_cell(2, 2).unwrap();
        let highlight = coordinator.highlight();
        assert_eq!(highlight.clusters.left, BTreeSet::from([ClusterId::new(0)]));
        assert_eq!(highlight.clusters.right, BTreeSet::from([ClusterId::new(1)]));
        assert_eq!(
            highlight.cells,
            BTreeSet::from([CellFocus::Cell {
                row: label(0),
                col: label(1)
            }])
        );

        assert_eq!(
            coordinator.click_cell(4, 0),
            Err(SelectError::NoCell { x: 4, y: 0 })
        );
        let mounts = ViewMounts::attach(&MountNames::default(), &BTreeSet::new());
        let mut detached = Coordinator::build(&step(), mounts).unwrap();
        assert_eq!(
            detached.click_cell(1, 1),
            Err(SelectError::Detached(ViewKind::Table))
        );
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        assert_eq!(
            coordinator.select_cell(label(7), label(0)),
            Err(SelectError::UnknownLabel(label(7)))
        );
        assert_eq!(
            coordinator.select_node(Side::Left, NodeId::from("nope")),
            Err(SelectError::UnknownNode {
                side: Side::Left,
                node: NodeId::from("nope")
            })
        );
    }

    #[test]
    fn lasso_selects_lines_and_members() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        let viewport = Viewport::new(2.0, Vec2::new(0.0, 0.0));
        let p = project(LatLon::new(0.0, 0.0), 2.0);
        let polygon = vec![
            Vec2::new(p.x - 2.0, p.y - 2.0),
            Vec2::new(p.x + 2.0, p.y - 2.0),
            Vec2::new(p.x + 2.0, p.y + 2.0),
            Vec2::new(p.x - 2.0, p.y + 2.0),
        ];
        let pick = coordinator
            .select_region(Side::Left, polygon, &viewport)
            .unwrap();
        assert_eq!(pick.lassoed, BTreeSet::from([NodeId::from("a")]));

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.lassoed(Side::Left), BTreeSet::from([NodeId::from("a")]));
        assert_eq!(snapshot.highlight.clusters.right, BTreeSet::from([ClusterId::new(1)]));
        let left = snapshot.maps.left.unwrap();
        let state = |id: &str| left.iter().find(|l| l.id == NodeId::from(id)).unwrap().state;
        assert_eq!(state("a"), LineState::Selected);
        assert_eq!(state("b"), LineState::Faded);
    }

    #[test]
    fn clear_restores_defaults() {
        let mut coordinator = Coordinator::build(&step(), ViewMounts::all()).unwrap();
        coordinator.select_cell(label(1), label(0)).unwrap();
        coordinator.clear();
        assert_eq!(coordinator.highlight(), Highlight::default());
        let table = coordinator.snapshot().table.unwrap();
        assert!(table.cells.iter().all(|c| c.stroke.is_none() && c.opacity == 1.0));
    }

    #[test]
    fn detached_views_are_absent_and_do_not_break_others() {
        let available: BTreeSet<String> = ["left-network-container", "contingency-table"]
            .into_iter()
            .map(String::from)
            .collect();
        let mounts = ViewMounts::attach(&MountNames::default(), &available);
        let mut coordinator = Coordinator::build(&step(), mounts).unwrap();

        coordinator.select_cell(label(0), label(1)).unwrap();
        let snapshot = coordinator.snapshot();
        assert!(snapshot.graphs.right.is_none());
        assert!(snapshot.maps.left.is_none());
        assert!(snapshot.table.is_some());
        assert_eq!(
            coordinator.select_region(Side::Left, vec![], &Viewport::new(0.0, Vec2::new(0.0, 0.0))),
            Err(SelectError::Detached(ViewKind::LeftMap))
        );
    }

    #[test]
    fn malformed_tables_fail_to_build() {
        let mut data = step();
        data.table = vec![vec![1, 0], vec![0]];
        assert!(matches!(
            Coordinator::build(&data, ViewMounts::all()),
            Err(MatrixError::Ragged { .. })
        ));

        let mut data = step();
        data.table = vec![vec![0, 0, 0, 0], vec![0, 0, 0, 0], vec![0, 0, 0, 0]];
        assert!(matches!(
            Coordinator::build(&data, ViewMounts::all()),
            Err(MatrixError::UnknownCluster { side: Side::Right, .. })
        ));
    }
}
