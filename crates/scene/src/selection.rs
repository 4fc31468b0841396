use std::collections::BTreeSet;

use foundation::ids::{AxisLabel, ClusterId, NodeId, Side, SidePair};
use serde::{Deserialize, Serialize};

/// A user selection in one of the linked views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// A matrix cell: row label `old` (t0), column label `new` (t1).
    CellSelected {
        old: AxisLabel,
        new: AxisLabel,
        value: u64,
    },
    NodeSelected {
        node: NodeId,
        cluster: ClusterId,
        side: Side,
    },
    /// A lasso drawn on one of the maps.
    RegionSelected {
        side: Side,
        lassoed: BTreeSet<NodeId>,
        clusters: BTreeSet<ClusterId>,
    },
    /// Stage click or reset.
    Cleared,
}

/// Which matrix cells a highlight covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellFocus {
    Cell { row: AxisLabel, col: AxisLabel },
    Row { cluster: ClusterId },
    Col { cluster: ClusterId },
}

impl CellFocus {
    pub fn covers(&self, row: AxisLabel, col: AxisLabel) -> bool {
        match *self {
            CellFocus::Cell { row: r, col: c } => r == row && c == col,
            CellFocus::Row { cluster } => row == AxisLabel::Cluster(cluster),
            CellFocus::Col { cluster } => col == AxisLabel::Cluster(cluster),
        }
    }
}

/// Lines picked directly by a lasso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lasso {
    pub side: Side,
    pub lines: BTreeSet<NodeId>,
}

/// Highlight state shared by every view. The default value is the
/// unhighlighted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Highlighted clusters per side; drives both graphs and both maps.
    pub clusters: SidePair<BTreeSet<ClusterId>>,
    pub cells: BTreeSet<CellFocus>,
    pub lasso: Option<Lasso>,
}

impl Highlight {
    pub fn is_empty(&self) -> bool {
        self.clusters.left.is_empty()
            && self.clusters.right.is_empty()
            && self.cells.is_empty()
            && self.lasso.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellFocus, Highlight, SelectionEvent};
    use foundation::ids::{AxisLabel, ClusterId, NodeId, Side};
    use pretty_assertions::assert_eq;

    #[test]
    fn focus_coverage() {
        let a = AxisLabel::Cluster(ClusterId::new(0));
        let b = AxisLabel::Cluster(ClusterId::new(1));
        let cell = CellFocus::Cell { row: a, col: b };
        assert!(cell.covers(a, b));
        assert!(!cell.covers(b, a));

        let row = CellFocus::Row {
            cluster: ClusterId::new(1),
        };
        assert!(row.covers(b, AxisLabel::NotPresent));
        assert!(!row.covers(a, b));

        let col = CellFocus::Col {
            cluster: ClusterId::new(0),
        };
        assert!(col.covers(AxisLabel::Cluster(ClusterId::NONE), a));
    }

    #[test]
    fn events_use_a_type_tag() {
        let event = SelectionEvent::NodeSelected {
            node: NodeId::from("n1"),
            cluster: ClusterId::new(2),
            side: Side::Right,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "node_selected", "node": "n1", "cluster": 2, "side": "right"})
        );
        let back: SelectionEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);

        let cell: SelectionEvent =
            serde_json::from_str(r#"{"type":"cell_selected","old":"-1","new":"-","value":0}"#)
                .unwrap();
        assert_eq!(
            cell,
            SelectionEvent::CellSelected {
                old: AxisLabel::Cluster(ClusterId::NONE),
                new: AxisLabel::NotPresent,
                value: 0
            }
        );
    }

    #[test]
    fn default_highlight_is_empty() {
        assert!(Highlight::default().is_empty());
    }
}
