use std::collections::BTreeSet;
use std::fmt;

use foundation::ids::Side;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    LeftGraph,
    RightGraph,
    LeftMap,
    RightMap,
    Table,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::LeftGraph,
        ViewKind::RightGraph,
        ViewKind::LeftMap,
        ViewKind::RightMap,
        ViewKind::Table,
    ];

    pub fn graph(side: Side) -> Self {
        match side {
            Side::Left => ViewKind::LeftGraph,
            Side::Right => ViewKind::RightGraph,
        }
    }

    pub fn map(side: Side) -> Self {
        match side {
            Side::Left => ViewKind::LeftMap,
            Side::Right => ViewKind::RightMap,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewKind::LeftGraph => "left graph",
            ViewKind::RightGraph => "right graph",
            ViewKind::LeftMap => "left map",
            ViewKind::RightMap => "right map",
            ViewKind::Table => "contingency table",
        };
        f.write_str(name)
    }
}

/// Names of the containers each view mounts into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MountNames {
    pub left_graph: String,
    pub right_graph: String,
    pub left_map: String,
    pub right_map: String,
    pub table: String,
}

impl Default for MountNames {
    fn default() -> Self {
        Self {
            left_graph: "left-network-container".to_string(),
            right_graph: "right-network-container".to_string(),
            left_map: "left-map-container".to_string(),
            right_map: "right-map-container".to_string(),
            table: "contingency-table".to_string(),
        }
    }
}

impl MountNames {
    pub fn name(&self, kind: ViewKind) -> &str {
        match kind {
            ViewKind::LeftGraph => &self.left_graph,
            ViewKind::RightGraph => &self.right_graph,
            ViewKind::LeftMap => &self.left_map,
            ViewKind::RightMap => &self.right_map,
            ViewKind::Table => &self.table,
        }
    }
}

/// Views whose mount point exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewMounts {
    attached: BTreeSet<ViewKind>,
}

impl ViewMounts {
    /// Every view attached.
    pub fn all() -> Self {
        Self {
            attached: ViewKind::ALL.into_iter().collect(),
        }
    }

    /// Attaches each view whose container is in `available`. A missing
    /// container is logged and its view stays detached.
    pub fn attach(names: &MountNames, available: &BTreeSet<String>) -> Self {
        let mut attached = BTreeSet::new();
        for kind in ViewKind::ALL {
            let name = names.name(kind);
            if available.contains(name) {
                attached.insert(kind);
            } else {
                error!(view = %kind, mount = name, "mount point not found; view detached");
            }
        }
        info!(attached = attached.len(), "views mounted");
        Self { attached }
    }

    pub fn is_attached(&self, kind: ViewKind) -> bool {
        self.attached.contains(&kind)
    }

    pub fn attached(&self) -> impl Iterator<Item = ViewKind> + '_ {
        self.attached.iter().copied()
    }
}

impl Default for ViewMounts {
    fn default() -> Self {
        Self::all()
    }
}
