use std::collections::{BTreeMap, BTreeSet};

use foundation::ids::{ClusterId, NodeId, Side};
use foundation::math::{LatLon, Polygon, Viewport, normalize_antimeridian};
use serde::Serialize;
use streaming::{LinePayload, NodeClusterMap};

use crate::palette::{
    LINE_DEFAULT_WEIGHT, LINE_FADED, LINE_MEMBER, LINE_SELECTED, LINE_SENTINEL, LineStyle, Rgb,
    categorical,
};
use crate::picking::pick_lines;
use crate::selection::Highlight;
use crate::views::HighlightTarget;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineState {
    Default,
    Selected,
    /// In a lassoed cluster but not lassoed itself.
    Member,
    Faded,
}

#[derive(Debug, Clone, PartialEq)]
struct MapLine {
    id: NodeId,
    cluster: ClusterId,
    coords: Vec<LatLon>,
    centroid: Option<LatLon>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineInstruction {
    pub id: NodeId,
    pub cluster: ClusterId,
    pub state: LineState,
    #[serde(flatten)]
    pub style: LineStyle,
    pub coords: Vec<LatLon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<LatLon>,
}

/// Result of a lasso on one map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionPick {
    pub lassoed: BTreeSet<NodeId>,
    /// Distinct real clusters of the lassoed lines.
    pub clusters: BTreeSet<ClusterId>,
}

/// Trajectory lines of one side, antimeridian-normalized at load.
#[derive(Debug, Clone)]
pub struct MapView {
    side: Side,
    lines: Vec<MapLine>,
    colors: BTreeMap<ClusterId, Rgb>,
    states: BTreeMap<NodeId, LineState>,
}

impl MapView {
    pub fn new(side: Side, lines: &[LinePayload], clusters: &NodeClusterMap) -> Self {
        let lines: Vec<MapLine> = lines
            .iter()
            .map(|l| MapLine {
                id: l.id.clone(),
                cluster: clusters.cluster_of(&l.id),
                coords: normalize_antimeridian(&l.coords),
                centroid: l.centroid,
            })
            .collect();
        let ids: BTreeSet<ClusterId> = lines.iter().filter_map(|l| l.cluster.real()).collect();
        Self {
            side,
            lines,
            colors: categorical(&ids),
            states: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn state(&self, id: &NodeId) -> LineState {
        self.states.get(id).copied().unwrap_or(LineState::Default)
    }

    /// Lines whose rendered path touches `lasso` (container pixels).
    pub fn lasso(&self, lasso: &Polygon, viewport: &Viewport) -> RegionPick {
        let lassoed = pick_lines(
            self.lines.iter().map(|l| (&l.id, l.coords.as_slice())),
            lasso,
            viewport,
        );
        let clusters = self
            .lines
            .iter()
            .filter(|l| lassoed.contains(&l.id))
            .filter_map(|l| l.cluster.real())
            .collect();
        RegionPick { lassoed, clusters }
    }

    pub fn lines(&self) -> Vec<LineInstruction> {
        self.lines
            .iter()
            .map(|l| {
                let state = self.state(&l.id);
                LineInstruction {
                    id: l.id.clone(),
                    cluster: l.cluster,
                    state,
                    style: self.style(l, state),
                    coords: l.coords.clone(),
                    centroid: l.centroid,
                }
            })
            .collect()
    }

    fn style(&self, line: &MapLine, state: LineState) -> LineStyle {
        match state {
            LineState::Selected => LINE_SELECTED,
            LineState::Member => LINE_MEMBER,
            LineState::Faded => LINE_FADED,
            LineState::Default => match self.colors.get(&line.cluster) {
                Some(&color) => LineStyle {
                    color,
                    weight: LINE_DEFAULT_WEIGHT,
                },
                None => LINE_SENTINEL,
            },
        }
    }
}

impl HighlightTarget for MapView {
    fn apply(&mut self, highlight: &Highlight) {
        self.states.clear();
        if highlight.is_empty() {
            return;
        }
        let clusters = highlight.clusters.get(self.side);
        let lasso = highlight.lasso.as_ref().filter(|l| l.side == self.side);
        for line in &self.lines {
            let in_cluster = clusters.contains(&line.cluster);
            let state = match lasso {
                Some(lasso) if lasso.lines.contains(&line.id) => LineState::Selected,
                Some(_) if in_cluster => LineState::Member,
                None if in_cluster => LineState::Selected,
                _ => LineState::Faded,
            };
            self.states.insert(line.id.clone(), state);
        }
    }
}
