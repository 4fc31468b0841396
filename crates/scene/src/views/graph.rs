use std::collections::BTreeSet;
use std::sync::Arc;

use foundation::ids::{ClusterId, NodeId, Side};
use serde::Serialize;
use streaming::{NetworkPayload, NodeClusterMap};

use crate::palette::{
    EDGE_HIGH, EDGE_LOW, EDGE_SIZE, LinearScale, NODE_DEFAULT, NODE_SELECTED, NODE_SENTINEL,
    NodeStyle, Rgb,
};
use crate::selection::Highlight;
use crate::views::HighlightTarget;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInstruction {
    pub id: NodeId,
    /// Shown in the node tooltip.
    pub cluster: ClusterId,
    #[serde(flatten)]
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeInstruction {
    pub source: NodeId,
    pub target: NodeId,
    pub cluster: ClusterId,
    pub weight: f64,
    pub color: Rgb,
    pub size: f64,
}

/// Node/link graph of one side. Layout is left to the renderer.
#[derive(Debug, Clone)]
pub struct GraphView {
    side: Side,
    network: Arc<NetworkPayload>,
    clusters: NodeClusterMap,
    edge_scale: Option<LinearScale>,
    selected: BTreeSet<ClusterId>,
}

impl GraphView {
    pub fn new(side: Side, network: Arc<NetworkPayload>, clusters: NodeClusterMap) -> Self {
        let edge_scale =
            LinearScale::spanning(network.links().map(|(_, l)| l.weight), EDGE_LOW, EDGE_HIGH);
        Self {
            side,
            network,
            clusters,
            edge_scale,
            selected: BTreeSet::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn selected_clusters(&self) -> &BTreeSet<ClusterId> {
        &self.selected
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.network.nodes.iter().any(|n| &n.id == node)
    }

    pub fn nodes(&self) -> Vec<NodeInstruction> {
        self.network
            .nodes
            .iter()
            .map(|n| {
                let cluster = self.clusters.cluster_of(&n.id);
                let style = if cluster.is_sentinel() {
                    NODE_SENTINEL
                } else if self.selected.contains(&cluster) {
                    NODE_SELECTED
                } else {
                    NODE_DEFAULT
                };
                NodeInstruction {
                    id: n.id.clone(),
                    cluster,
                    style,
                }
            })
            .collect()
    }

    pub fn edges(&self) -> Vec<EdgeInstruction> {
        self.network
            .links()
            .map(|(cluster, link)| EdgeInstruction {
                source: link.source.clone(),
                target: link.target.clone(),
                cluster,
                weight: link.weight,
                color: self
                    .edge_scale
                    .map_or(EDGE_LOW, |scale| scale.color(link.weight)),
                size: EDGE_SIZE,
            })
            .collect()
    }
}

impl HighlightTarget for GraphView {
    fn apply(&mut self, highlight: &Highlight) {
        self.selected = highlight.clusters.get(self.side).clone();
    }
}
