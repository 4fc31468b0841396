//! Wire types exchanged with the clustering backend.
//!
//! Shapes:
//! - network: `{nodes:[{id}], clusters:{clusterId:[{source,target,weight}]}, node_clusters:{nodeId:clusterId}}`
//! - lines: `[{id, coords:[{lat,lon}], centroid}]`
//! - contingency table: `number[][]`, sentinel row/column first

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use foundation::ids::{ClusterId, NodeId};
use foundation::math::{LatLon, StableF64};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkPayload {
    pub nodes: Vec<NodeRecord>,
    /// Intra-cluster links, grouped by cluster.
    #[serde(default)]
    pub clusters: BTreeMap<ClusterId, Vec<Link>>,
    #[serde(default)]
    pub node_clusters: BTreeMap<NodeId, ClusterId>,
}

impl NetworkPayload {
    pub fn cluster_map(&self) -> NodeClusterMap {
        NodeClusterMap::new(self.node_clusters.clone())
    }

    pub fn links(&self) -> impl Iterator<Item = (ClusterId, &Link)> {
        self.clusters
            .iter()
            .flat_map(|(cluster, links)| links.iter().map(move |l| (*cluster, l)))
    }
}

/// One trajectory line at one time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePayload {
    pub id: NodeId,
    pub coords: Vec<LatLon>,
    #[serde(default)]
    pub centroid: Option<LatLon>,
}

/// Node/trajectory id to cluster id for one side.
///
/// Lookups of unknown ids resolve to the *no cluster* sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeClusterMap(BTreeMap<NodeId, ClusterId>);

impl NodeClusterMap {
    pub fn new(map: BTreeMap<NodeId, ClusterId>) -> Self {
        Self(map)
    }

    pub fn cluster_of(&self, node: &NodeId) -> ClusterId {
        self.0.get(node).copied().unwrap_or(ClusterId::NONE)
    }

    /// Distinct real cluster ids, sorted.
    pub fn clusters(&self) -> BTreeSet<ClusterId> {
        self.0.values().filter_map(|c| c.real()).collect()
    }

    pub fn members(&self, cluster: ClusterId) -> impl Iterator<Item = &NodeId> {
        self.0
            .iter()
            .filter(move |(_, c)| **c == cluster)
            .map(|(n, _)| n)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, ClusterId)> {
        self.0.iter().map(|(n, c)| (n, *c))
    }
}

impl FromIterator<(NodeId, ClusterId)> for NodeClusterMap {
    fn from_iter<I: IntoIterator<Item = (NodeId, ClusterId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Jet,
    Mta,
}

impl LineType {
    pub fn as_str(self) -> &'static str {
        match self {
            LineType::Jet => "jet",
            LineType::Mta => "mta",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jet" => Ok(LineType::Jet),
            "mta" => Ok(LineType::Mta),
            other => Err(format!("unknown line type: {other}")),
        }
    }
}

/// Query parameters shared by every backend call of a session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Simulation start as `YYYYMMDDHH`.
    pub sim_start: String,
    pub dist_threshold: u32,
    pub required_ratio: StableF64,
    pub line_type: LineType,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            sim_start: "2024101900".to_string(),
            dist_threshold: 50,
            required_ratio: StableF64(0.05),
            line_type: LineType::Jet,
        }
    }
}
