use std::fmt;

use serde::{Deserialize, Serialize};

/// Cluster label assigned to a trajectory at one time step.
///
/// `-1` is the *no cluster* sentinel. It never takes part in matching or in
/// highlight-by-value lookups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(i64);

impl ClusterId {
    pub const NONE: ClusterId = ClusterId(-1);

    pub const fn new(raw: i64) -> Self {
        ClusterId(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn is_sentinel(self) -> bool {
        self.0 < 0
    }

    /// Returns `Some(self)` for real clusters and `None` for the sentinel.
    pub fn real(self) -> Option<ClusterId> {
        (!self.is_sentinel()).then_some(self)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a graph node, which is also the id of its trajectory line.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Which of the two compared time steps a view belongs to.
///
/// `Left` is t0, `Right` is t1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePair<T> {
    pub left: T,
    pub right: T,
}

impl<T> SidePair<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> SidePair<U> {
        SidePair {
            left: f(Side::Left, self.left),
            right: f(Side::Right, self.right),
        }
    }

    pub fn as_ref(&self) -> SidePair<&T> {
        SidePair {
            left: &self.left,
            right: &self.right,
        }
    }
}

/// Label on one axis of the contingency matrix.
///
/// `NotPresent` is the synthesized padding label rendered as `"-"`; it never
/// comes from the backend matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AxisLabel {
    Cluster(ClusterId),
    NotPresent,
}

impl AxisLabel {
    pub fn cluster(self) -> Option<ClusterId> {
        match self {
            AxisLabel::Cluster(id) => Some(id),
            AxisLabel::NotPresent => None,
        }
    }

    /// `true` for both the *no cluster* sentinel and the padding label.
    pub fn is_sentinel(self) -> bool {
        match self {
            AxisLabel::Cluster(id) => id.is_sentinel(),
            AxisLabel::NotPresent => true,
        }
    }
}

impl fmt::Display for AxisLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisLabel::Cluster(id) => write!(f, "{id}"),
            AxisLabel::NotPresent => f.write_str("-"),
        }
    }
}

impl From<AxisLabel> for String {
    fn from(label: AxisLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for AxisLabel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "-" {
            return Ok(AxisLabel::NotPresent);
        }
        s.parse::<i64>()
            .map(|raw| AxisLabel::Cluster(ClusterId::new(raw)))
            .map_err(|_| format!("invalid axis label: {s:?}"))
    }
}
