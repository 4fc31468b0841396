//! Lasso picking of trajectory lines.

use std::collections::BTreeSet;

use foundation::ids::NodeId;
use foundation::math::{LatLon, Polygon, Vec2, Viewport};

/// Projects a line into the container pixel space of `viewport`.
pub fn project_line(coords: &[LatLon], viewport: &Viewport) -> Vec<Vec2> {
    coords.iter().map(|c| viewport.to_container(*c)).collect()
}

/// Ids of every line whose projected path touches `lasso`.
///
/// `lasso` is in container pixels. A degenerate lasso picks nothing.
pub fn pick_lines<'a>(
    lines: impl IntoIterator<Item = (&'a NodeId, &'a [LatLon])>,
    lasso: &Polygon,
    viewport: &Viewport,
) -> BTreeSet<NodeId> {
    if lasso.is_degenerate() {
        return BTreeSet::new();
    }
    lines
        .into_iter()
        .filter(|(_, coords)| lasso.intersects_polyline(&project_line(coords, viewport)))
        .map(|(id, _)| id.clone())
        .collect()
}
