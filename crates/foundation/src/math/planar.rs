//! Planar (pixel-space) geometry used by lasso selection.

use serde::{Deserialize, Serialize};

use crate::bounds::Aabb2;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// z component of the 3D cross product.
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Closed polygon; the last vertex connects back to the first.
///
/// A repeated closing vertex is harmless: the zero-length edge it creates
/// never straddles a ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    bounds: Option<Aabb2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        let bounds = Aabb2::from_points(&vertices);
        Self { vertices, bounds }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        self.bounds
    }

    /// A polygon needs three vertices to enclose anything.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Even-odd (ray casting) containment test.
    ///
    /// A horizontal ray is cast towards +x. An edge counts as a crossing when
    /// exactly one endpoint lies strictly above the point and the intersection
    /// x is strictly greater than the point's x. Horizontal edges never count.
    ///
    /// Boundary rule (half-open): points on a left or bottom edge are inside,
    /// points on a right or top edge are outside.
    pub fn contains(&self, p: Vec2) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// `true` if any vertex of `path` is inside, or any segment of `path`
    /// crosses an edge of the polygon.
    pub fn intersects_polyline(&self, path: &[Vec2]) -> bool {
        if self.is_degenerate() || path.is_empty() {
            return false;
        }
        if let (Some(pb), Some(lb)) = (self.bounds, Aabb2::from_points(path))
            && !pb.intersects(&lb)
        {
            return false;
        }
        if path.iter().any(|p| self.contains(*p)) {
            return true;
        }
        path.windows(2).any(|seg| {
            self.edges()
                .any(|(a, b)| segments_intersect(seg[0], seg[1], a, b))
        })
    }

    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Closed segment intersection, including collinear overlap and touching
/// endpoints.
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b - a).cross(c - a)
}

fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

#[cfg(test)]
mod tests {
    use super::{Polygon, Vec2, segments_intersect};

    fn square() -> Polygon {
        Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 0.0),
        ])
    }

    #[test]
    fn square_contains_center_not_outside() {
        let sq = square();
        assert!(sq.contains(Vec2::new(5.0, 5.0)));
        assert!(!sq.contains(Vec2::new(15.0, 5.0)));
        assert!(!sq.contains(Vec2::new(5.0, -1.0)));
    }

    #[test]
    fn boundary_rule_is_half_open() {
        let sq = square();
        assert!(sq.contains(Vec2::new(0.0, 5.0)));
        assert!(!sq.contains(Vec2::new(10.0, 5.0)));
        assert!(sq.contains(Vec2::new(5.0, 0.0)));
        assert!(!sq.contains(Vec2::new(5.0, 10.0)));
        // Repeated queries agree.
        assert_eq!(sq.contains(Vec2::new(0.0, 5.0)), sq.contains(Vec2::new(0.0, 5.0)));
    }

    #[test]
    fn explicit_closing_vertex_changes_nothing() {
        let mut verts = square().vertices().to_vec();
        verts.push(verts[0]);
        let closed = Polygon::new(verts);
        for p in [Vec2::new(5.0, 5.0), Vec2::new(15.0, 5.0), Vec2::new(0.0, 5.0)] {
            assert_eq!(closed.contains(p), square().contains(p));
        }
    }

    #[test]
    fn concave_polygon_uses_even_odd() {
        // U shape opening upwards.
        let u = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(9.0, 0.0),
            Vec2::new(9.0, 9.0),
            Vec2::new(6.0, 9.0),
            Vec2::new(6.0, 3.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(3.0, 9.0),
            Vec2::new(0.0, 9.0),
        ]);
        assert!(u.contains(Vec2::new(1.0, 6.0)));
        assert!(!u.contains(Vec2::new(4.5, 6.0)));
        assert!(u.contains(Vec2::new(4.5, 1.0)));
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        let line = Polygon::new(vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0)]);
        assert!(line.is_degenerate());
        assert!(!line.contains(Vec2::new(2.0, 2.0)));
        assert!(!Polygon::new(Vec::new()).contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn polyline_crossing_without_inner_vertex_intersects() {
        let sq = square();
        let through = [Vec2::new(-5.0, 5.0), Vec2::new(15.0, 5.0)];
        assert!(sq.intersects_polyline(&through));

        let beside = [Vec2::new(-5.0, -5.0), Vec2::new(-5.0, 15.0)];
        assert!(!sq.intersects_polyline(&beside));

        let far = [Vec2::new(100.0, 100.0), Vec2::new(120.0, 130.0)];
        assert!(!sq.intersects_polyline(&far));
    }

    #[test]
    fn segment_intersection_handles_touching_and_parallel() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 4.0);
        assert!(segments_intersect(a, b, Vec2::new(0.0, 4.0), Vec2::new(4.0, 0.0)));
        assert!(segments_intersect(a, b, Vec2::new(4.0, 4.0), Vec2::new(6.0, 1.0)));
        assert!(!segments_intersect(a, b, Vec2::new(1.0, 0.0), Vec2::new(5.0, 4.0)));
    }
}
