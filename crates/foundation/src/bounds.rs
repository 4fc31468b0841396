use crate::math::Vec2;

/// Axis-aligned bounding box in a planar coordinate space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Tight box around `points`, or `None` when there are none.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = points.first()?;
        let mut min = [first.x, first.y];
        let mut max = [first.x, first.y];
        for p in points.iter().skip(1) {
            min[0] = min[0].min(p.x);
            min[1] = min[1].min(p.y);
            max[0] = max[0].max(p.x);
            max[1] = max[1].max(p.y);
        }
        Some(Aabb2::new(min, max))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.y >= self.min[1] && p.y <= self.max[1]
    }

    /// Closed-interval overlap test; touching boxes intersect.
    pub fn intersects(&self, other: &Aabb2) -> bool {
        self.min[0] <= other.max[0]
            && other.min[0] <= self.max[0]
            && self.min[1] <= other.max[1]
            && other.min[1] <= self.max[1]
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;
    use crate::math::Vec2;

    #[test]
    fn from_points_covers_all_points() {
        let pts = [Vec2::new(1.0, 5.0), Vec2::new(-2.0, 3.0), Vec2::new(4.0, -1.0)];
        let b = Aabb2::from_points(&pts).unwrap();
        assert_eq!(b, Aabb2::new([-2.0, -1.0], [4.0, 5.0]));
        assert!(pts.iter().all(|p| b.contains(*p)));
        assert!(Aabb2::from_points(&[]).is_none());
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb2::new([0.0, 0.0], [1.0, 1.0]);
        let b = Aabb2::new([1.0, 0.5], [2.0, 2.0]);
        let c = Aabb2::new([1.5, 1.5], [2.0, 2.0]);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
