//! Line segment operations in the plane.
//!
//! Walls, navigable links and sight connectors are all segments; the
//! intersection test counts touching endpoints as an intersection, which is
//! what the visibility queries rely on.

use crate::geom::point::Point;
use crate::geom::EPS;

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn centre(&self) -> Point {
        (self.p1 + self.p2) * 0.5
    }

    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).length()
    }

    /// Unit normal of the segment direction.
    pub fn normal_vec(&self) -> Point {
        let d = (self.p2 - self.p1).normalized();
        Point::new(-d.y, d.x)
    }

    /// Perpendicular foot of `p` on the carrier line of this segment.
    pub fn foot_point(&self, p: Point) -> Point {
        let d = self.p2 - self.p1;
        let len_sq = d.dot(&d);
        if len_sq < EPS {
            return self.p1;
        }
        let t = (p - self.p1).dot(&d) / len_sq;
        self.p1 + d * t
    }

    /// Checks whether a point on the carrier line lies within the segment
    /// bounds (endpoints included).
    pub fn within_segment(&self, p: Point) -> bool {
        let d = self.p2 - self.p1;
        let len_sq = d.dot(&d);
        if len_sq < EPS {
            return p.is_close(&self.p1);
        }
        let t = (p - self.p1).dot(&d) / len_sq;
        (-EPS..=1.0 + EPS).contains(&t)
    }

    /// Distance from `p` to the segment.
    pub fn dist_to(&self, p: Point) -> f64 {
        let foot = self.foot_point(p);
        if self.within_segment(foot) {
            (p - foot).length()
        } else {
            (p - self.p1).length().min((p - self.p2).length())
        }
    }

    /// Checks whether two segments intersect. Touching endpoints and
    /// collinear overlap count as intersection.
    pub fn intersects(&self, other: &Line) -> bool {
        let d1 = area2(self.p1, self.p2, other.p1);
        let d2 = area2(self.p1, self.p2, other.p2);
        let d3 = area2(other.p1, other.p2, self.p1);
        let d4 = area2(other.p1, other.p2, self.p2);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1.abs() < EPS && in_bbox(self, other.p1))
            || (d2.abs() < EPS && in_bbox(self, other.p2))
            || (d3.abs() < EPS && in_bbox(other, self.p1))
            || (d4.abs() < EPS && in_bbox(other, self.p2))
    }

    /// Endpoint equality regardless of orientation.
    pub fn is_same(&self, other: &Line) -> bool {
        (self.p1.is_close(&other.p1) && self.p2.is_close(&other.p2))
            || (self.p1.is_close(&other.p2) && self.p2.is_close(&other.p1))
    }
}

/// Twice the signed area of the triangle (a, b, c).
fn area2(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(&(c - a))
}

/// Checks whether a point known to be collinear with `seg` falls within its
/// bounding box.
fn in_bbox(seg: &Line, p: Point) -> bool {
    p.x >= seg.p1.x.min(seg.p2.x) - EPS
        && p.x <= seg.p1.x.max(seg.p2.x) + EPS
        && p.y >= seg.p1.y.min(seg.p2.y) - EPS
        && p.y <= seg.p1.y.max(seg.p2.y) + EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_and_length() {
        let l = Line::new(Point::new(0., 0.), Point::new(4., 0.));
        assert!(l.centre().is_close(&Point::new(2., 0.)));
        assert!((l.length() - 4.).abs() < EPS);
    }

    #[test]
    fn test_normal_vec() {
        let l = Line::new(Point::new(0., 0.), Point::new(1., 0.));
        assert!(l.normal_vec().is_close(&Point::new(0., 1.)));
    }

    #[test]
    fn test_dist_to() {
        let l = Line::new(Point::new(0., 0.), Point::new(4., 0.));
        assert!((l.dist_to(Point::new(2., 3.)) - 3.).abs() < EPS);
        // beyond the endpoint the distance is measured to the endpoint
        assert!((l.dist_to(Point::new(7., 4.)) - 5.).abs() < EPS);
    }

    #[test]
    fn test_foot_point_within_segment() {
        let l = Line::new(Point::new(0., 0.), Point::new(4., 0.));
        let foot = l.foot_point(Point::new(1., 5.));
        assert!(foot.is_close(&Point::new(1., 0.)));
        assert!(l.within_segment(foot));
        assert!(!l.within_segment(Point::new(5., 0.)));
    }

    #[test]
    fn test_intersects_crossing() {
        let a = Line::new(Point::new(0., 0.), Point::new(2., 2.));
        let b = Line::new(Point::new(0., 2.), Point::new(2., 0.));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_intersects_disjoint_and_parallel() {
        let a = Line::new(Point::new(0., 0.), Point::new(1., 0.));
        let b = Line::new(Point::new(0., 1.), Point::new(1., 1.));
        assert!(!a.intersects(&b));
        let c = Line::new(Point::new(3., 0.), Point::new(4., 0.));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_intersects_touching_endpoint() {
        let a = Line::new(Point::new(0., 0.), Point::new(2., 0.));
        let b = Line::new(Point::new(2., 0.), Point::new(2., 2.));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_is_same() {
        let a = Line::new(Point::new(0., 0.), Point::new(1., 1.));
        let b = Line::new(Point::new(1., 1.), Point::new(0., 0.));
        let c = Line::new(Point::new(0., 0.), Point::new(1., 2.));
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
    }
}
