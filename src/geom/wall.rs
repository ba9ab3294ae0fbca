use crate::geom::line::Line;
use crate::geom::point::Point;
use std::fmt;

/// An impassable boundary segment. Walls participate in polygon
/// construction and block sight lines; containment is evaluated against
/// the region polygon they contribute to, never against the wall itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    line: Line,
}

impl Wall {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            line: Line::new(p1, p2),
        }
    }

    pub fn line(&self) -> &Line {
        &self.line
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wall({} -- {})", self.line.p1, self.line.p2)
    }
}
