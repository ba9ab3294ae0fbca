use crate::geom::point::Point;
use crate::geom::polygon;
use crate::geom::wall::Wall;
use crate::geom::TOLERANCE;
use anyhow::{anyhow, Context, Result};

/// A blocking structure inside a region, described by its own walls.
/// A closed obstacle chains its walls into a polygon ring during geometry
/// initialization; an open obstacle only blocks sight lines.
#[derive(Debug, Clone)]
pub struct Obstacle {
    id: i32,
    caption: String,
    closed: bool,
    height: f64,
    walls: Vec<Wall>,
    polygon: Vec<Point>,
}

impl Obstacle {
    pub fn new(id: i32, caption: &str, closed: bool, height: f64) -> Self {
        Self {
            id,
            caption: caption.to_string(),
            closed,
            height,
            walls: Vec::new(),
            polygon: Vec::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn add_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Chains the obstacle walls into a closed ring.
    pub fn convert_line_to_poly(&mut self) -> Result<()> {
        let edges: Vec<_> = self.walls.iter().map(|w| w.line().clone()).collect();
        let ring = polygon::chain_edges(&edges, TOLERANCE)
            .with_context(|| format!("obstacle {} ({})", self.id, self.caption))?;
        if !polygon::is_simple(&ring) {
            return Err(anyhow!(
                "obstacle {} ({}): polygon is self-intersecting",
                self.id,
                self.caption
            ));
        }
        self.polygon = ring;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_obstacle_builds_ring() {
        let mut obs = Obstacle::new(1, "pillar", true, 1.0);
        obs.add_wall(Wall::new(Point::new(1., 1.), Point::new(2., 1.)));
        obs.add_wall(Wall::new(Point::new(2., 1.), Point::new(2., 2.)));
        obs.add_wall(Wall::new(Point::new(2., 2.), Point::new(1., 2.)));
        obs.add_wall(Wall::new(Point::new(1., 2.), Point::new(1., 1.)));
        obs.convert_line_to_poly().unwrap();
        assert_eq!(obs.polygon().len(), 4);
    }

    #[test]
    fn test_open_chain_is_fatal() {
        let mut obs = Obstacle::new(2, "stub", true, 1.0);
        obs.add_wall(Wall::new(Point::new(0., 0.), Point::new(1., 0.)));
        obs.add_wall(Wall::new(Point::new(1., 0.), Point::new(1., 1.)));
        assert!(obs.convert_line_to_poly().is_err());
    }
}
