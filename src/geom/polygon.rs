//! Closed polygon rings built from unordered boundary segments.
//!
//! Regions and obstacles describe their boundary as a bag of segments
//! (walls plus navigable links). [`chain_edges`] stitches that bag into an
//! ordered ring, tolerating small gaps between endpoints; the containment
//! test handles concave rings.

use crate::geom::line::Line;
use crate::geom::point::Point;
use anyhow::{anyhow, Result};

/// Chains unordered edges into a closed ring.
///
/// The chain is seeded with the first edge; the remaining pool is scanned
/// repeatedly for an edge sharing an endpoint (within `tolerance`) with the
/// current chain head, and every consumed edge restarts the scan from the
/// front of the pool. Edges that never connect are ignored.
///
/// # Returns
/// The ordered ring, one vertex per consumed edge. Fails if the chain does
/// not close back onto its starting point within `tolerance`.
pub fn chain_edges(edges: &[Line], tolerance: f64) -> Result<Vec<Point>> {
    let mut pool: Vec<Line> = edges.to_vec();
    if pool.is_empty() {
        return Err(anyhow!("cannot build a polygon from an empty edge set"));
    }

    let first = pool.remove(0);
    let mut ring = vec![first.p1];
    let mut head = first.p2;

    let mut i = 0;
    while i < pool.len() {
        if (head - pool[i].p1).length() < tolerance {
            ring.push(pool[i].p1);
            head = pool[i].p2;
            pool.remove(i);
            i = 0;
        } else if (head - pool[i].p2).length() < tolerance {
            ring.push(pool[i].p2);
            head = pool[i].p1;
            pool.remove(i);
            i = 0;
        } else {
            i += 1;
        }
    }

    let gap = (ring[0] - head).length();
    if gap > tolerance {
        return Err(anyhow!(
            "boundary does not close: ({:.4}, {:.4}) != ({:.4}, {:.4}), gap {:.4}",
            ring[0].x,
            ring[0].y,
            head.x,
            head.y,
            gap
        ));
    }
    Ok(ring)
}

/// Checks that no two non-adjacent edges of the ring intersect.
pub fn is_simple(ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a = Line::new(ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // skip the shared-vertex neighbours
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let b = Line::new(ring[j], ring[(j + 1) % n]);
            if a.intersects(&b) {
                return false;
            }
        }
    }
    true
}

/// Shoelace area of the ring.
pub fn area(ring: &[Point]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += (ring[i].y + ring[j].y) * (ring[i].x - ring[j].x);
    }
    0.5 * sum.abs()
}

/// Signed-area weighted centroid of the ring.
pub fn centroid(ring: &[Point]) -> Point {
    let n = ring.len();
    let mut px = 0.0;
    let mut py = 0.0;
    let mut signed_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let a = ring[i].x * ring[j].y - ring[j].x * ring[i].y;
        signed_area += a;
        px += (ring[i].x + ring[j].x) * a;
        py += (ring[i].y + ring[j].y) * a;
    }
    signed_area *= 0.5;
    Point::new(px / (6.0 * signed_area), py / (6.0 * signed_area))
}

/// Concave point-in-polygon test.
///
/// Classifies every vertex into a quadrant around the query point and
/// accumulates the signed quadrant deltas along the ring; a total of +-4
/// means the ring winds around the point. A two-quadrant jump is resolved
/// by the x-intercept of the edge at the query height.
pub fn contains(ring: &[Point], p: Point) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut total: i32 = 0;
    let mut quad = which_quad(ring[0], p);
    for edge in 0..n {
        let next = (edge + 1) % n;
        let next_quad = which_quad(ring[next], p);
        let mut delta = next_quad - quad;
        match delta {
            2 | -2 => {
                if x_intercept(ring[edge], ring[next], p.y) > p.x {
                    delta = -delta;
                }
            }
            3 => delta = -1,
            -3 => delta = 1,
            _ => {}
        }
        total += delta;
        quad = next_quad;
    }
    total.abs() == 4
}

/// Quadrant of `vertex` with `origin` as the coordinate origin.
fn which_quad(vertex: Point, origin: Point) -> i32 {
    if vertex.x > origin.x {
        if vertex.y > origin.y {
            1
        } else {
            4
        }
    } else if vertex.y > origin.y {
        2
    } else {
        3
    }
}

/// X-coordinate at which the edge (p1, p2) crosses the height `hit_y`.
fn x_intercept(p1: Point, p2: Point, hit_y: f64) -> f64 {
    p2.x - ((p2.y - hit_y) * (p1.x - p2.x)) / (p1.y - p2.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::TOLERANCE;

    fn square_edges() -> Vec<Line> {
        vec![
            Line::new(Point::new(0., 0.), Point::new(4., 0.)),
            Line::new(Point::new(4., 4.), Point::new(0., 4.)),
            Line::new(Point::new(0., 4.), Point::new(0., 0.)),
            Line::new(Point::new(4., 0.), Point::new(4., 4.)),
        ]
    }

    fn l_shape() -> Vec<Point> {
        vec![
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
            Point::new(2., 1.),
            Point::new(2., 2.),
            Point::new(0., 2.),
        ]
    }

    #[test]
    fn test_chain_closes_square() {
        let ring = chain_edges(&square_edges(), TOLERANCE).unwrap();
        // one vertex per edge, ring closes onto the first vertex
        assert_eq!(ring.len(), 4);
        assert!(ring[0].is_close(&Point::new(0., 0.)));
    }

    #[test]
    fn test_chain_tolerates_small_gaps() {
        let mut edges = square_edges();
        edges[1] = Line::new(Point::new(4., 4.01), Point::new(0., 4.));
        let ring = chain_edges(&edges, TOLERANCE).unwrap();
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_chain_fails_on_open_boundary() {
        let edges = vec![
            Line::new(Point::new(0., 0.), Point::new(4., 0.)),
            Line::new(Point::new(4., 0.), Point::new(4., 4.)),
        ];
        assert!(chain_edges(&edges, TOLERANCE).is_err());
    }

    #[test]
    fn test_contains_l_shape() {
        let ring = l_shape();
        assert!(contains(&ring, Point::new(0.5, 0.5)));
        assert!(contains(&ring, Point::new(0.5, 1.5)));
        assert!(contains(&ring, Point::new(1.5, 1.5)));
        // the cut-out corner
        assert!(!contains(&ring, Point::new(1.5, 0.5)));
        // outside the bounding box
        assert!(!contains(&ring, Point::new(3.0, 1.0)));
    }

    #[test]
    fn test_area() {
        let ring = chain_edges(&square_edges(), TOLERANCE).unwrap();
        assert!((area(&ring) - 16.).abs() < 1e-10);
        assert!((area(&l_shape()) - 3.).abs() < 1e-10);
    }

    #[test]
    fn test_centroid_square() {
        let ring = chain_edges(&square_edges(), TOLERANCE).unwrap();
        assert!(centroid(&ring).is_close(&Point::new(2., 2.)));
    }

    #[test]
    fn test_is_simple() {
        let ring = chain_edges(&square_edges(), TOLERANCE).unwrap();
        assert!(is_simple(&ring));
        // bowtie
        let bowtie = vec![
            Point::new(0., 0.),
            Point::new(2., 2.),
            Point::new(2., 0.),
            Point::new(0., 2.),
        ];
        assert!(!is_simple(&bowtie));
    }
}
