//! Subrooms: the atomic polygonal regions of the building.
//!
//! A subroom collects walls, obstacles and the navigable links incident on
//! its boundary during the load phase, then chains boundary plus links into
//! a closed polygon ring. All containment and line-of-sight queries run
//! against that ring. Stairs are a specialization: their boundary arrives
//! as many short collinear wall pieces, which are merged down to the four
//! corners of the flight.

use crate::geom::line::Line;
use crate::geom::navline::{GoalId, RegionUid};
use crate::geom::obstacle::Obstacle;
use crate::geom::point::Point;
use crate::geom::polygon;
use crate::geom::wall::Wall;
use crate::geom::{EPS_GOAL, TOLERANCE};
use crate::sim::pedestrian::Pedestrian;
use anyhow::{anyhow, Context, Result};

/// Cosine margin under which three chained stair points count as collinear.
const STAIR_COLLINEAR: f64 = 0.1;

/// An incident navigable link, stored as a copy of its geometry plus the
/// shared-space identifier. Geometry is immutable after initialization, so
/// the copy never goes stale.
#[derive(Debug, Clone)]
pub struct GoalLine {
    pub goal_id: GoalId,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubRoomKind {
    Normal,
    Stair { up: Point, down: Point },
}

#[derive(Debug, Clone)]
pub struct SubRoom {
    id: usize,
    room_id: usize,
    uid: RegionUid,
    kind: SubRoomKind,
    walls: Vec<Wall>,
    obstacles: Vec<Obstacle>,
    crossings: Vec<GoalLine>,
    transitions: Vec<GoalLine>,
    hlines: Vec<GoalLine>,
    goal_ids: Vec<GoalId>,
    polygon: Vec<Point>,
    area: f64,
    plan_equation: [f64; 3],
}

impl SubRoom {
    pub fn new(id: usize, room_id: usize, kind: SubRoomKind) -> Self {
        Self {
            id,
            room_id,
            uid: RegionUid::UNASSIGNED,
            kind,
            walls: Vec::new(),
            obstacles: Vec::new(),
            crossings: Vec::new(),
            transitions: Vec::new(),
            hlines: Vec::new(),
            goal_ids: Vec::new(),
            polygon: Vec::new(),
            area: 0.0,
            plan_equation: [0.0; 3],
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn room_id(&self) -> usize {
        self.room_id
    }

    /// Stable cross-reference id, assigned when the owning room is added to
    /// the building.
    pub fn uid(&self) -> RegionUid {
        self.uid
    }

    pub(crate) fn set_uid(&mut self, uid: RegionUid) {
        self.uid = uid;
    }

    pub fn kind(&self) -> &SubRoomKind {
        &self.kind
    }

    pub fn add_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub(crate) fn add_crossing(&mut self, goal_id: GoalId, line: Line) {
        self.crossings.push(GoalLine { goal_id, line });
        self.goal_ids.push(goal_id);
    }

    pub(crate) fn add_transition(&mut self, goal_id: GoalId, line: Line) {
        self.transitions.push(GoalLine { goal_id, line });
        self.goal_ids.push(goal_id);
    }

    pub(crate) fn add_hline(&mut self, goal_id: GoalId, line: Line) {
        self.hlines.push(GoalLine { goal_id, line });
        self.goal_ids.push(goal_id);
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub(crate) fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    pub fn crossings(&self) -> &[GoalLine] {
        &self.crossings
    }

    pub fn transitions(&self) -> &[GoalLine] {
        &self.transitions
    }

    pub fn hlines(&self) -> &[GoalLine] {
        &self.hlines
    }

    /// Shared-space ids of every link incident on this subroom.
    pub fn goal_ids(&self) -> &[GoalId] {
        &self.goal_ids
    }

    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Inclined regions (stairs) carry the plane `z = a*x + b*y + c`.
    pub fn set_plan_equation(&mut self, a: f64, b: f64, c: f64) {
        self.plan_equation = [a, b, c];
    }

    pub fn elevation(&self, p: Point) -> f64 {
        self.plan_equation[0] * p.x + self.plan_equation[1] * p.y + self.plan_equation[2]
    }

    /// Chains walls plus the supplied crossing/transition segments into the
    /// region polygon. Must run after all builder mutators and before any
    /// containment or visibility query.
    pub fn convert_boundary_to_polygon(&mut self, goals: &[Line]) -> Result<()> {
        let mut edges: Vec<Line> = self.walls.iter().map(|w| w.line().clone()).collect();
        edges.extend(goals.iter().cloned());

        let ring = match self.kind {
            SubRoomKind::Normal => polygon::chain_edges(&edges, TOLERANCE)
                .with_context(|| format!("subroom {}/{}", self.room_id, self.id))?,
            SubRoomKind::Stair { .. } => self.chain_stair(&edges)?,
        };
        if !polygon::is_simple(&ring) {
            return Err(anyhow!(
                "subroom {}/{}: boundary polygon is self-intersecting",
                self.room_id,
                self.id
            ));
        }
        self.polygon = ring;
        Ok(())
    }

    pub fn calculate_area(&mut self) {
        self.area = polygon::area(&self.polygon);
    }

    /// Shoelace-weighted centroid. Only meaningful once the polygon has
    /// been built.
    pub fn centroid(&self) -> Point {
        polygon::centroid(&self.polygon)
    }

    /// Point containment against the region polygon. Stairs test the
    /// perpendicular foot of the point against each of their four sides
    /// instead of winding.
    pub fn contains_point(&self, p: Point) -> bool {
        match self.kind {
            SubRoomKind::Normal => polygon::contains(&self.polygon, p),
            SubRoomKind::Stair { .. } => {
                let n = self.polygon.len();
                if n == 0 {
                    return false;
                }
                let mut sum = 0;
                for i in 0..n {
                    let side = Line::new(self.polygon[i], self.polygon[(i + 1) % n]);
                    let foot = side.foot_point(p);
                    if side.within_segment(foot) {
                        sum += 1;
                    }
                }
                sum == 4
            }
        }
    }

    /// Pedestrian containment: a position within tolerance of the
    /// pedestrian's own exit line still counts as inside, so a pedestrian
    /// keeps its old region for the exact frame it crosses out.
    pub fn contains_ped(&self, ped: &Pedestrian) -> bool {
        if let Some(exit) = ped.exit_line() {
            if exit.dist_to(ped.pos()) <= EPS_GOAL {
                return true;
            }
        }
        self.contains_point(ped.pos())
    }

    /// Checks whether the segment between two points is obstructed by any
    /// wall, obstacle wall, or (when `consider_hlines`) helper line of this
    /// subroom.
    pub fn is_visible(&self, p1: Point, p2: Point, consider_hlines: bool) -> bool {
        let sight = Line::new(p1, p2);
        for wall in &self.walls {
            if sight.intersects(wall.line()) {
                return false;
            }
        }
        for obstacle in &self.obstacles {
            for wall in obstacle.walls() {
                if sight.intersects(wall.line()) {
                    return false;
                }
            }
        }
        if consider_hlines {
            for hline in &self.hlines {
                if sight.intersects(&hline.line) {
                    return false;
                }
            }
        }
        true
    }

    /// Mutual visibility of two line entities: builds the four
    /// endpoint-pair connectors plus centre-to-centre and succeeds if any
    /// of the five is unobstructed. The input lines themselves never count
    /// as blockers.
    pub fn is_visible_lines(&self, l1: &Line, l2: &Line, consider_hlines: bool) -> bool {
        let connectors = [
            Line::new(l1.p1, l2.p1),
            Line::new(l1.p1, l2.p2),
            Line::new(l1.p2, l2.p1),
            Line::new(l1.p2, l2.p2),
            Line::new(l1.centre(), l2.centre()),
        ];
        let mut clear = [true; 5];

        let mut block = |seg: &Line, clear: &mut [bool; 5]| {
            if seg.is_same(l1) || seg.is_same(l2) {
                return;
            }
            for (k, connector) in connectors.iter().enumerate() {
                if clear[k] && connector.intersects(seg) {
                    clear[k] = false;
                }
            }
        };

        for wall in &self.walls {
            block(wall.line(), &mut clear);
        }
        for obstacle in &self.obstacles {
            for wall in obstacle.walls() {
                block(wall.line(), &mut clear);
            }
        }
        if consider_hlines {
            for hline in &self.hlines {
                block(&hline.line, &mut clear);
            }
        }
        clear.iter().any(|&c| c)
    }

    /// Two subrooms are directly connected when they share a crossing or a
    /// transition. Helper lines never connect regions.
    pub fn directly_connected_to(&self, other: &SubRoom) -> bool {
        for mine in &self.crossings {
            for theirs in &other.crossings {
                if mine.goal_id == theirs.goal_id {
                    return true;
                }
            }
        }
        for mine in &self.transitions {
            for theirs in &other.transitions {
                if mine.goal_id == theirs.goal_id {
                    return true;
                }
            }
        }
        false
    }

    /// Stair chaining: like the normal chain, but consecutive points whose
    /// turn stays below the collinearity threshold are merged, so a flight
    /// drawn as many short wall pieces reduces to its four corners. The
    /// shorter sides are then pushed outward a little to avoid zero-width
    /// adjacency with the neighbouring polygons.
    fn chain_stair(&self, edges: &[Line]) -> Result<Vec<Point>> {
        let mut pool: Vec<Line> = edges.to_vec();
        if pool.is_empty() {
            return Err(anyhow!(
                "subroom {}/{}: cannot build a stair from an empty edge set",
                self.room_id,
                self.id
            ));
        }

        let first = pool.remove(0);
        let mut akt = first.p1;
        let mut other = first.p2;
        let first_akt = akt;
        let first_other = other;
        let mut corners: Vec<Point> = Vec::new();

        let mut i = 0;
        while i < pool.len() {
            let next = if (akt - pool[i].p1).length() < TOLERANCE {
                Some(pool[i].p2)
            } else if (akt - pool[i].p2).length() < TOLERANCE {
                Some(pool[i].p1)
            } else {
                None
            };
            match next {
                Some(next) => {
                    if let Some(corner) = check_corner(&mut other, &mut akt, next) {
                        corners.push(corner);
                    }
                    pool.remove(i);
                    i = 0;
                }
                None => i += 1,
            }
        }

        if (akt - first_other).length() < TOLERANCE {
            if let Some(corner) = check_corner(&mut other, &mut akt, first_akt) {
                corners.push(corner);
            }
        } else {
            return Err(anyhow!(
                "subroom {}/{}: stair boundary does not close: ({:.4}, {:.4}) != ({:.4}, {:.4})",
                self.room_id,
                self.id,
                first_other.x,
                first_other.y,
                akt.x,
                akt.y
            ));
        }

        if corners.len() != 4 {
            return Err(anyhow!(
                "subroom {}/{}: stair must reduce to 4 corners, got {}",
                self.room_id,
                self.id,
                corners.len()
            ));
        }

        // single-step stairs are left untouched
        let mut ring = corners;
        if (ring[0] - ring[1]).length() > 0.9 && (ring[1] - ring[2]).length() > 0.9 {
            for i1 in 0..ring.len() {
                let i2 = (i1 + 1) % ring.len();
                let i3 = (i2 + 1) % ring.len();
                let i4 = (i3 + 1) % ring.len();
                let p1 = ring[i1];
                let p2 = ring[i2];
                let p3 = ring[i3];
                let p4 = ring[i4];

                let l1 = p2 - p1;
                let l2 = p3 - p2;
                if l1.length() < l2.length() {
                    ring[i2] = ring[i2] + l1.normalized() * (2.0 * EPS_GOAL);
                    let l3 = p3 - p4;
                    ring[i3] = ring[i3] + l3.normalized() * (2.0 * EPS_GOAL);
                }
            }
        }
        Ok(ring)
    }
}

/// Decides whether `akt` is a corner of the chain. `other` is the last
/// confirmed corner behind the head, `next` the upcoming point. Advances
/// the head either way; returns the corner when the turn is sharp enough.
fn check_corner(other: &mut Point, akt: &mut Point, next: Point) -> Option<Point> {
    let l1 = *other - *akt;
    let l2 = next - *akt;
    let cos = l1.dot(&l2) / (l1.length() * l2.length());
    if (cos.abs() - 1.0).abs() < STAIR_COLLINEAR {
        *akt = next;
        None
    } else {
        let corner = *akt;
        *other = *akt;
        *akt = next;
        Some(corner)
    }
}
