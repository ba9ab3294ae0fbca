//! The building: owner of all rooms, link registries and the pedestrian
//! roster, and home of the per-frame consistency pass.
//!
//! Rooms, subrooms and links are created once during the load phase and
//! live for the whole run; pedestrians come and go. The routing engine and
//! the spatial index are external collaborators attached by the embedding
//! simulation.

use crate::geom::bboxes::BoundingBox;
use crate::geom::crossing::Crossing;
use crate::geom::hline::Hline;
use crate::geom::line::Line;
use crate::geom::navline::{GoalId, NavLine, RegionUid};
use crate::geom::point::Point;
use crate::geom::room::Room;
use crate::geom::subroom::{SubRoom, SubRoomKind};
use crate::geom::transition::{Transition, TransitionSide};
use crate::geom::wall::Wall;
use crate::sim::config::SimConfig;
use crate::sim::grid::SpatialIndex;
use crate::sim::pedestrian::Pedestrian;
use crate::sim::router::RoutingEngine;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

mod update;
pub use update::UpdateOutcome;

/// Caption of the synthetic catch-all room surrounding the geometry.
pub const OUTSIDE_CAPTION: &str = "outside";

/// Padding around the wall bounding box for the surrounding room.
const SURROUNDING_MARGIN: f64 = 10.0;

/// Padding around the wall bounding box for the spatial index.
const GRID_MARGIN: f64 = 1.0;

/// A navigable link found by combined-id lookup.
#[derive(Debug, Clone, Copy)]
pub enum Goal<'a> {
    Transition(&'a Transition),
    Crossing(&'a Crossing),
    Hline(&'a Hline),
}

impl Goal<'_> {
    pub fn goal_id(&self) -> GoalId {
        match self {
            Goal::Transition(t) => t.goal_id(),
            Goal::Crossing(c) => c.goal_id(),
            Goal::Hline(h) => h.goal_id(),
        }
    }

    pub fn line(&self) -> &Line {
        match self {
            Goal::Transition(t) => t.line(),
            Goal::Crossing(c) => c.line(),
            Goal::Hline(h) => h.line(),
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            Goal::Transition(t) => t.caption(),
            Goal::Crossing(c) => c.caption(),
            Goal::Hline(h) => h.caption(),
        }
    }
}

pub struct Building {
    caption: String,
    rooms: Vec<Room>,
    crossings: HashMap<i32, Crossing>,
    transitions: HashMap<i32, Transition>,
    hlines: HashMap<i32, Hline>,
    peds: Vec<Pedestrian>,
    next_goal_id: usize,
    next_region_uid: usize,
    router: Option<Arc<dyn RoutingEngine>>,
    grid: Option<Box<dyn SpatialIndex>>,
    pathway: Option<BufWriter<File>>,
    workers: usize,
}

impl Building {
    pub fn new(caption: &str) -> Self {
        Self {
            caption: caption.to_string(),
            rooms: Vec::new(),
            crossings: HashMap::new(),
            transitions: HashMap::new(),
            hlines: HashMap::new(),
            peds: Vec::new(),
            next_goal_id: 0,
            next_region_uid: 0,
            router: None,
            grid: None,
            pathway: None,
            workers: rayon::current_num_threads(),
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Attaches the route-search collaborator used by the update pass.
    pub fn set_router(&mut self, router: Arc<dyn RoutingEngine>) {
        self.router = Some(router);
    }

    /// Attaches the linked-cell index refreshed between frames.
    pub fn set_spatial_index(&mut self, grid: Box<dyn SpatialIndex>) {
        self.grid = Some(grid);
    }

    pub fn set_worker_count(&mut self, workers: usize) {
        self.workers = workers.max(1);
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Applies the runtime configuration: worker count and, when set, the
    /// pathway log destination. The cell size is consumed separately by
    /// [`Building::init_grid`].
    pub fn apply_config(&mut self, config: &SimConfig) -> Result<()> {
        self.set_worker_count(config.workers);
        if let Some(path) = &config.pathway_file {
            self.enable_path_log(path)?;
        }
        Ok(())
    }

    // ---- rooms and regions ----------------------------------------------

    /// Appends a fully-populated room. Room ids double as positions in the
    /// building, so they must arrive in order; every contained subroom
    /// receives its stable region uid here.
    pub fn add_room(&mut self, mut room: Room) -> Result<()> {
        if room.id() != self.rooms.len() {
            return Err(anyhow!(
                "room id {} does not match its position {}",
                room.id(),
                self.rooms.len()
            ));
        }
        for sub in room.subrooms_mut() {
            sub.set_uid(RegionUid(self.next_region_uid));
            self.next_region_uid += 1;
        }
        self.rooms.push(room);
        Ok(())
    }

    pub fn room(&self, id: usize) -> Result<&Room> {
        self.rooms.get(id).ok_or_else(|| {
            anyhow!(
                "no room with id {} (building has {} rooms)",
                id,
                self.rooms.len()
            )
        })
    }

    pub fn room_mut(&mut self, id: usize) -> Result<&mut Room> {
        let count = self.rooms.len();
        self.rooms
            .get_mut(id)
            .ok_or_else(|| anyhow!("no room with id {} (building has {} rooms)", id, count))
    }

    pub fn room_by_caption(&self, caption: &str) -> Result<&Room> {
        self.rooms
            .iter()
            .find(|r| r.caption() == caption)
            .ok_or_else(|| anyhow!("no room with caption '{caption}'"))
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn subroom(&self, room_id: usize, subroom_id: usize) -> Result<&SubRoom> {
        self.room(room_id)?.subroom(subroom_id)
    }

    /// Linear scan for the region carrying the given stable uid.
    pub fn subroom_by_uid(&self, uid: RegionUid) -> Option<&SubRoom> {
        self.rooms
            .iter()
            .flat_map(|r| r.subrooms().iter())
            .find(|s| s.uid() == uid)
    }

    // ---- link registries ------------------------------------------------

    /// Registers a crossing between two subrooms of one room and wires it
    /// into both subrooms' goal lists.
    pub fn add_crossing(
        &mut self,
        id: i32,
        caption: &str,
        line: Line,
        room_id: usize,
        subroom1: usize,
        subroom2: usize,
    ) -> Result<GoalId> {
        if self.crossings.contains_key(&id) {
            return Err(anyhow!("duplicate crossing id {id}"));
        }
        for sub in [subroom1, subroom2] {
            self.room(room_id)
                .and_then(|r| r.subroom(sub))
                .with_context(|| format!("crossing {id}: unresolved side {room_id}/{sub}"))?;
        }

        let goal_id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;
        for sub in [subroom1, subroom2] {
            self.rooms[room_id]
                .subroom_mut(sub)?
                .add_crossing(goal_id, line.clone());
        }
        let crossing = Crossing::new(id, caption, line, room_id, subroom1, subroom2, goal_id);
        self.crossings.insert(id, crossing);
        Ok(goal_id)
    }

    /// Registers a transition; either side may be absent, denoting the
    /// building exterior.
    #[allow(clippy::too_many_arguments)]
    pub fn add_transition(
        &mut self,
        id: i32,
        caption: &str,
        kind: &str,
        line: Line,
        side1: Option<(usize, usize)>,
        side2: Option<(usize, usize)>,
    ) -> Result<GoalId> {
        if self.transitions.contains_key(&id) {
            return Err(anyhow!("duplicate transition id {id}"));
        }
        for (room_id, sub) in [side1, side2].into_iter().flatten() {
            self.room(room_id)
                .and_then(|r| r.subroom(sub))
                .with_context(|| format!("transition {id}: unresolved side {room_id}/{sub}"))?;
        }

        let goal_id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;
        for (room_id, sub) in [side1, side2].into_iter().flatten() {
            self.rooms[room_id]
                .subroom_mut(sub)?
                .add_transition(goal_id, line.clone());
        }
        let to_side = |s: Option<(usize, usize)>| {
            s.map(|(room_id, subroom_id)| TransitionSide {
                room_id,
                subroom_id,
            })
        };
        let transition =
            Transition::new(id, caption, kind, line, to_side(side1), to_side(side2), goal_id);
        self.transitions.insert(id, transition);
        Ok(goal_id)
    }

    /// Registers a helper line. A second helper line with the same id and
    /// identical endpoints is a harmless duplicate and is skipped; the same
    /// id with different geometry is fatal.
    pub fn add_hline(
        &mut self,
        id: i32,
        line: Line,
        room_id: usize,
        subroom_id: usize,
    ) -> Result<GoalId> {
        if let Some(existing) = self.hlines.get(&id) {
            if existing.line().is_same(&line) {
                log::warn!("helper line {id} already registered with identical endpoints, skipping");
                return Ok(existing.goal_id());
            }
            return Err(anyhow!("duplicate helper line id {id} with different geometry"));
        }
        self.room(room_id)
            .and_then(|r| r.subroom(subroom_id))
            .with_context(|| format!("helper line {id}: unresolved subroom {room_id}/{subroom_id}"))?;

        let goal_id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;
        self.rooms[room_id]
            .subroom_mut(subroom_id)?
            .add_hline(goal_id, line.clone());
        let hline = Hline::new(id, line, room_id, subroom_id, goal_id);
        self.hlines.insert(id, hline);
        Ok(goal_id)
    }

    pub fn crossings(&self) -> impl Iterator<Item = &Crossing> {
        self.crossings.values()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values()
    }

    pub fn hlines(&self) -> impl Iterator<Item = &Hline> {
        self.hlines.values()
    }

    pub fn goal_count(&self) -> usize {
        self.crossings.len() + self.transitions.len() + self.hlines.len()
    }

    pub fn transition(&self, id: i32) -> Result<&Transition> {
        self.transitions
            .get(&id)
            .ok_or_else(|| anyhow!("no transition with id {id}"))
    }

    pub fn transition_mut(&mut self, id: i32) -> Result<&mut Transition> {
        self.transitions
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no transition with id {id}"))
    }

    pub fn transition_by_caption(&self, caption: &str) -> Result<&Transition> {
        self.transitions
            .values()
            .find(|t| t.caption() == caption)
            .ok_or_else(|| anyhow!("no transition with caption '{caption}'"))
    }

    pub fn transition_by_caption_mut(&mut self, caption: &str) -> Result<&mut Transition> {
        self.transitions
            .values_mut()
            .find(|t| t.caption() == caption)
            .ok_or_else(|| anyhow!("no transition with caption '{caption}'"))
    }

    /// Combined-id lookup over the shared goal space: transitions first,
    /// then crossings, then helper lines.
    pub fn goal(&self, id: GoalId) -> Option<Goal<'_>> {
        if let Some(t) = self.transitions.values().find(|t| t.goal_id() == id) {
            return Some(Goal::Transition(t));
        }
        if let Some(c) = self.crossings.values().find(|c| c.goal_id() == id) {
            return Some(Goal::Crossing(c));
        }
        if let Some(h) = self.hlines.values().find(|h| h.goal_id() == id) {
            return Some(Goal::Hline(h));
        }
        None
    }

    // ---- geometry -------------------------------------------------------

    /// Builds every subroom's polygon from its walls plus incident
    /// crossings and transitions, computes areas, and converts every
    /// closed obstacle. Must run exactly once, after the whole link graph
    /// is populated and before any query or simulation step.
    pub fn init_geometry(&mut self) -> Result<()> {
        log::info!("initializing geometry");
        for room in &mut self.rooms {
            for sub in room.subrooms_mut() {
                let goals: Vec<Line> = sub
                    .crossings()
                    .iter()
                    .chain(sub.transitions().iter())
                    .map(|g| g.line.clone())
                    .collect();
                sub.convert_boundary_to_polygon(&goals)?;
                sub.calculate_area();
                for obstacle in sub.obstacles_mut() {
                    if obstacle.is_closed() {
                        obstacle.convert_line_to_poly()?;
                    }
                }
            }
        }
        log::info!("geometry initialized");
        Ok(())
    }

    /// Synthesizes one large rectangular room captioned "outside" around
    /// the whole geometry, so pedestrians leaving the building end up in a
    /// defined catch region.
    pub fn add_surrounding_room(&mut self) -> Result<()> {
        log::info!("adding the room '{OUTSIDE_CAPTION}'");
        let bounds = self.wall_bounds()?.expand(SURROUNDING_MARGIN);

        let room_id = self.rooms.len();
        let mut sub = SubRoom::new(0, room_id, SubRoomKind::Normal);
        let corners = [
            Point::new(bounds.xmin, bounds.ymin),
            Point::new(bounds.xmin, bounds.ymax),
            Point::new(bounds.xmax, bounds.ymax),
            Point::new(bounds.xmax, bounds.ymin),
        ];
        for i in 0..corners.len() {
            sub.add_wall(Wall::new(corners[i], corners[(i + 1) % corners.len()]));
        }
        let mut room = Room::new(room_id, OUTSIDE_CAPTION, 0.0);
        room.add_subroom(sub)?;
        self.add_room(room)
    }

    fn wall_bounds(&self) -> Result<BoundingBox> {
        let mut bounds = BoundingBox::new();
        for room in &self.rooms {
            for sub in room.subrooms() {
                for wall in sub.walls() {
                    bounds.include(wall.line().p1);
                    bounds.include(wall.line().p2);
                }
            }
        }
        if bounds.is_empty() {
            return Err(anyhow!("building has no walls to bound"));
        }
        Ok(bounds)
    }

    /// Building-wide visibility: the sight line must be unobstructed in
    /// every region it is evaluated against. A coarse oracle for geometry
    /// sanity checks, not for per-step routing.
    pub fn is_visible(&self, p1: Point, p2: Point, consider_hlines: bool) -> bool {
        self.rooms
            .iter()
            .flat_map(|r| r.subrooms().iter())
            .all(|sub| sub.is_visible(p1, p2, consider_hlines))
    }

    // ---- spatial index --------------------------------------------------

    /// Rebuilds the attached spatial index over the wall bounding box. A
    /// cell size of zero or below requests one giant cell, turning
    /// neighborhood queries into brute-force scans.
    pub fn init_grid(&mut self, cell_size: f64) -> Result<()> {
        let bounds = self.wall_bounds()?.expand(GRID_MARGIN);
        let effective = if cell_size <= 0.0 {
            log::info!("brute force will be used for neighborhood queries");
            bounds.longest_side()
        } else {
            log::info!("initializing the grid with cell size {cell_size}");
            cell_size
        };
        let count = self.peds.len();
        let grid = self
            .grid
            .as_mut()
            .ok_or_else(|| anyhow!("no spatial index attached"))?;
        grid.rebuild(bounds, effective, count);
        grid.refresh(&self.peds);
        Ok(())
    }

    /// Refreshes the spatial index with the current roster.
    pub fn update_grid(&mut self) -> Result<()> {
        let grid = self
            .grid
            .as_mut()
            .ok_or_else(|| anyhow!("no spatial index attached"))?;
        grid.refresh(&self.peds);
        Ok(())
    }

    // ---- roster ---------------------------------------------------------

    /// Adds a pedestrian to the roster. A duplicate id is rejected with a
    /// warning, never fatally.
    pub fn add_pedestrian(&mut self, ped: Pedestrian) {
        if self.peds.iter().any(|p| p.id() == ped.id()) {
            log::warn!(
                "pedestrian {} is already in the simulation, ignoring",
                ped.id()
            );
            return;
        }
        self.peds.push(ped);
    }

    pub fn pedestrians(&self) -> &[Pedestrian] {
        &self.peds
    }

    /// Mutable roster access for the force model integrating positions.
    pub fn pedestrians_mut(&mut self) -> &mut [Pedestrian] {
        &mut self.peds
    }

    pub fn pedestrian_count(&self) -> usize {
        self.peds.len()
    }

    pub fn get_pedestrian(&self, id: i32) -> Option<&Pedestrian> {
        self.peds.iter().find(|p| p.id() == id)
    }

    /// Removes one pedestrian, flushing its path history first when
    /// pathway logging is enabled.
    pub fn delete_pedestrian(&mut self, id: i32) -> Result<bool> {
        if !self.peds.iter().any(|p| p.id() == id) {
            log::warn!("pedestrian {id} not found");
            return Ok(false);
        }
        log::debug!("deleting pedestrian {id}");
        self.remove_pedestrians(&[id])?;
        Ok(true)
    }

    /// Removes every pedestrian that moved less than `min_displacement`
    /// since its last recorded position and records the current position
    /// for the rest. Returns the number removed.
    pub fn prune_stalled(&mut self, min_displacement: f64) -> Result<usize> {
        let mut remove = Vec::new();
        for ped in &mut self.peds {
            if ped.distance_since_record() < min_displacement {
                remove.push(ped.id());
            } else {
                ped.record_position();
            }
        }
        for id in &remove {
            log::info!("removing stalled pedestrian {id}");
        }
        self.remove_pedestrians(&remove)?;
        Ok(remove.len())
    }

    // ---- pathway log ----------------------------------------------------

    /// Opens the pathway log. From now on every removed pedestrian flushes
    /// its room/transition trail to the file.
    pub fn enable_path_log(&mut self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "##pedestrian ways")?;
        writeln!(writer, "#nomenclature roomid  caption")?;
        writeln!(writer, "#data room exit_id")?;
        writer.flush()?;
        self.pathway = Some(writer);
        log::info!("saving pedestrian paths to [ {} ]", path.display());
        Ok(())
    }

    /// Flushes path trails (when logging) and drops the pedestrians from
    /// the roster. Trail entries that do not resolve to a transition are
    /// crossings or helper lines and are skipped.
    fn remove_pedestrians(&mut self, ids: &[i32]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        if self.pathway.is_some() {
            let mut lines: Vec<String> = Vec::new();
            for ped in self.peds.iter().filter(|p| ids.contains(&p.id())) {
                for &(room_id, transition_id) in ped.path() {
                    let room_caption =
                        self.rooms.get(room_id).map(|r| r.caption()).unwrap_or("?");
                    if let Some(transition) = self.transitions.get(&transition_id) {
                        lines.push(format!("{} {}", room_caption, transition.caption()));
                    }
                }
            }
            if let Some(writer) = self.pathway.as_mut() {
                for line in lines {
                    writeln!(writer, "{line}")?;
                }
                writer.flush()?;
            }
        }
        self.peds.retain(|p| !ids.contains(&p.id()));
        Ok(())
    }
}
