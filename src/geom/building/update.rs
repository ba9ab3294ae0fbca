//! The per-frame consistency pass.
//!
//! The force model integrates positions without touching region
//! membership, so once per frame the building has to reconcile the two:
//! pedestrians that reached their goal leave the simulation, pedestrians
//! that wandered out of their recorded region are re-homed into a directly
//! connected neighbour (or removed when none contains them), and every
//! survivor gets its next target recomputed by the routing engine, fanned
//! out over worker threads.

use crate::geom::building::{Building, OUTSIDE_CAPTION};
use crate::geom::point::Point;
use crate::sim::pedestrian::Pedestrian;
use crate::sim::router::RoutingEngine;
use anyhow::{anyhow, Result};
use rayon::prelude::*;
use std::sync::Arc;

/// Per-pedestrian outcomes of one consistency pass. None of these are
/// errors: dense or ill-posed scenarios produce them routinely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Removed because the final destination region contains them.
    pub goal_reached: usize,
    /// Reassigned to a directly connected neighbouring region.
    pub relocated: usize,
    /// Removed because no connected region contains their position.
    pub stranded: usize,
    /// Removed because the routing engine reported failure.
    pub route_failures: usize,
}

impl Building {
    /// Runs the consistency pass. Invoke once per simulation tick, after
    /// the force model has advanced every pedestrian.
    ///
    /// Phases, in order: classification, relocation of escaped
    /// pedestrians, removal, and the parallel route recomputation.
    /// Everything up to the parallel phase is single-threaded, so the
    /// roster is never mutated concurrently.
    pub fn update(&mut self) -> Result<UpdateOutcome> {
        let mut outcome = UpdateOutcome::default();
        let mut remove: Vec<i32> = Vec::new();
        let mut escaped: Vec<i32> = Vec::new();

        for ped in &self.peds {
            if self.goal_reached(ped) {
                log::debug!("pedestrian {} reached its final destination", ped.id());
                remove.push(ped.id());
                continue;
            }
            let contained = self
                .subroom(ped.room_id(), ped.subroom_id())
                .map(|sub| sub.contains_ped(ped))
                .unwrap_or(false);
            if !contained {
                escaped.push(ped.id());
            }
        }
        outcome.goal_reached = remove.len();

        for id in escaped {
            let (pos, old_room, old_sub) = match self.get_pedestrian(id) {
                Some(ped) => (ped.pos(), ped.room_id(), ped.subroom_id()),
                None => continue,
            };
            match self.find_relocation(pos, old_room, old_sub) {
                Some((room_id, subroom_id)) => {
                    log::info!(
                        "pedestrian {id} relocated from {old_room}/{old_sub} to {room_id}/{subroom_id}"
                    );
                    if let Some(ped) = self.peds.iter_mut().find(|p| p.id() == id) {
                        ped.set_region(room_id, subroom_id);
                        // the cached target belongs to the old region
                        ped.clear_route();
                    }
                    outcome.relocated += 1;
                }
                None => {
                    log::warn!(
                        "pedestrian {id} left {old_room}/{old_sub} into unreachable space \
                         at ({:.2}, {:.2}), removing",
                        pos.x,
                        pos.y
                    );
                    remove.push(id);
                    outcome.stranded += 1;
                }
            }
        }

        self.remove_pedestrians(&remove)?;

        let router = self
            .router
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| anyhow!("no routing engine attached"))?;
        let failed = self.recompute_routes(&router);
        for id in &failed {
            log::warn!("no route found for pedestrian {id}, removing");
        }
        outcome.route_failures = failed.len();
        self.remove_pedestrians(&failed)?;

        Ok(outcome)
    }

    /// A pedestrian is done when its final destination region contains its
    /// position, or when it sits in the synthetic surrounding room with no
    /// destination left.
    fn goal_reached(&self, ped: &Pedestrian) -> bool {
        match ped.final_destination() {
            Some(uid) => self
                .subroom_by_uid(uid)
                .map(|sub| sub.contains_point(ped.pos()))
                .unwrap_or(false),
            None => self
                .rooms
                .get(ped.room_id())
                .map(|room| room.caption() == OUTSIDE_CAPTION)
                .unwrap_or(false),
        }
    }

    /// Searches all regions for one that contains `pos` and is directly
    /// connected to the region the pedestrian escaped from.
    fn find_relocation(
        &self,
        pos: Point,
        old_room: usize,
        old_sub: usize,
    ) -> Option<(usize, usize)> {
        let old = self.subroom(old_room, old_sub).ok()?;
        for (room_id, room) in self.rooms.iter().enumerate() {
            for (subroom_id, sub) in room.subrooms().iter().enumerate() {
                if sub.contains_point(pos) && sub.directly_connected_to(old) {
                    return Some((room_id, subroom_id));
                }
            }
        }
        None
    }

    /// Recomputes every pedestrian's next target and returns the ids the
    /// router failed on. The roster is split into `workers` contiguous
    /// slices of equal size, the last worker absorbing the remainder; no
    /// synchronization is needed during the parallel section.
    fn recompute_routes(&mut self, router: &Arc<dyn RoutingEngine>) -> Vec<i32> {
        let workers = self.workers.max(1);
        let count = self.peds.len();
        if count == 0 {
            return Vec::new();
        }

        let part = count / workers;
        let mut chunks: Vec<&mut [Pedestrian]> = Vec::with_capacity(workers);
        let mut rest: &mut [Pedestrian] = &mut self.peds;
        for worker in 0..workers {
            let take = if worker == workers - 1 {
                rest.len()
            } else {
                part
            };
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(take);
            chunks.push(head);
            rest = tail;
        }

        chunks
            .into_par_iter()
            .flat_map_iter(|chunk| {
                let mut failed = Vec::new();
                for ped in chunk.iter_mut() {
                    if !router.find_route(ped) {
                        failed.push(ped.id());
                    }
                }
                failed.into_iter()
            })
            .collect()
    }
}
