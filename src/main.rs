use anyhow::Result;
use pedflow::geom::building::OUTSIDE_CAPTION;
use pedflow::geom::EPS_GOAL;
use pedflow::{
    Building, GoalId, Line, Pedestrian, Point, Room, RoutingEngine, SubRoom, SubRoomKind, Wall,
};
use std::sync::Arc;

/// Sends everyone through the middle crossing, then out the main exit.
struct StraightRouter {
    crossing: (GoalId, Line),
    exit: (GoalId, Line),
}

impl RoutingEngine for StraightRouter {
    fn find_route(&self, ped: &mut Pedestrian) -> bool {
        match (ped.room_id(), ped.subroom_id()) {
            (0, 0) => {
                let (goal, line) = &self.crossing;
                ped.set_exit(*goal, line.clone());
            }
            (0, 1) => {
                let (goal, line) = &self.exit;
                ped.set_exit(*goal, line.clone());
            }
            // already outside, nothing left to aim for
            _ => {}
        }
        true
    }
}

/// Two square subrooms joined by a crossing, plus an exit transition that
/// opens into the surrounding catch room.
fn build_hall() -> Result<(Building, StraightRouter)> {
    let mut building = Building::new("demo hall");

    let mut room = Room::new(0, "hall", 0.0);
    let mut sub0 = SubRoom::new(0, 0, SubRoomKind::Normal);
    sub0.add_wall(Wall::new(Point::new(0., 0.), Point::new(5., 0.)));
    sub0.add_wall(Wall::new(Point::new(0., 0.), Point::new(0., 4.)));
    sub0.add_wall(Wall::new(Point::new(0., 4.), Point::new(5., 4.)));
    room.add_subroom(sub0)?;

    let mut sub1 = SubRoom::new(1, 0, SubRoomKind::Normal);
    sub1.add_wall(Wall::new(Point::new(5., 0.), Point::new(10., 0.)));
    sub1.add_wall(Wall::new(Point::new(5., 4.), Point::new(10., 4.)));
    room.add_subroom(sub1)?;
    building.add_room(room)?;
    building.add_surrounding_room()?;

    let crossing_line = Line::new(Point::new(5., 0.), Point::new(5., 4.));
    let crossing = building.add_crossing(1, "middle", crossing_line.clone(), 0, 0, 1)?;

    let outside = building.room_by_caption(OUTSIDE_CAPTION)?.id();
    let exit_line = Line::new(Point::new(10., 0.), Point::new(10., 4.));
    let exit = building.add_transition(
        1,
        "main exit",
        "normal",
        exit_line.clone(),
        Some((0, 1)),
        Some((outside, 0)),
    )?;

    building.init_geometry()?;

    let router = StraightRouter {
        crossing: (crossing, crossing_line),
        exit: (exit, exit_line),
    };
    Ok((building, router))
}

fn main() -> Result<()> {
    env_logger::init();

    let (mut building, router) = build_hall()?;
    building.set_router(Arc::new(router));

    for id in 1..=3 {
        let start = Point::new(1., id as f64);
        building.add_pedestrian(Pedestrian::new(id, start, 0, 0));
    }

    // toy kinematics: walk at a fixed pace towards the current exit line
    let speed = 0.4;
    let mut frame = 0;
    while building.pedestrian_count() > 0 {
        frame += 1;
        for ped in building.pedestrians_mut() {
            let dir = match ped.exit_line() {
                Some(line) if line.dist_to(ped.pos()) > EPS_GOAL => {
                    (line.centre() - ped.pos()).normalized()
                }
                // no target yet, or standing on it: drift towards the exit side
                _ => Point::new(1., 0.),
            };
            let pos = ped.pos() + dir * speed;
            ped.set_pos(pos);
        }
        let outcome = building.update()?;
        println!(
            "frame {frame}: {} walking, {} reached the goal, {} relocated",
            building.pedestrian_count(),
            outcome.goal_reached,
            outcome.relocated
        );
    }
    println!("everyone is out after {frame} frames");
    Ok(())
}
