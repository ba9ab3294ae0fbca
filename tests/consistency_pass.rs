//! End-to-end exercises of the per-frame consistency pass: relocation of
//! escaped pedestrians, goal-reached and stranded removal, route-failure
//! handling, the runtime configuration and the pathway log.

use anyhow::Result;
use pedflow::geom::building::OUTSIDE_CAPTION;
use pedflow::{
    Building, GoalId, Line, Pedestrian, Point, Room, RoutingEngine, SimConfig, SubRoom,
    SubRoomKind, Wall,
};
use std::sync::Arc;

struct AcceptAll;

impl RoutingEngine for AcceptAll {
    fn find_route(&self, _ped: &mut Pedestrian) -> bool {
        true
    }
}

struct RejectAll;

impl RoutingEngine for RejectAll {
    fn find_route(&self, _ped: &mut Pedestrian) -> bool {
        false
    }
}

/// One room "hall" with two 5 x 4 subrooms joined by a crossing at x = 5,
/// surrounded by the synthetic "outside" room, with an exit transition at
/// x = 10 opening from the second subroom into the outside.
fn two_subroom_hall() -> Result<(Building, GoalId, Line)> {
    let mut building = Building::new("integration hall");

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
    building.add_transition(
        1,
        "main exit",
        "normal",
        Line::new(Point::new(10., 0.), Point::new(10., 4.)),
        Some((0, 1)),
        Some((outside, 0)),
    )?;

    building.init_geometry()?;
    Ok((building, crossing, crossing_line))
}

#[test]
fn test_relocation_restores_membership() -> Result<()> {
    let (mut building, _, _) = two_subroom_hall()?;
    building.set_router(Arc::new(AcceptAll));
    // more workers than pedestrians: the remainder split must still cover
    // the whole roster
    building.set_worker_count(3);

    // recorded in subroom 0, integrated into subroom 1
    building.add_pedestrian(Pedestrian::new(1, Point::new(6., 2.), 0, 0));
    let outcome = building.update()?;

    assert_eq!(outcome.relocated, 1);
    assert_eq!(outcome.stranded, 0);
    let ped = building.get_pedestrian(1).unwrap();
    assert_eq!((ped.room_id(), ped.subroom_id()), (0, 1));
    // the membership invariant holds again
    assert!(building
        .subroom(ped.room_id(), ped.subroom_id())?
        .contains_point(ped.pos()));
    Ok(())
}

#[test]
fn test_stranded_pedestrian_is_removed() -> Result<()> {
    let (mut building, _, _) = two_subroom_hall()?;
    building.set_router(Arc::new(AcceptAll));

    // (-5, -5) lies only in the outside room, which is not directly
    // connected to subroom 0
    building.add_pedestrian(Pedestrian::new(1, Point::new(-5., -5.), 0, 0));
    let outcome = building.update()?;

    assert_eq!(outcome.stranded, 1);
    assert_eq!(building.pedestrian_count(), 0);
    Ok(())
}

#[test]
fn test_goal_removal_is_idempotent() -> Result<()> {
    let (mut building, _, _) = two_subroom_hall()?;
    building.set_router(Arc::new(AcceptAll));

    let destination = building.subroom(0, 1)?.uid();
    let mut ped = Pedestrian::new(1, Point::new(7., 2.), 0, 1);
    ped.set_final_destination(Some(destination));
    building.add_pedestrian(ped);

    let outcome = building.update()?;
    assert_eq!(outcome.goal_reached, 1);
    assert_eq!(building.pedestrian_count(), 0);

    // the pedestrian never reappears
    let again = building.update()?;
    assert_eq!(again.goal_reached, 0);
    assert_eq!(building.pedestrian_count(), 0);
    Ok(())
}

#[test]
fn test_exit_into_outside_room_then_removed() -> Result<()> {
    let (mut building, _, _) = two_subroom_hall()?;
    building.set_router(Arc::new(AcceptAll));

    // just past the exit transition, no explicit final destination
    building.add_pedestrian(Pedestrian::new(1, Point::new(10.5, 2.), 0, 1));

    // frame 1: relocated into the outside catch region via the transition
    let first = building.update()?;
    assert_eq!(first.relocated, 1);
    let ped = building.get_pedestrian(1).unwrap();
    let outside = building.room_by_caption(OUTSIDE_CAPTION)?;
    assert_eq!(ped.room_id(), outside.id());

    // frame 2: inside the outside room with nowhere left to go
    let second = building.update()?;
    assert_eq!(second.goal_reached, 1);
    assert_eq!(building.pedestrian_count(), 0);
    Ok(())
}

#[test]
fn test_route_failure_removes_pedestrian() -> Result<()> {
    let (mut building, _, _) = two_subroom_hall()?;
    building.set_router(Arc::new(RejectAll));

    building.add_pedestrian(Pedestrian::new(1, Point::new(1., 1.), 0, 0));
    building.add_pedestrian(Pedestrian::new(2, Point::new(2., 2.), 0, 0));
    let outcome = building.update()?;

    assert_eq!(outcome.route_failures, 2);
    assert_eq!(building.pedestrian_count(), 0);
    Ok(())
}

/// A pedestrian standing within tolerance of its own exit line is still
/// contained in the region it is leaving while the neighbour's plain point
/// test already contains it. One accepted single-frame transient, not a
/// defect: the next integration step moves the pedestrian clear of the
/// line and the following pass reassigns it.
#[test]
fn test_exit_line_double_containment_transient() -> Result<()> {
    let (mut building, crossing, crossing_line) = two_subroom_hall()?;
    building.set_router(Arc::new(AcceptAll));

    let mut ped = Pedestrian::new(1, Point::new(5.002, 2.), 0, 0);
    ped.set_exit(crossing, crossing_line);
    building.add_pedestrian(ped);

    let ped = building.get_pedestrian(1).unwrap();
    assert!(building.subroom(0, 0)?.contains_ped(ped));
    assert!(building.subroom(0, 1)?.contains_point(ped.pos()));

    // the pass leaves the old membership in place for this frame
    let outcome = building.update()?;
    assert_eq!(outcome.relocated, 0);
    let ped = building.get_pedestrian(1).unwrap();
    assert_eq!((ped.room_id(), ped.subroom_id()), (0, 0));
    Ok(())
}

#[test]
fn test_apply_config_wires_workers_and_pathway_log() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("paths.txt");

    let (mut building, _, _) = two_subroom_hall()?;
    let config = SimConfig {
        workers: 2,
        cell_size: -1.0,
        pathway_file: Some(path.clone()),
    };
    building.apply_config(&config)?;
    assert_eq!(building.worker_count(), 2);

    building.add_pedestrian(Pedestrian::new(1, Point::new(1., 1.), 0, 0));
    {
        let ped = &mut building.pedestrians_mut()[0];
        ped.record_passage(0, 1);
        // id 99 resolves to no transition and must be skipped
        ped.record_passage(0, 99);
    }
    assert!(building.delete_pedestrian(1)?);

    let content = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "##pedestrian ways");
    assert!(lines.contains(&"hall main exit"));
    // header plus exactly one passage record
    assert_eq!(lines.len(), 4);
    Ok(())
}

#[test]
fn test_prune_stalled_removes_only_idle_pedestrians() -> Result<()> {
    let (mut building, _, _) = two_subroom_hall()?;

    building.add_pedestrian(Pedestrian::new(1, Point::new(1., 1.), 0, 0));
    building.add_pedestrian(Pedestrian::new(2, Point::new(2., 2.), 0, 0));
    building
        .pedestrians_mut()
        .iter_mut()
        .find(|p| p.id() == 2)
        .unwrap()
        .set_pos(Point::new(3., 2.));

    let removed = building.prune_stalled(0.5)?;
    assert_eq!(removed, 1);
    assert!(building.get_pedestrian(1).is_none());
    assert!(building.get_pedestrian(2).is_some());
    Ok(())
}
