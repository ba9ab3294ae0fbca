pub mod geom;
pub mod sim;

// Prelude
pub use geom::building::{Building, Goal, UpdateOutcome};
pub use geom::line::Line;
pub use geom::navline::{GoalId, NavLine, RegionUid};
pub use geom::obstacle::Obstacle;
pub use geom::point::Point;
pub use geom::room::{Room, RoomState};
pub use geom::subroom::{SubRoom, SubRoomKind};
pub use geom::wall::Wall;
pub use sim::config::SimConfig;
pub use sim::grid::SpatialIndex;
pub use sim::pedestrian::Pedestrian;
pub use sim::router::RoutingEngine;
