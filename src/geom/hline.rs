use crate::geom::line::Line;
use crate::geom::navline::{GoalId, NavLine};

/// A helper line: a routing and visibility waypoint inside a subroom. It
/// never blocks movement, is not part of the region boundary and is only
/// consulted by containment or visibility code when explicitly requested.
#[derive(Debug, Clone)]
pub struct Hline {
    id: i32,
    goal_id: GoalId,
    line: Line,
    room_id: usize,
    subroom_id: usize,
}

impl Hline {
    pub(crate) fn new(
        id: i32,
        line: Line,
        room_id: usize,
        subroom_id: usize,
        goal_id: GoalId,
    ) -> Self {
        Self {
            id,
            goal_id,
            line,
            room_id,
            subroom_id,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn room_id(&self) -> usize {
        self.room_id
    }

    pub fn subroom_id(&self) -> usize {
        self.subroom_id
    }
}

impl NavLine for Hline {
    fn goal_id(&self) -> GoalId {
        self.goal_id
    }

    fn line(&self) -> &Line {
        &self.line
    }
}
