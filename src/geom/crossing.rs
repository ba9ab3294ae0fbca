use crate::geom::line::Line;
use crate::geom::navline::{GoalId, NavLine};

/// A navigable link between two subrooms of the same room. Crossings never
/// gate passage: they are always open.
#[derive(Debug, Clone)]
pub struct Crossing {
    id: i32,
    caption: String,
    goal_id: GoalId,
    line: Line,
    room_id: usize,
    subroom1: usize,
    subroom2: usize,
}

impl Crossing {
    pub(crate) fn new(
        id: i32,
        caption: &str,
        line: Line,
        room_id: usize,
        subroom1: usize,
        subroom2: usize,
        goal_id: GoalId,
    ) -> Self {
        Self {
            id,
            caption: caption.to_string(),
            goal_id,
            line,
            room_id,
            subroom1,
            subroom2,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn room_id(&self) -> usize {
        self.room_id
    }

    pub fn subroom1(&self) -> usize {
        self.subroom1
    }

    pub fn subroom2(&self) -> usize {
        self.subroom2
    }

    /// Crossings never close.
    pub fn is_open(&self) -> bool {
        true
    }

    pub fn in_room(&self, room_id: usize) -> bool {
        self.room_id == room_id
    }

    pub fn in_subroom(&self, subroom_id: usize) -> bool {
        self.subroom1 == subroom_id || self.subroom2 == subroom_id
    }

    /// Given one side of the crossing, returns the (room, subroom) on the
    /// other side, or `None` if the queried side does not belong to this
    /// crossing.
    pub fn other_subroom(&self, room_id: usize, subroom_id: usize) -> Option<(usize, usize)> {
        if self.room_id != room_id {
            return None;
        }
        if subroom_id == self.subroom1 {
            Some((self.room_id, self.subroom2))
        } else if subroom_id == self.subroom2 {
            Some((self.room_id, self.subroom1))
        } else {
            None
        }
    }
}

impl NavLine for Crossing {
    fn goal_id(&self) -> GoalId {
        self.goal_id
    }

    fn line(&self) -> &Line {
        &self.line
    }

    fn caption(&self) -> &str {
        &self.caption
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point::Point;

    fn make_crossing() -> Crossing {
        let line = Line::new(Point::new(5., 0.), Point::new(5., 4.));
        Crossing::new(1, "door", line, 0, 0, 1, GoalId(0))
    }

    #[test]
    fn test_other_subroom() {
        let c = make_crossing();
        assert_eq!(c.other_subroom(0, 0), Some((0, 1)));
        assert_eq!(c.other_subroom(0, 1), Some((0, 0)));
        assert_eq!(c.other_subroom(0, 7), None);
        assert_eq!(c.other_subroom(3, 0), None);
    }

    #[test]
    fn test_always_open() {
        assert!(make_crossing().is_open());
    }
}
