use crate::geom::line::Line;
use crate::geom::navline::{GoalId, NavLine};

/// One side of a transition: the room and subroom it opens into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionSide {
    pub room_id: usize,
    pub subroom_id: usize,
}

/// A navigable link between two subrooms of possibly different rooms, or
/// between a subroom and the building exterior (one side absent). Carries a
/// mutable gate state; a closed transition still acts as boundary for
/// polygons and sight lines, it is only the routing layer that stops
/// sending pedestrians through it.
#[derive(Debug, Clone)]
pub struct Transition {
    id: i32,
    caption: String,
    kind: String,
    goal_id: GoalId,
    line: Line,
    side1: Option<TransitionSide>,
    side2: Option<TransitionSide>,
    open: bool,
}

impl Transition {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: i32,
        caption: &str,
        kind: &str,
        line: Line,
        side1: Option<TransitionSide>,
        side2: Option<TransitionSide>,
        goal_id: GoalId,
    ) -> Self {
        Self {
            id,
            caption: caption.to_string(),
            kind: kind.to_string(),
            goal_id,
            line,
            side1,
            side2,
            open: true,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn side1(&self) -> Option<TransitionSide> {
        self.side1
    }

    pub fn side2(&self) -> Option<TransitionSide> {
        self.side2
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// A transition with an absent side leads out of the building.
    pub fn is_exit(&self) -> bool {
        self.side1.is_none() || self.side2.is_none()
    }

    pub fn in_room(&self, room_id: usize) -> bool {
        self.side1.map_or(false, |s| s.room_id == room_id)
            || self.side2.map_or(false, |s| s.room_id == room_id)
    }

    /// Given one side, returns the other, or `None` when the other side is
    /// absent (building exterior) or the queried side does not match.
    pub fn other_side(&self, room_id: usize, subroom_id: usize) -> Option<TransitionSide> {
        let queried = TransitionSide {
            room_id,
            subroom_id,
        };
        if self.side1 == Some(queried) {
            self.side2
        } else if self.side2 == Some(queried) {
            self.side1
        } else {
            None
        }
    }
}

impl NavLine for Transition {
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

    fn make_transition(side2: Option<TransitionSide>) -> Transition {
        let line = Line::new(Point::new(10., 0.), Point::new(10., 4.));
        let side1 = Some(TransitionSide {
            room_id: 0,
            subroom_id: 1,
        });
        Transition::new(3, "main exit", "normal", line, side1, side2, GoalId(5))
    }

    #[test]
    fn test_gate_state() {
        let mut t = make_transition(None);
        assert!(t.is_open());
        t.close();
        assert!(!t.is_open());
        t.open();
        assert!(t.is_open());
    }

    #[test]
    fn test_is_exit() {
        assert!(make_transition(None).is_exit());
        let inner = make_transition(Some(TransitionSide {
            room_id: 1,
            subroom_id: 0,
        }));
        assert!(!inner.is_exit());
    }

    #[test]
    fn test_other_side() {
        let t = make_transition(Some(TransitionSide {
            room_id: 1,
            subroom_id: 0,
        }));
        assert_eq!(
            t.other_side(0, 1),
            Some(TransitionSide {
                room_id: 1,
                subroom_id: 0
            })
        );
        assert_eq!(
            t.other_side(1, 0),
            Some(TransitionSide {
                room_id: 0,
                subroom_id: 1
            })
        );
        assert_eq!(t.other_side(2, 2), None);

        // exterior transition has no other side
        let exit = make_transition(None);
        assert_eq!(exit.other_side(0, 1), None);
    }
}
