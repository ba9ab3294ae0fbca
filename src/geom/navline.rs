//! Identity of navigable line entities.
//!
//! Crossings, transitions and helper lines each carry an id within their
//! own registry, plus a [`GoalId`] drawn from one shared space spanning all
//! three kinds. Region goal lists, adjacency and visibility queries key on
//! the shared space. Both `GoalId` and [`RegionUid`] are handed out by the
//! [`Building`](crate::geom::building::Building) when the entity is
//! inserted, so they are stable regardless of registry layout.

use crate::geom::line::Line;
use std::fmt;

/// Identifier from the combined crossing + transition + helper-line space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoalId(pub usize);

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "goal#{}", self.0)
    }
}

/// Stable identifier of a region, independent of its position within its
/// room. Assigned when the owning room is added to the building, never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionUid(pub usize);

impl RegionUid {
    pub(crate) const UNASSIGNED: RegionUid = RegionUid(usize::MAX);
}

impl fmt::Display for RegionUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// Shared capability of every uniquely-identified navigable line.
pub trait NavLine {
    fn goal_id(&self) -> GoalId;
    fn line(&self) -> &Line;
    fn caption(&self) -> &str {
        ""
    }
}
