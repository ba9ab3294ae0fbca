use crate::sim::pedestrian::Pedestrian;

/// The route-search collaborator.
///
/// The building calls `find_route` once per pedestrian per frame, from
/// several worker threads at once; implementations must therefore tolerate
/// concurrent calls for distinct pedestrians and keep no per-call mutable
/// state of their own. On success the router assigns the pedestrian's next
/// target via [`Pedestrian::set_exit`].
pub trait RoutingEngine: Send + Sync {
    /// Returns true if a target was assigned to the pedestrian.
    fn find_route(&self, ped: &mut Pedestrian) -> bool;

    /// Routers may bundle several named strategies; the default has none.
    fn other_router(&self, _index: usize) -> Option<&dyn RoutingEngine> {
        None
    }
}
