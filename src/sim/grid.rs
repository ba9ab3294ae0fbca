use crate::geom::bboxes::BoundingBox;
use crate::sim::pedestrian::Pedestrian;

/// The linked-cell neighborhood index consumed by the force model.
///
/// The building only drives its lifecycle: `rebuild` once the geometry
/// bounds and cell size are known, `refresh` with the current roster
/// between frames. Bucketing and neighbor queries are the implementor's
/// business.
pub trait SpatialIndex: Send + Sync {
    fn rebuild(&mut self, bounds: BoundingBox, cell_size: f64, ped_count: usize);

    fn refresh(&mut self, peds: &[Pedestrian]);
}
