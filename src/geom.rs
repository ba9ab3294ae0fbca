pub mod bboxes;
pub mod building;
pub mod crossing;
pub mod hline;
pub mod line;
pub mod navline;
pub mod obstacle;
pub mod point;
pub mod polygon;
pub mod room;
pub mod subroom;
pub mod transition;
pub mod wall;

/// Geometric precision
pub const EPS: f64 = 1e-13;

/// Distance below which two segment endpoints are joined during polygon
/// chaining.
pub const TOLERANCE: f64 = 0.03;

/// Distance below which a pedestrian standing on its exit line still counts
/// as contained in the region it is leaving.
pub const EPS_GOAL: f64 = 0.005;
