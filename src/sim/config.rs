use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime knobs of the consistency engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Worker threads for the route-recomputation phase of the per-frame
    /// update.
    pub workers: usize,
    /// Linked-cell size passed to
    /// [`Building::init_grid`](crate::geom::building::Building::init_grid);
    /// zero or negative requests one giant cell (brute-force neighborhood
    /// queries).
    pub cell_size: f64,
    /// File receiving the path history of removed pedestrians, if any.
    pub pathway_file: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            workers: rayon::current_num_threads(),
            cell_size: -1.0,
            pathway_file: None,
        }
    }
}
