#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod inference;
pub mod mosaic;
pub mod pipeline;
pub mod vectorize;

// Building blocks shared by the stages.
pub mod filters;
pub mod georef;
pub mod image;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::{load_config, PipelineConfig};
pub use crate::error::{DetectionError, Result};
pub use crate::pipeline::DetectionPipeline;

// High-level diagnostics returned by the pipeline.
pub use crate::diagnostics::{DetectionReport, DetectionSummary, PipelineTrace};

// One entry point per stage.
pub use crate::grid::{compute_tile_grid, plan_tiles_for_aoi};
pub use crate::inference::PatchInferenceEngine;
pub use crate::mosaic::assemble;
pub use crate::vectorize::vectorize;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use mine_detector::prelude::*;
/// use std::sync::Arc;
///
/// # fn main() -> mine_detector::Result<()> {
/// let tile = TileRaster::new("tile_1", RasterF32::new(256, 256, 4))
///     .with_bounds(GeoBounds::new(30.0, -2.0, 30.02, -1.98));
/// let scorer = FnScorer::new(|patch: &RasterF32| Ok(ImageF32::new(patch.w, patch.h)));
///
/// let pipeline = DetectionPipeline::new(PipelineConfig::default());
/// let report = pipeline.detect(&[tile], Arc::new(scorer))?;
/// println!("blocks={} area_m2={:.1}", report.summary.block_count, report.summary.total_area_m2);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::georef::{AffineTransform, GeoBounds, GeoReference};
    pub use crate::grid::{AoiGeometry, GridOptions, Tile};
    pub use crate::image::{ImageF32, RasterF32};
    pub use crate::inference::{FnScorer, InferenceOptions, PatchScorer};
    pub use crate::mosaic::TileRaster;
    pub use crate::vectorize::{DetectionFeatureCollection, ThresholdPolicy, VectorizeOptions};
    pub use crate::{DetectionPipeline, DetectionReport, PipelineConfig};
}
