use super::{GridStage, InferenceStage, MosaicStage, TimingBreakdown, VectorizeStage};
use crate::georef::{AffineTransform, Ring};
use crate::inference::ProbabilitySurface;
use crate::vectorize::DetectionFeatureCollection;
use serde::Serialize;

/// Result produced by [`DetectionPipeline::detect`](crate::DetectionPipeline).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub collection: DetectionFeatureCollection,
    pub summary: DetectionSummary,
    pub trace: PipelineTrace,
    /// Blended surface, kept only when the pipeline is configured to retain it
    #[serde(skip)]
    pub surface: Option<ProbabilitySurface>,
}

/// Coverage statistics over the whole mosaic.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub mining_detected: bool,
    pub block_count: usize,
    /// Sum of block pixel areas
    pub mining_pixels: u64,
    pub total_pixels: u64,
    pub mining_percentage: f64,
    pub total_area_m2: f64,
    /// Mean block confidence
    pub confidence: f64,
    pub max_prediction: f32,
    pub mean_prediction: f32,
    /// `[height, width]`
    pub mask_shape: [usize; 2],
    pub bounds: Ring,
    pub crs: String,
    /// GDAL-ordered geotransform of the mosaic
    pub transform: [f64; 6],
}

impl DetectionSummary {
    pub(crate) fn new(
        collection: &DetectionFeatureCollection,
        inference: &InferenceStage,
        mask_shape: [usize; 2],
        bounds: Ring,
        crs: &str,
        transform: &AffineTransform,
    ) -> Self {
        let mining_pixels: u64 = collection.blocks.iter().map(|b| b.area_px).sum();
        let total_pixels = (mask_shape[0] * mask_shape[1]) as u64;
        let mining_percentage = if total_pixels > 0 {
            mining_pixels as f64 / total_pixels as f64 * 100.0
        } else {
            0.0
        };
        Self {
            mining_detected: mining_pixels > 0,
            block_count: collection.metadata.block_count,
            mining_pixels,
            total_pixels,
            mining_percentage,
            total_area_m2: collection.metadata.total_area_m2,
            confidence: collection.metadata.avg_confidence,
            max_prediction: inference.max_prediction,
            mean_prediction: inference.mean_prediction,
            mask_shape,
            bounds,
            crs: crs.to_string(),
            transform: transform.to_gdal(),
        }
    }
}

/// Per-stage trace of one pipeline run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub timings: TimingBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridStage>,
    pub mosaic: MosaicStage,
    pub inference: InferenceStage,
    pub vectorize: VectorizeStage,
}

impl DetectionReport {
    /// Record the planning stage that produced this run's tiles.
    pub fn attach_grid(&mut self, stage: GridStage) {
        self.trace.timings.record("grid", stage.elapsed_ms);
        self.trace.timings.total_ms += stage.elapsed_ms;
        self.trace.grid = Some(stage);
    }
}
