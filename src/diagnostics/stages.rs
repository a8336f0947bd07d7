use crate::vectorize::FilteringStats;
use serde::Serialize;

/// Tile grid planning.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridStage {
    pub elapsed_ms: f64,
    pub tile_count: usize,
    pub rows: usize,
    pub cols: usize,
    pub tile_deg_lon: f64,
    pub tile_deg_lat: f64,
}

/// Mosaic assembly.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicStage {
    pub elapsed_ms: f64,
    pub tiles_received: usize,
    pub tiles_used: usize,
    pub skipped_tiles: Vec<String>,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Fraction of mosaic cells that received a tile sample
    pub filled_fraction: f32,
    /// Pixels each used tile won under the first-wins policy, in input order
    pub pixels_per_tile: Vec<usize>,
}

/// Overlapping patch inference and blending.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStage {
    pub elapsed_ms: f64,
    pub patch_size: usize,
    pub step: usize,
    pub padded_width: usize,
    pub padded_height: usize,
    pub patch_count: usize,
    pub batch_count: usize,
    /// Smallest accumulated weight over the cropped canvas before division
    pub min_weight: f32,
    /// Cells whose weight was zero and were divided by one instead
    pub zero_weight_cells: usize,
    pub input_min: f32,
    pub input_max: f32,
    pub max_prediction: f32,
    pub mean_prediction: f32,
    pub parallel: bool,
}

/// Thresholding, cleaning and vectorization.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorizeStage {
    pub elapsed_ms: f64,
    pub threshold_used: f32,
    pub adaptive: bool,
    pub mask_pixels: usize,
    pub cleaned_pixels: usize,
    pub filtering: FilteringStats,
    pub transform_missing: bool,
}
