//! Probability surface → numbered, georeferenced polygon blocks.
//!
//! Stages, in order:
//! - `threshold` – fixed cutoff or Otsu split clamped to a floor.
//! - `morphology` – one elliptical opening pass to drop speckle.
//! - `contours` – outermost components, traced at full resolution.
//! - area filters and confidence attribution (in `vectorizer`).
//! - `polygon` – mapping through the affine transform and ring repair.
//! - `identity` – block codes and content-hashed persistent ids.
//!
//! The result is a [`DetectionFeatureCollection`] that serializes to a
//! GeoJSON `FeatureCollection`.

mod collection;
mod contours;
mod identity;
mod morphology;
mod options;
mod polygon;
mod threshold;
mod vectorizer;

pub use collection::{
    CollectionMetadata, DetectionFeatureCollection, FilteringStats, MineBlock, ProcessingParams,
};
pub use contours::{external_contours, Contour, FilledRegion};
pub use identity::{block_code, block_id, block_name, persistent_id, PERSISTENT_ID_LEN};
pub use morphology::{dilate, erode, open, StructuringElement};
pub use options::{ThresholdPolicy, VectorizeOptions, VisualizationStyle};
pub use polygon::{repair_ring, split_loops, RepairedPolygon};
pub use threshold::{apply_threshold, binarize, otsu_level, Thresholded};
pub use vectorizer::{vectorize, VectorizeOutput};
