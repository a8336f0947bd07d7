//! Error kinds surfaced by the detection stages.
//!
//! Hard failures abort the whole invocation. Recoverable per-item problems
//! (a contour that cannot be repaired, a tile without pixel data) are logged,
//! counted in the stage diagnostics and skipped by the stage that owns them.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// AOI bounds are degenerate, non-finite or cannot be tiled.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Mosaic assembly had no tile with pixel data left to merge.
    #[error("no usable tiles to assemble into a mosaic")]
    NoUsableTiles,

    /// The scoring capability failed on a batch; no partial blend is returned.
    #[error("inference failed on batch {batch}: {reason}")]
    InferenceBatch { batch: usize, reason: String },

    /// A single contour could not be turned into a valid simple polygon.
    #[error("geometry repair failed: {reason}")]
    GeometryRepair { reason: String },

    /// Malformed raster or parameter input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DetectionError {
    fn from(e: std::io::Error) -> Self {
        DetectionError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DetectionError {
    fn from(e: serde_json::Error) -> Self {
        DetectionError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DetectionError>;
