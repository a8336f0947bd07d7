//! JSON configuration for the pipeline and the demo tool.
//!
//! Every section is optional in the file; missing fields take the stage
//! defaults.

pub mod demo;

use crate::error::{DetectionError, Result};
use crate::grid::GridOptions;
use crate::inference::InferenceOptions;
use crate::vectorize::VectorizeOptions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for every stage of [`DetectionPipeline`](crate::DetectionPipeline).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub grid: GridOptions,
    pub inference: InferenceOptions,
    pub vectorize: VectorizeOptions,
    /// Return the probability surface in the report instead of dropping it
    pub retain_surface: bool,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.inference.validate()?;
        self.vectorize.validate()
    }
}

/// Read and parse a JSON config file.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| {
        DetectionError::Config(format!("failed to read config {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        DetectionError::Config(format!("failed to parse config {}: {e}", path.display()))
    })
}
