use super::PipelineConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Where the demo writes its artefacts; every output is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    pub geojson_out: Option<PathBuf>,
    pub report_out: Option<PathBuf>,
    pub heatmap_out: Option<PathBuf>,
    pub preview_out: Option<PathBuf>,
}

/// Circular bright excavation painted into the synthetic scene.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticPit {
    pub lon: f64,
    pub lat: f64,
    pub radius_m: f64,
}

/// Synthetic imagery standing in for the acquisition layer.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyntheticScene {
    /// Pixels per tile side; overrides the planner's tile size for speed
    pub tile_px: usize,
    pub bands: usize,
    pub background: f32,
    pub pit_value: f32,
    /// Without pits, one is placed at the AOI centre
    pub pits: Vec<SyntheticPit>,
    /// Leave every n-th tile without data to exercise skipping; 0 disables
    pub drop_every: usize,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            tile_px: 128,
            bands: 4,
            background: 800.0,
            pit_value: 2600.0,
            pits: Vec::new(),
            drop_every: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoConfig {
    /// AOI exterior ring as `[lon, lat]` pairs
    pub aoi: Vec<[f64; 2]>,
    #[serde(default)]
    pub analysis_id: Option<String>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub scene: SyntheticScene,
    #[serde(default)]
    pub output: OutputConfig,
}
