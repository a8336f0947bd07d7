use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};

/// How the probability surface is binarised.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ThresholdPolicy {
    /// `p > cutoff`
    Fixed { cutoff: f32 },
    /// Otsu split of the 256-bin histogram, never below `floor`
    Adaptive { floor: f32 },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Fixed { cutoff: 0.55 }
    }
}

impl ThresholdPolicy {
    pub fn adaptive() -> Self {
        ThresholdPolicy::Adaptive { floor: 0.30 }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, ThresholdPolicy::Adaptive { .. })
    }
}

/// Rendering hints passed through to overlay consumers untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationStyle {
    pub overlay_opacity: f32,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub label_color: String,
    pub label_font_size: u32,
    pub label_outline_color: String,
    pub label_outline_width: u32,
}

impl Default for VisualizationStyle {
    fn default() -> Self {
        Self {
            overlay_opacity: 0.25,
            fill_color: "#FFD700".to_string(),
            stroke_color: "#FFA500".to_string(),
            stroke_width: 1,
            label_color: "#000000".to_string(),
            label_font_size: 16,
            label_outline_color: "#FFFFFF".to_string(),
            label_outline_width: 2,
        }
    }
}

/// Parameters for [`vectorize`](super::vectorize).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorizeOptions {
    pub threshold: ThresholdPolicy,
    /// Contours with a smaller pixel area are dropped
    pub min_area_px: f64,
    /// Contours with a smaller ground area are dropped (needs a transform)
    pub min_area_m2: f64,
    /// Elliptical opening kernel size; `<= 1` disables cleaning
    pub morphology_kernel: usize,
    /// Keep interior rings produced by repair instead of filling them
    pub keep_holes: bool,
    /// Tile label used in block codes and identifiers
    pub tile_label: Option<String>,
    /// Analysis identifier; its first 8 characters prefix every `block_id`
    pub analysis_id: Option<String>,
    pub style: VisualizationStyle,
}

impl Default for VectorizeOptions {
    fn default() -> Self {
        Self {
            threshold: ThresholdPolicy::default(),
            min_area_px: 1000.0,
            min_area_m2: 1000.0,
            morphology_kernel: 2,
            keep_holes: false,
            tile_label: None,
            analysis_id: None,
            style: VisualizationStyle::default(),
        }
    }
}

impl VectorizeOptions {
    pub fn with_threshold(mut self, threshold: ThresholdPolicy) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_area_px(mut self, min_area_px: f64) -> Self {
        self.min_area_px = min_area_px;
        self
    }

    pub fn with_min_area_m2(mut self, min_area_m2: f64) -> Self {
        self.min_area_m2 = min_area_m2;
        self
    }

    pub fn with_morphology_kernel(mut self, kernel: usize) -> Self {
        self.morphology_kernel = kernel;
        self
    }

    pub fn with_keep_holes(mut self, keep_holes: bool) -> Self {
        self.keep_holes = keep_holes;
        self
    }

    pub fn with_tile_label(mut self, label: impl Into<String>) -> Self {
        self.tile_label = Some(label.into()).filter(|l: &String| !l.is_empty());
        self
    }

    pub fn with_analysis_id(mut self, analysis_id: impl Into<String>) -> Self {
        self.analysis_id = Some(analysis_id.into()).filter(|a: &String| !a.is_empty());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let cutoff = match self.threshold {
            ThresholdPolicy::Fixed { cutoff } => cutoff,
            ThresholdPolicy::Adaptive { floor } => floor,
        };
        if !cutoff.is_finite() {
            return Err(DetectionError::Config(format!(
                "threshold must be finite, got {cutoff}"
            )));
        }
        if !self.min_area_px.is_finite() || !self.min_area_m2.is_finite() {
            return Err(DetectionError::Config("area floors must be finite".into()));
        }
        Ok(())
    }
}
