use super::preprocess::{normalize_to_byte_range, IdentityPreprocessor, Preprocessor};
use super::scorer::PatchScorer;
use super::weights::radial_weight_mask;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::InferenceStage;
use crate::error::{DetectionError, Result};
use crate::filters::GaussianFilter;
use crate::georef::GeoReference;
use crate::image::{ImageF32, RasterF32};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Parameters for [`PatchInferenceEngine`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceOptions {
    /// Side length of the square patches handed to the scorer
    pub patch_size: usize,
    /// Fractional overlap between neighbouring patches, in `[0, 1)`
    pub overlap: f32,
    /// Patches per scorer call
    pub batch_size: usize,
    /// Gaussian sigma of the final smoothing pass; `0` disables it
    pub smoothing_sigma: f32,
    /// Per-batch wall-clock limit when the scorer runs isolated
    pub score_timeout_ms: Option<u64>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            patch_size: 256,
            overlap: 0.5,
            batch_size: 4,
            smoothing_sigma: 1.0,
            score_timeout_ms: None,
        }
    }
}

impl InferenceOptions {
    pub fn with_patch_size(mut self, patch_size: usize) -> Self {
        self.patch_size = patch_size;
        self
    }

    pub fn with_overlap(mut self, overlap: f32) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_smoothing_sigma(mut self, sigma: f32) -> Self {
        self.smoothing_sigma = sigma;
        self
    }

    pub fn with_score_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.score_timeout_ms = Some(timeout_ms);
        self
    }

    /// Stride between patch origins: `floor(patch_size · (1 − overlap))`.
    pub fn step(&self) -> usize {
        (self.patch_size as f64 * (1.0 - self.overlap as f64)) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.patch_size == 0 {
            return Err(DetectionError::Config("patch_size must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(DetectionError::Config(format!(
                "overlap must lie in [0, 1), got {}",
                self.overlap
            )));
        }
        if self.step() == 0 {
            return Err(DetectionError::Config(format!(
                "overlap {} leaves no stride for patch_size {}",
                self.overlap, self.patch_size
            )));
        }
        if self.batch_size == 0 {
            return Err(DetectionError::Config("batch_size must be positive".into()));
        }
        if !self.smoothing_sigma.is_finite() || self.smoothing_sigma < 0.0 {
            return Err(DetectionError::Config(format!(
                "smoothing_sigma must be a non-negative number, got {}",
                self.smoothing_sigma
            )));
        }
        Ok(())
    }
}

/// Per-pixel mining probability aligned with the mosaic grid.
#[derive(Clone, Debug)]
pub struct ProbabilitySurface {
    pub image: ImageF32,
    pub georef: Option<Arc<GeoReference>>,
}

impl ProbabilitySurface {
    pub fn new(image: ImageF32) -> Self {
        Self {
            image,
            georef: None,
        }
    }

    pub fn with_georef(mut self, georef: Arc<GeoReference>) -> Self {
        self.georef = Some(georef);
        self
    }

    pub fn width(&self) -> usize {
        self.image.w
    }

    pub fn height(&self) -> usize {
        self.image.h
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.image.get(x, y)
    }
}

/// Surface plus inference diagnostics.
#[derive(Clone, Debug)]
pub struct InferenceOutput {
    pub surface: ProbabilitySurface,
    pub stage: InferenceStage,
}

/// Prediction and weight accumulators over the padded canvas.
struct BlendCanvas {
    width: usize,
    height: usize,
    prediction: Vec<f32>,
    weight: Vec<f32>,
}

impl BlendCanvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            prediction: vec![0.0; width * height],
            weight: vec![0.0; width * height],
        }
    }

    fn accumulate(&mut self, origin: (usize, usize), patch: &ImageF32, mask: &ImageF32) {
        let (x0, y0) = origin;
        let size = mask.w;
        for dy in 0..size {
            let row = (y0 + dy) * self.width + x0;
            let pred_row = &mut self.prediction[row..row + size];
            let weight_row = &mut self.weight[row..row + size];
            let patch_row = &patch.data[dy * size..(dy + 1) * size];
            let mask_row = &mask.data[dy * size..(dy + 1) * size];
            for i in 0..size {
                pred_row[i] += patch_row[i] * mask_row[i];
                weight_row[i] += mask_row[i];
            }
        }
    }

    /// Divide predictions by weights (zero weight divides by one) and crop to
    /// `w × h`. Returns the blended image, the minimum weight inside the crop
    /// and the number of zero-weight cells inside the crop.
    fn resolve(self, w: usize, h: usize) -> (ImageF32, f32, usize) {
        let mut out = ImageF32::new(w, h);
        let mut min_weight = f32::INFINITY;
        let mut zero_cells = 0usize;
        for y in 0..h.min(self.height) {
            for x in 0..w.min(self.width) {
                let i = y * self.width + x;
                let wgt = self.weight[i];
                min_weight = min_weight.min(wgt);
                let denom = if wgt == 0.0 {
                    zero_cells += 1;
                    1.0
                } else {
                    wgt
                };
                out.set(x, y, self.prediction[i] / denom);
            }
        }
        if !min_weight.is_finite() {
            min_weight = 0.0;
        }
        (out, min_weight, zero_cells)
    }
}

/// Sliding-window segmentation over a whole mosaic.
pub struct PatchInferenceEngine {
    options: InferenceOptions,
    preprocessor: Box<dyn Preprocessor>,
}

impl Default for PatchInferenceEngine {
    fn default() -> Self {
        Self::new(InferenceOptions::default())
    }
}

impl PatchInferenceEngine {
    pub fn new(options: InferenceOptions) -> Self {
        Self {
            options,
            preprocessor: Box::new(IdentityPreprocessor),
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn options(&self) -> &InferenceOptions {
        &self.options
    }

    /// Produce the blended probability surface for `mosaic`.
    ///
    /// The mosaic is consumed; it is normalised in place and released before
    /// smoothing. Any scorer failure aborts the run with
    /// [`DetectionError::InferenceBatch`] and no partial surface.
    pub fn run(&self, mut mosaic: RasterF32, scorer: &dyn PatchScorer) -> Result<InferenceOutput> {
        let start = Instant::now();
        self.options.validate()?;
        if mosaic.is_empty() {
            return Err(DetectionError::InvalidInput(
                "mosaic has no pixels to score".into(),
            ));
        }
        let (w, h) = (mosaic.w, mosaic.h);
        let patch = self.options.patch_size;
        let step = self.options.step();

        let (input_min, input_max) = normalize_to_byte_range(&mut mosaic).unwrap_or((0.0, 0.0));
        self.preprocessor.apply(&mut mosaic);

        let padded_w = w.div_ceil(step) * step + patch;
        let padded_h = h.div_ceil(step) * step + patch;
        let origins: Vec<(usize, usize)> = (0..=padded_h - patch)
            .step_by(step)
            .flat_map(|y| (0..=padded_w - patch).step_by(step).map(move |x| (x, y)))
            .collect();
        let batch_count = origins.len().div_ceil(self.options.batch_size);
        debug!(
            "PatchInferenceEngine: {}x{} → padded {}x{}, patch={} step={} patches={} batches={}",
            w,
            h,
            padded_w,
            padded_h,
            patch,
            step,
            origins.len(),
            batch_count
        );

        let mask = radial_weight_mask(patch);
        let canvas = self.score_all(&mosaic, &origins, &mask, scorer, padded_w, padded_h)?;
        drop(mosaic);

        let (blended, min_weight, zero_weight_cells) = canvas.resolve(w, h);
        let mut image = if self.options.smoothing_sigma > 0.0 {
            GaussianFilter::new(self.options.smoothing_sigma).apply(&blended)
        } else {
            blended
        };
        for v in &mut image.data {
            *v = v.clamp(0.0, 1.0);
        }

        let (_, max_prediction) = image.min_max().unwrap_or((0.0, 0.0));
        let mean_prediction = image.mean();
        let stage = InferenceStage {
            elapsed_ms: elapsed_ms(start),
            patch_size: patch,
            step,
            padded_width: padded_w,
            padded_height: padded_h,
            patch_count: origins.len(),
            batch_count,
            min_weight,
            zero_weight_cells,
            input_min,
            input_max,
            max_prediction,
            mean_prediction,
            parallel: cfg!(feature = "parallel"),
        };
        info!(
            "PatchInferenceEngine: {} patches in {:.1} ms, max={:.3} mean={:.3}",
            stage.patch_count, stage.elapsed_ms, max_prediction, mean_prediction
        );
        Ok(InferenceOutput {
            surface: ProbabilitySurface::new(image),
            stage,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all(
        &self,
        mosaic: &RasterF32,
        origins: &[(usize, usize)],
        mask: &ImageF32,
        scorer: &dyn PatchScorer,
        padded_w: usize,
        padded_h: usize,
    ) -> Result<BlendCanvas> {
        let mut canvas = BlendCanvas::new(padded_w, padded_h);
        for (batch, chunk) in origins.chunks(self.options.batch_size).enumerate() {
            let predictions = self.score_chunk(batch, chunk, mosaic, scorer)?;
            for (&origin, prediction) in chunk.iter().zip(&predictions) {
                canvas.accumulate(origin, prediction, mask);
            }
        }
        Ok(canvas)
    }

    #[cfg(feature = "parallel")]
    fn score_all(
        &self,
        mosaic: &RasterF32,
        origins: &[(usize, usize)],
        mask: &ImageF32,
        scorer: &dyn PatchScorer,
        padded_w: usize,
        padded_h: usize,
    ) -> Result<BlendCanvas> {
        use rayon::prelude::*;
        use std::sync::Mutex;

        let canvas = Mutex::new(BlendCanvas::new(padded_w, padded_h));
        origins
            .par_chunks(self.options.batch_size)
            .enumerate()
            .try_for_each(|(batch, chunk)| -> Result<()> {
                let predictions = self.score_chunk(batch, chunk, mosaic, scorer)?;
                let mut guard = canvas.lock().map_err(|_| DetectionError::InferenceBatch {
                    batch,
                    reason: "accumulator lock poisoned".into(),
                })?;
                for (&origin, prediction) in chunk.iter().zip(&predictions) {
                    guard.accumulate(origin, prediction, mask);
                }
                Ok(())
            })?;
        canvas.into_inner().map_err(|_| DetectionError::InferenceBatch {
            batch: 0,
            reason: "accumulator lock poisoned".into(),
        })
    }

    /// Extract, score and validate one batch of patches.
    fn score_chunk(
        &self,
        batch: usize,
        chunk: &[(usize, usize)],
        mosaic: &RasterF32,
        scorer: &dyn PatchScorer,
    ) -> Result<Vec<ImageF32>> {
        let patch = self.options.patch_size;
        let patches: Vec<RasterF32> = chunk
            .iter()
            .map(|&(x, y)| mosaic.window_zero_padded(x, y, patch))
            .collect();
        let predictions = scorer
            .score_batch(&patches)
            .map_err(|reason| DetectionError::InferenceBatch { batch, reason })?;
        if predictions.len() != patches.len() {
            return Err(DetectionError::InferenceBatch {
                batch,
                reason: format!(
                    "scorer returned {} predictions for {} patches",
                    predictions.len(),
                    patches.len()
                ),
            });
        }
        for p in &predictions {
            if p.w != patch || p.h != patch {
                return Err(DetectionError::InferenceBatch {
                    batch,
                    reason: format!(
                        "prediction is {}x{}, expected {}x{}",
                        p.w, p.h, patch, patch
                    ),
                });
            }
            if p.data.iter().any(|v| !v.is_finite()) {
                return Err(DetectionError::InferenceBatch {
                    batch,
                    reason: "prediction contains non-finite values".into(),
                });
            }
        }
        Ok(predictions)
    }
}
