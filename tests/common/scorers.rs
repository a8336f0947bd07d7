use mine_detector::image::{ImageF32, RasterF32};
use mine_detector::inference::{PatchScorer, ScoreResult};
use std::thread;
use std::time::Duration;

/// Same probability everywhere.
pub struct ConstantScorer(pub f32);

impl PatchScorer for ConstantScorer {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        Ok(patches
            .iter()
            .map(|p| ImageF32::filled(p.w, p.h, self.0))
            .collect())
    }
}

/// Band 0 of the (normalised) patch divided by 255.
pub struct EchoScorer;

impl PatchScorer for EchoScorer {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        Ok(patches
            .iter()
            .map(|p| {
                let mut band = p.band(0);
                for v in &mut band.data {
                    *v /= 255.0;
                }
                band
            })
            .collect())
    }
}

/// Mean brightness mapped so that normalised values above ~190 read as mining.
pub struct BrightnessScorer;

impl PatchScorer for BrightnessScorer {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        Ok(patches
            .iter()
            .map(|p| {
                let mut out = ImageF32::new(p.w, p.h);
                for y in 0..p.h {
                    for x in 0..p.w {
                        let px = p.pixel(x, y);
                        let mean = px.iter().sum::<f32>() / px.len() as f32 / 255.0;
                        out.set(x, y, if mean > 0.5 { 0.95 } else { 0.02 });
                    }
                }
                out
            })
            .collect())
    }
}

/// Fails every call.
pub struct FailingScorer;

impl PatchScorer for FailingScorer {
    fn score_batch(&self, _patches: &[RasterF32]) -> ScoreResult {
        Err("model runtime unavailable".to_string())
    }
}

/// Returns predictions of the wrong size.
pub struct WrongShapeScorer;

impl PatchScorer for WrongShapeScorer {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        Ok(patches.iter().map(|_| ImageF32::new(3, 3)).collect())
    }
}

/// Sleeps before answering.
pub struct SlowScorer(pub Duration);

impl PatchScorer for SlowScorer {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        thread::sleep(self.0);
        Ok(patches.iter().map(|p| ImageF32::new(p.w, p.h)).collect())
    }
}
