//! Overlap-aware patch inference with smooth blending.
//!
//! The mosaic is normalised to `[0, 255]`, handed to the injected
//! preprocessor, then scored in fixed-size patches on a stride of
//! `patch_size · (1 − overlap)`. Each prediction is multiplied by a radial
//! weight mask (centre ≈ 1, corners 0.1) and accumulated into a prediction
//! canvas alongside the weights themselves; dividing the two yields a
//! seam-free surface, which is cropped back to the input size and given one
//! light Gaussian pass.
//!
//! Modules
//! - `scorer` – the injected scoring capability and its isolation wrapper.
//! - `preprocess` – input normalisation and the preprocessing capability.
//! - `weights` – the radial blending mask.
//! - `engine` – patch layout, batching, accumulation and resolution.

mod engine;
mod preprocess;
mod scorer;
mod weights;

pub use engine::{InferenceOptions, InferenceOutput, PatchInferenceEngine, ProbabilitySurface};
pub use preprocess::{normalize_to_byte_range, IdentityPreprocessor, Preprocessor};
pub use scorer::{FnScorer, IsolatedScorer, PatchScorer, ScoreResult};
pub use weights::radial_weight_mask;
