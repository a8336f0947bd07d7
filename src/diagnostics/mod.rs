//! Diagnostics data model returned alongside detection results.
//!
//! `DetectionReport` is the entry point returned by the pipeline: it bundles
//! the feature collection, a `DetectionSummary` of coverage statistics, and a
//! `PipelineTrace` recording what each stage did and how long it took.

pub mod pipeline;
pub mod stages;
pub mod timing;

pub use pipeline::{DetectionReport, DetectionSummary, PipelineTrace};
pub use stages::{GridStage, InferenceStage, MosaicStage, VectorizeStage};
pub use timing::{StageTiming, TimingBreakdown};
