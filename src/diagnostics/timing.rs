//! Wall-clock bookkeeping for the detection stages.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Milliseconds elapsed since `start`.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// One named stage and how long it ran.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Stage times of one run, in execution order.
///
/// `total_ms` is measured around the whole run, so it also covers the
/// hand-offs between stages; see [`TimingBreakdown::overhead_ms`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Start a breakdown for a run that took `total_ms` end to end.
    pub fn for_run(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn record(&mut self, label: &str, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            label: label.to_string(),
            elapsed_ms,
        });
    }

    /// Time spent in stage `label`, if it ran.
    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }

    /// Run time not attributed to any recorded stage.
    pub fn overhead_ms(&self) -> f64 {
        let staged: f64 = self.stages.iter().map(|s| s.elapsed_ms).sum();
        (self.total_ms - staged).max(0.0)
    }
}
