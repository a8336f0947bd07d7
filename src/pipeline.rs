//! End-to-end orchestration: assemble → infer → vectorize.
//!
//! Stages run strictly in sequence. The mosaic is moved into inference and
//! released as soon as the surface exists; the surface is released after
//! vectorization unless [`PipelineConfig::retain_surface`] is set.

use crate::config::PipelineConfig;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{DetectionReport, DetectionSummary, GridStage, PipelineTrace, TimingBreakdown};
use crate::error::Result;
use crate::grid::{plan_tiles_for_aoi, AoiGeometry, TileGrid};
use crate::inference::{IsolatedScorer, PatchInferenceEngine, PatchScorer, Preprocessor};
use crate::mosaic::{assemble, MosaicOutput, TileRaster};
use crate::vectorize::vectorize;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Mining-block detector over georeferenced tiles.
pub struct DetectionPipeline {
    config: PipelineConfig,
    engine: PatchInferenceEngine,
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl DetectionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let engine = PatchInferenceEngine::new(config.inference.clone());
        Self { config, engine }
    }

    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.engine = self.engine.with_preprocessor(preprocessor);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Plan the tile grid covering `aoi`.
    pub fn plan(&self, aoi: &AoiGeometry) -> Result<(TileGrid, GridStage)> {
        let start = Instant::now();
        let grid = plan_tiles_for_aoi(aoi, &self.config.grid)?;
        let stage = GridStage {
            elapsed_ms: elapsed_ms(start),
            tile_count: grid.tiles.len(),
            rows: grid.rows,
            cols: grid.cols,
            tile_deg_lon: grid.tile_deg_lon,
            tile_deg_lat: grid.tile_deg_lat,
        };
        Ok((grid, stage))
    }

    /// Assemble `tiles` and run detection on the resulting mosaic.
    pub fn detect<S>(&self, tiles: &[TileRaster], scorer: Arc<S>) -> Result<DetectionReport>
    where
        S: PatchScorer + 'static,
    {
        let mosaic = assemble(tiles)?;
        self.detect_mosaic(mosaic, scorer)
    }

    /// Run inference and vectorization on an already assembled mosaic.
    ///
    /// With `inference.score_timeout_ms` set, every scorer call runs on an
    /// long-lived isolated worker pool, bounded by that timeout.
    pub fn detect_mosaic<S>(&self, mosaic: MosaicOutput, scorer: Arc<S>) -> Result<DetectionReport>
    where
        S: PatchScorer + 'static,
    {
        let start = Instant::now();
        self.config.validate()?;
        let scorer: Box<dyn PatchScorer> = match self.config.inference.score_timeout_ms {
            Some(ms) => Box::new(IsolatedScorer::new(scorer, Duration::from_millis(ms))),
            None => Box::new(scorer),
        };

        let MosaicOutput {
            mosaic,
            stage: mosaic_stage,
        } = mosaic;
        let georef = Arc::clone(&mosaic.georef);
        let bounds = mosaic.bounds;
        let mask_shape = [mosaic.data.h, mosaic.data.w];

        let inference = self.engine.run(mosaic.data, scorer.as_ref())?;
        let surface = inference.surface.with_georef(Arc::clone(&georef));

        let vectorized = vectorize(&surface.image, Some(georef.as_ref()), &self.config.vectorize)?;
        let surface = self.config.retain_surface.then_some(surface);

        let summary = DetectionSummary::new(
            &vectorized.collection,
            &inference.stage,
            mask_shape,
            bounds,
            &georef.crs,
            &georef.transform,
        );
        let mut timings = TimingBreakdown::for_run(mosaic_stage.elapsed_ms + elapsed_ms(start));
        timings.record("mosaic", mosaic_stage.elapsed_ms);
        timings.record("inference", inference.stage.elapsed_ms);
        timings.record("vectorize", vectorized.stage.elapsed_ms);
        info!(
            "DetectionPipeline: {} blocks, {:.2}% of {} px flagged, {:.1} ms",
            summary.block_count, summary.mining_percentage, summary.total_pixels, timings.total_ms
        );

        Ok(DetectionReport {
            collection: vectorized.collection,
            summary,
            trace: PipelineTrace {
                timings,
                grid: None,
                mosaic: mosaic_stage,
                inference: inference.stage,
                vectorize: vectorized.stage,
            },
            surface,
        })
    }
}
