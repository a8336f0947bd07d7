mod common;

use common::scorers::{BrightnessScorer, FailingScorer, SlowScorer};
use common::synthetic::{raster_with_bright_square, split_into_tiles};
use mine_detector::grid::AoiGeometry;
use mine_detector::inference::InferenceOptions;
use mine_detector::mosaic::TileRaster;
use mine_detector::vectorize::VectorizeOptions;
use mine_detector::{DetectionError, DetectionPipeline, PipelineConfig};
use std::sync::Arc;
use std::time::Duration;

const WEST: f64 = 30.0;
const NORTH: f64 = -1.9;
const PIXEL_DEG: f64 = 0.0001;

/// 2×2 tiles of 64 px with a bright 48 px square straddling all four.
fn scene() -> Vec<TileRaster> {
    let raster = raster_with_bright_square(128, 128, 4, (40, 40, 48), 800.0, 2600.0);
    split_into_tiles(&raster, 64, WEST, NORTH, PIXEL_DEG)
}

fn config() -> PipelineConfig {
    PipelineConfig {
        inference: InferenceOptions::default().with_patch_size(32),
        vectorize: VectorizeOptions::default()
            .with_min_area_px(100.0)
            .with_min_area_m2(100.0)
            .with_analysis_id("e2e0e2e0e2e0"),
        ..PipelineConfig::default()
    }
}

#[test]
fn square_across_tile_seams_is_one_block() {
    common::init_logger();
    let pipeline = DetectionPipeline::new(config());
    let report = pipeline
        .detect(&scene(), Arc::new(BrightnessScorer))
        .expect("detection");

    let blocks = &report.collection.blocks;
    assert_eq!(blocks.len(), 1, "blocks: {blocks:?}");
    let block = &blocks[0];
    assert_eq!(block.crs.as_deref(), Some("EPSG:4326"));
    assert!(block.area_m2.is_some());
    assert_eq!(block.block_id, "e2e0e2e0-B1");
    assert!(block.avg_confidence > 0.8);
    // Spans the seam at 64 px on both axes.
    let seam_lon = WEST + 64.0 * PIXEL_DEG;
    let seam_lat = NORTH - 64.0 * PIXEL_DEG;
    assert!(block.bbox[0] < seam_lon && block.bbox[2] > seam_lon);
    assert!(block.bbox[1] < seam_lat && block.bbox[3] > seam_lat);
    assert!((1900..=2400).contains(&block.area_px), "area_px {}", block.area_px);

    let summary = &report.summary;
    assert!(summary.mining_detected);
    assert_eq!(summary.block_count, 1);
    assert_eq!(summary.mining_pixels, block.area_px);
    assert_eq!(summary.total_pixels, 128 * 128);
    assert_eq!(summary.mask_shape, [128, 128]);
    assert_eq!(summary.crs, "EPSG:4326");
    assert!(report.surface.is_none());

    assert_eq!(report.trace.mosaic.tiles_used, 4);
    let names: Vec<_> = report
        .trace
        .timings
        .stages
        .iter()
        .map(|s| s.label.as_str())
        .collect();
    assert_eq!(names, ["mosaic", "inference", "vectorize"]);

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["collection"]["type"], "FeatureCollection");
    assert_eq!(json["summary"]["blockCount"], 1);
}

#[test]
fn planning_stage_is_recorded() {
    let pipeline = DetectionPipeline::new(config());
    let aoi = AoiGeometry::from_ring(&[
        [WEST, NORTH - 0.0128],
        [WEST + 0.0128, NORTH - 0.0128],
        [WEST + 0.0128, NORTH],
        [WEST, NORTH],
        [WEST, NORTH - 0.0128],
    ]);
    let (grid, stage) = pipeline.plan(&aoi).expect("plan");
    assert_eq!(stage.tile_count, grid.tiles.len());

    let mut report = pipeline
        .detect(&scene(), Arc::new(BrightnessScorer))
        .expect("detection");
    let before = report.trace.timings.total_ms;
    report.attach_grid(stage);
    assert!(report.trace.grid.is_some());
    assert!(report.trace.timings.total_ms >= before);
    assert!(report.trace.timings.stages.iter().any(|s| s.label == "grid"));
}

#[test]
fn retained_surface_matches_mosaic() {
    let config = PipelineConfig {
        retain_surface: true,
        ..config()
    };
    let report = DetectionPipeline::new(config)
        .detect(&scene(), Arc::new(BrightnessScorer))
        .expect("detection");
    let surface = report.surface.expect("retained surface");
    assert_eq!((surface.width(), surface.height()), (128, 128));
    let georef = surface.georef.as_ref().expect("surface georef");
    assert_eq!(georef.crs, "EPSG:4326");
    assert!(surface.get(64, 64) > 0.9);
    assert!(surface.get(5, 5) < 0.1);
}

#[test]
fn scorer_failure_propagates() {
    let err = DetectionPipeline::new(config())
        .detect(&scene(), Arc::new(FailingScorer))
        .expect_err("failing scorer");
    assert!(matches!(err, DetectionError::InferenceBatch { .. }));
}

#[test]
fn slow_scorer_is_bounded_by_timeout() {
    let mut config = config();
    config.inference = config.inference.with_score_timeout_ms(20);
    let err = DetectionPipeline::new(config)
        .detect(&scene(), Arc::new(SlowScorer(Duration::from_millis(500))))
        .expect_err("timeout");
    assert!(matches!(err, DetectionError::InferenceBatch { .. }));
}

#[test]
fn all_tiles_missing_is_reported() {
    let tiles = [TileRaster::missing("tile_1"), TileRaster::missing("tile_2")];
    let err = DetectionPipeline::new(config())
        .detect(&tiles, Arc::new(BrightnessScorer))
        .expect_err("no tiles");
    assert!(matches!(err, DetectionError::NoUsableTiles));
}
