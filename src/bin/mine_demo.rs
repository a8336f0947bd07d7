//! Synthetic end-to-end run: plan → synthesize tiles → detect → write products.

use mine_detector::config::demo::{DemoConfig, SyntheticScene};
use mine_detector::config::load_config;
use mine_detector::georef::{AffineTransform, DEFAULT_CRS, METERS_PER_DEGREE};
use mine_detector::grid::{AoiGeometry, Tile};
use mine_detector::image::io::{save_probability_heatmap, save_rgb_preview, write_json_file};
use mine_detector::image::{ImageF32, RasterF32};
use mine_detector::inference::{PatchScorer, ScoreResult};
use mine_detector::mosaic::{assemble, TileRaster};
use mine_detector::{DetectionPipeline, DetectionReport, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Scores patches by mean brightness; bright excavations read as mining.
struct BrightnessScorer;

impl PatchScorer for BrightnessScorer {
    fn score_batch(&self, patches: &[RasterF32]) -> ScoreResult {
        Ok(patches
            .iter()
            .map(|patch| {
                let mut out = ImageF32::new(patch.w, patch.h);
                for y in 0..patch.h {
                    for x in 0..patch.w {
                        let px = patch.pixel(x, y);
                        let mean = px.iter().sum::<f32>() / px.len().max(1) as f32 / 255.0;
                        out.set(x, y, ((mean - 0.25) / 0.5).clamp(0.0, 1.0));
                    }
                }
                out
            })
            .collect())
    }
}

fn run() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/mine_demo.json"));
    let mut config: DemoConfig = load_config(&path)?;
    if let Some(id) = config.analysis_id.clone() {
        config.pipeline.vectorize.analysis_id = Some(id);
    }
    if config.output.heatmap_out.is_some() {
        config.pipeline.retain_surface = true;
    }

    let pipeline = DetectionPipeline::new(config.pipeline.clone());
    let aoi = AoiGeometry::from_ring(&config.aoi);
    let (grid, grid_stage) = pipeline.plan(&aoi)?;
    let aoi_center = aoi.bounds()?.center();

    let tiles: Vec<TileRaster> = grid
        .tiles
        .iter()
        .map(|tile| synthesize_tile(tile, &config.scene, aoi_center))
        .collect();
    let mosaic = assemble(&tiles)?;
    drop(tiles);
    if let Some(out) = &config.output.preview_out {
        save_rgb_preview(&mosaic.mosaic.data, out)?;
        println!("RGB preview written to {}", out.display());
    }

    let mut report = pipeline.detect_mosaic(mosaic, Arc::new(BrightnessScorer))?;
    report.attach_grid(grid_stage);
    print_summary(&report);

    if let Some(out) = &config.output.geojson_out {
        write_json_file(out, &report.collection)?;
        println!("GeoJSON written to {}", out.display());
    }
    if let Some(out) = &config.output.report_out {
        write_json_file(out, &report)?;
        println!("Report written to {}", out.display());
    }
    if let (Some(out), Some(surface)) = (&config.output.heatmap_out, &report.surface) {
        save_probability_heatmap(&surface.image, out)?;
        println!("Heatmap written to {}", out.display());
    }
    Ok(())
}

/// Render one tile of the synthetic scene at `scene.tile_px` resolution.
fn synthesize_tile(tile: &Tile, scene: &SyntheticScene, aoi_center: (f64, f64)) -> TileRaster {
    if scene.drop_every > 0 && (tile.id + 1) % scene.drop_every == 0 {
        return TileRaster::missing(tile.label.clone());
    }
    let extent = tile.extent();
    let size = scene.tile_px.max(1);
    let Some(transform) = AffineTransform::from_bounds(&extent, size, size) else {
        return TileRaster::missing(tile.label.clone());
    };
    let default_pit = [(aoi_center.0, aoi_center.1, 300.0)];
    let pits: Vec<(f64, f64, f64)> = if scene.pits.is_empty() {
        default_pit.to_vec()
    } else {
        scene.pits.iter().map(|p| (p.lon, p.lat, p.radius_m)).collect()
    };

    let raster = RasterF32::from_fn(size, size, scene.bands.max(1), |x, y, band| {
        let (lon, lat) = transform.apply(x as f64 + 0.5, y as f64 + 0.5);
        let m_per_deg_lon = METERS_PER_DEGREE * lat.to_radians().cos();
        let inside = pits.iter().any(|&(plon, plat, r)| {
            let dx = (lon - plon) * m_per_deg_lon;
            let dy = (lat - plat) * METERS_PER_DEGREE;
            dx * dx + dy * dy <= r * r
        });
        let texture = ((x * 7 + y * 13 + band * 5) % 17) as f32 * 6.0;
        if inside {
            scene.pit_value - texture
        } else {
            scene.background + texture
        }
    });
    TileRaster::new(tile.label.clone(), raster)
        .with_transform(transform)
        .with_crs(DEFAULT_CRS)
}

fn print_summary(report: &DetectionReport) {
    let s = &report.summary;
    println!("Detection summary");
    println!("  mining detected: {}", s.mining_detected);
    println!("  blocks: {}", s.block_count);
    println!(
        "  mining pixels: {} / {} ({:.2}%)",
        s.mining_pixels, s.total_pixels, s.mining_percentage
    );
    println!(
        "  total area: {:.3} km² ({:.2} ha)",
        s.total_area_m2 / 1e6,
        s.total_area_m2 / 1e4
    );
    println!("  mean block confidence: {:.3}", s.confidence);
    println!(
        "  prediction max/mean: {:.3} / {:.3}",
        s.max_prediction, s.mean_prediction
    );
    for block in &report.collection.blocks {
        println!(
            "    {:>10}  {:>8} px  {:>12.1} m²  conf {:.3}  id {}",
            block.block_id,
            block.area_px,
            block.area_m2.unwrap_or(0.0),
            block.avg_confidence,
            block.persistent_id
        );
    }
    let t = &report.trace.timings;
    println!("  timings (total {:.1} ms):", t.total_ms);
    for stage in &t.stages {
        println!("    {:<10} {:>8.1} ms", stage.label, stage.elapsed_ms);
    }
    println!("    {:<10} {:>8.1} ms", "other", t.overhead_ms());
}
