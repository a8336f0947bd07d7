use super::collection::{
    CollectionMetadata, DetectionFeatureCollection, FilteringStats, MineBlock, ProcessingParams,
};
use super::contours::{external_contours, Contour};
use super::identity::{block_code, block_id, block_name, persistent_id};
use super::morphology::open;
use super::options::VectorizeOptions;
use super::polygon::repair_ring;
use super::threshold::apply_threshold;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::VectorizeStage;
use crate::error::Result;
use crate::georef::{AffineTransform, GeoReference};
use crate::image::ImageF32;
use geo::{BoundingRect, Centroid};
use log::{debug, info, warn};
use std::time::Instant;

/// Collection plus vectorization diagnostics.
#[derive(Clone, Debug)]
pub struct VectorizeOutput {
    pub collection: DetectionFeatureCollection,
    pub stage: VectorizeStage,
}

struct Candidate {
    contour: Contour,
    area_px: f64,
    area_m2: Option<f64>,
    confidence: f64,
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Convert `surface` into numbered polygon blocks.
///
/// `georef` supplies the pixel→CRS mapping; without it (or with an identity
/// transform) polygons stay in pixel coordinates, ground areas and the CRS are
/// omitted and the area-in-metres filter is skipped.
///
/// Vectorizing the same surface with the same parameters twice yields the
/// same blocks, in the same order, with the same identifiers.
pub fn vectorize(
    surface: &ImageF32,
    georef: Option<&GeoReference>,
    options: &VectorizeOptions,
) -> Result<VectorizeOutput> {
    let start = Instant::now();
    options.validate()?;

    let georef = georef.filter(|g| !g.transform.is_identity());
    let transform_missing = georef.is_none();
    if transform_missing {
        warn!("ProbabilityVectorizer: no transform available, areas in m² are omitted");
    }
    let thresholded = apply_threshold(surface, options.threshold);
    let mask_pixels = thresholded.mask.count();

    let mut metadata = CollectionMetadata {
        threshold_used: thresholded.threshold,
        processing_params: ProcessingParams {
            morphology_kernel: options.morphology_kernel,
            min_area_pixels: options.min_area_px,
            min_area_meters: options.min_area_m2,
            adaptive_threshold: options.threshold.is_adaptive(),
            keep_holes: options.keep_holes,
        },
        transform_missing,
        ..CollectionMetadata::default()
    };
    let make_stage = |metadata: &CollectionMetadata, cleaned_pixels: usize| VectorizeStage {
        elapsed_ms: elapsed_ms(start),
        threshold_used: metadata.threshold_used,
        adaptive: metadata.processing_params.adaptive_threshold,
        mask_pixels,
        cleaned_pixels,
        filtering: metadata.filtering_stats.clone(),
        transform_missing,
    };

    if mask_pixels == 0 {
        info!("ProbabilityVectorizer: no pixels above threshold");
        let stage = make_stage(&metadata, 0);
        return Ok(VectorizeOutput {
            collection: DetectionFeatureCollection::empty(metadata, options.style.clone()),
            stage,
        });
    }

    let cleaned = open(&thresholded.mask, options.morphology_kernel);
    drop(thresholded);
    let cleaned_pixels = cleaned.count();
    let contours = external_contours(&cleaned);
    drop(cleaned);

    let mut stats = FilteringStats {
        total_detected: contours.len(),
        ..FilteringStats::default()
    };
    let pixel_area_m2 = georef.map(GeoReference::pixel_area_m2);
    let mut candidates = Vec::with_capacity(contours.len());
    for contour in contours {
        let area_px = contour.area();
        if area_px < options.min_area_px {
            stats.filtered_by_pixels += 1;
            continue;
        }
        let area_m2 = pixel_area_m2.map(|a| area_px * a);
        if area_m2.is_some_and(|m2| m2 < options.min_area_m2) {
            stats.filtered_by_area += 1;
            continue;
        }
        let confidence = contour.region.mean_of(surface);
        candidates.push(Candidate {
            contour,
            area_px,
            area_m2,
            confidence,
        });
    }
    debug!(
        "ProbabilityVectorizer: {} contours → {} candidates ({} below {} px, {} below {} m²)",
        stats.total_detected,
        candidates.len(),
        stats.filtered_by_pixels,
        options.min_area_px,
        stats.filtered_by_area,
        options.min_area_m2
    );

    // Stable: equal areas keep raster order of their first pixel.
    candidates.sort_by(|a, b| b.area_px.total_cmp(&a.area_px));

    let identity = AffineTransform::identity();
    let transform = georef.map(|g| &g.transform).unwrap_or(&identity);
    let tile_label = options.tile_label.as_deref().filter(|l| !l.is_empty());
    let analysis_id = options.analysis_id.as_deref().filter(|a| !a.is_empty());
    let mut blocks = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let repaired = match repair_ring(&candidate.contour.points, transform, options.keep_holes) {
            Ok(Some(r)) => r,
            Ok(None) => {
                stats.degenerate += 1;
                continue;
            }
            Err(e) => {
                warn!("ProbabilityVectorizer: skipping contour: {e}");
                stats.repair_failures += 1;
                continue;
            }
        };
        stats.discarded_fragments += repaired.discarded_fragments;
        let polygon = repaired.polygon;
        let (Some(centroid), Some(rect)) = (polygon.centroid(), polygon.bounding_rect()) else {
            stats.degenerate += 1;
            continue;
        };

        let index = blocks.len() + 1;
        let code = block_code(tile_label, index);
        let centroid = [centroid.x(), centroid.y()];
        let bbox = [rect.min().x, rect.min().y, rect.max().x, rect.max().y];
        let mut pixel_ring: Vec<[f64; 2]> = candidate
            .contour
            .points
            .iter()
            .map(|&[x, y]| [x as f64, y as f64])
            .collect();
        if let Some(&first) = pixel_ring.first() {
            pixel_ring.push(first);
        }
        blocks.push(MineBlock {
            block_index: index,
            block_id: block_id(analysis_id, &code),
            name: block_name(tile_label, index),
            tile_id: tile_label.map(str::to_string),
            persistent_id: persistent_id(tile_label, centroid, bbox),
            polygon,
            pixel_ring,
            area_px: candidate.area_px as u64,
            area_m2: candidate.area_m2,
            avg_confidence: round_to(candidate.confidence, 3),
            centroid,
            bbox,
            crs: georef.map(|g| g.crs.clone()),
            analysis_id: analysis_id.map(str::to_string),
        });
    }
    stats.kept = blocks.len();

    let total_area_m2: f64 = blocks.iter().filter_map(|b| b.area_m2).sum();
    for block in &mut blocks {
        block.area_m2 = block.area_m2.map(|a| round_to(a, 2));
    }
    metadata.block_count = blocks.len();
    metadata.total_area_m2 = round_to(total_area_m2, 2);
    metadata.avg_confidence = if blocks.is_empty() {
        0.0
    } else {
        round_to(
            blocks.iter().map(|b| b.avg_confidence).sum::<f64>() / blocks.len() as f64,
            3,
        )
    };
    metadata.filtering_stats = stats;

    let stage = make_stage(&metadata, cleaned_pixels);
    info!(
        "ProbabilityVectorizer: {} blocks, {:.3} km² total, threshold {:.3}, {:.1} ms",
        metadata.block_count,
        metadata.total_area_m2 / 1e6,
        metadata.threshold_used,
        stage.elapsed_ms
    );
    Ok(VectorizeOutput {
        collection: DetectionFeatureCollection {
            blocks,
            metadata,
            visualization: options.style.clone(),
        },
        stage,
    })
}
