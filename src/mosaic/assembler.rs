use super::raster::TileRaster;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::MosaicStage;
use crate::error::{DetectionError, Result};
use crate::georef::{AffineTransform, GeoBounds, GeoReference, Ring};
use crate::image::RasterF32;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Single aligned raster composed from all usable tiles.
#[derive(Clone, Debug)]
pub struct Mosaic {
    pub data: RasterF32,
    pub georef: Arc<GeoReference>,
    /// Closed ring `(x, y)` of the mosaic extent
    pub bounds: Ring,
}

impl Mosaic {
    pub fn transform(&self) -> &AffineTransform {
        &self.georef.transform
    }

    pub fn crs(&self) -> &str {
        &self.georef.crs
    }
}

/// Mosaic plus the assembly diagnostics.
#[derive(Clone, Debug)]
pub struct MosaicOutput {
    pub mosaic: Mosaic,
    pub stage: MosaicStage,
}

struct Source<'a> {
    tile_id: &'a str,
    data: &'a RasterF32,
    inverse: AffineTransform,
    extent: GeoBounds,
}

/// Merge `tiles` into one raster using the first-wins policy.
pub fn assemble(tiles: &[TileRaster]) -> Result<MosaicOutput> {
    let start = Instant::now();
    let mut skipped = Vec::new();
    let mut sources = Vec::with_capacity(tiles.len());
    let mut reference: Option<GeoReference> = None;

    for tile in tiles {
        let Some(data) = tile.data.as_ref().filter(|d| !d.is_empty()) else {
            warn!("MosaicAssembler: tile {} has no pixel data, skipping", tile.tile_id);
            skipped.push(tile.tile_id.clone());
            continue;
        };
        if data.channels == 0 {
            return Err(DetectionError::InvalidInput(format!(
                "tile {} has no bands",
                tile.tile_id
            )));
        }
        let georef = tile.resolve_georeference()?;
        if !georef.transform.is_axis_aligned() {
            return Err(DetectionError::InvalidInput(format!(
                "tile {} has a rotated transform",
                tile.tile_id
            )));
        }
        let inverse = georef.transform.inverse().ok_or_else(|| {
            DetectionError::InvalidInput(format!(
                "tile {} has a singular transform",
                tile.tile_id
            ))
        })?;
        if let Some(first) = reference.as_ref() {
            let first_channels = sources
                .first()
                .map(|s: &Source<'_>| s.data.channels)
                .unwrap_or(data.channels);
            if data.channels != first_channels {
                return Err(DetectionError::InvalidInput(format!(
                    "tile {} has {} bands, expected {}",
                    tile.tile_id, data.channels, first_channels
                )));
            }
            if georef.crs != first.crs {
                warn!(
                    "MosaicAssembler: tile {} CRS {} differs from mosaic CRS {}; merging without reprojection",
                    tile.tile_id, georef.crs, first.crs
                );
            }
        }
        let extent = georef.transform.array_bounds(data.h, data.w);
        if reference.is_none() {
            reference = Some(georef);
        }
        sources.push(Source {
            tile_id: &tile.tile_id,
            data,
            inverse,
            extent,
        });
    }

    let Some(reference) = reference else {
        return Err(DetectionError::NoUsableTiles);
    };

    let extent = sources
        .iter()
        .skip(1)
        .fold(sources[0].extent, |acc, s| acc.union(&s.extent));
    let (res_x, res_y) = reference.transform.pixel_size();
    let (res_x, res_y) = (res_x.abs(), res_y.abs());
    let width = (extent.width() / res_x).round().max(1.0) as usize;
    let height = (extent.height() / res_y).round().max(1.0) as usize;
    let transform = AffineTransform::new(res_x, 0.0, extent.min_x, 0.0, -res_y, extent.max_y);
    let channels = sources[0].data.channels;
    debug!(
        "MosaicAssembler: {} sources → {}x{}x{} grid, res=({:.3e}, {:.3e})",
        sources.len(),
        width,
        height,
        channels,
        res_x,
        res_y
    );

    let mut data = RasterF32::new(width, height, channels);
    let mut filled = vec![false; width * height];
    let mut pixels_written = Vec::with_capacity(sources.len());
    for source in &sources {
        let written = paint_first_wins(source, &transform, &mut data, &mut filled);
        debug!(
            "MosaicAssembler: tile {} contributed {} pixels",
            source.tile_id, written
        );
        pixels_written.push(written);
    }

    let bounds = transform.array_bounds(height, width).ring();
    let georef = Arc::new(GeoReference::new(transform, reference.crs));
    let coverage = filled.iter().filter(|&&f| f).count();
    let stage = MosaicStage {
        elapsed_ms: elapsed_ms(start),
        tiles_received: tiles.len(),
        tiles_used: sources.len(),
        skipped_tiles: skipped,
        width,
        height,
        channels,
        filled_fraction: coverage as f32 / (width * height) as f32,
        pixels_per_tile: pixels_written,
    };
    info!(
        "MosaicAssembler: {}x{} mosaic from {}/{} tiles (crs {})",
        width,
        height,
        stage.tiles_used,
        stage.tiles_received,
        georef.crs
    );
    Ok(MosaicOutput {
        mosaic: Mosaic {
            data,
            georef,
            bounds,
        },
        stage,
    })
}

/// Nearest-neighbour copy of `source` into the still-empty cells of `dst`.
fn paint_first_wins(
    source: &Source<'_>,
    dst_transform: &AffineTransform,
    dst: &mut RasterF32,
    filled: &mut [bool],
) -> usize {
    let Some(dst_inverse) = dst_transform.inverse() else {
        return 0;
    };
    // Output window touched by this tile's extent.
    let (c0, r0) = dst_inverse.apply(source.extent.min_x, source.extent.max_y);
    let (c1, r1) = dst_inverse.apply(source.extent.max_x, source.extent.min_y);
    let col_lo = c0.min(c1).floor().max(0.0) as usize;
    let col_hi = (c0.max(c1).ceil().max(0.0) as usize).min(dst.w);
    let row_lo = r0.min(r1).floor().max(0.0) as usize;
    let row_hi = (r0.max(r1).ceil().max(0.0) as usize).min(dst.h);

    let src = source.data;
    let mut written = 0usize;
    for row in row_lo..row_hi {
        for col in col_lo..col_hi {
            let idx = row * dst.w + col;
            if filled[idx] {
                continue;
            }
            let (x, y) = dst_transform.apply(col as f64 + 0.5, row as f64 + 0.5);
            let (sc, sr) = source.inverse.apply(x, y);
            let (sc, sr) = (sc.floor(), sr.floor());
            if sc < 0.0 || sr < 0.0 || sc >= src.w as f64 || sr >= src.h as f64 {
                continue;
            }
            dst.pixel_mut(col, row)
                .copy_from_slice(src.pixel(sc as usize, sr as usize));
            filled[idx] = true;
            written += 1;
        }
    }
    written
}
