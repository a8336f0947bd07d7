//! I/O helpers for rasters, visual products and JSON.
//!
//! - `save_probability_heatmap`: render a probability surface with a blue→cyan ramp.
//! - `save_rgb_preview`: true-colour preview from bands (2, 1, 0) of a multi-band raster.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF32, RasterF32, RasterView};
use crate::error::{DetectionError, Result};
use image::{Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Reflectance range mapped onto 0–255 by the RGB preview.
pub const PREVIEW_CLIP: (f32, f32) = (0.0, 3000.0);

/// Colour ramp used for probability visualisation.
pub fn heatmap_color(p: f32) -> [u8; 3] {
    let p = p.clamp(0.0, 1.0);
    if p < 0.1 {
        [0, 0, (p * 10.0 * 50.0) as u8]
    } else if p < 0.3 {
        let t = (p - 0.1) / 0.2;
        [0, 0, (50.0 + t * 100.0) as u8]
    } else if p < 0.7 {
        let t = (p - 0.3) / 0.4;
        [0, (t * 150.0) as u8, (150.0 + t * 105.0) as u8]
    } else {
        let t = (p - 0.7) / 0.3;
        [(t * 100.0) as u8, (150.0 + t * 105.0) as u8, 255]
    }
}

/// Render a probability surface to an RGB buffer.
pub fn render_heatmap(surface: &ImageF32) -> RgbImage {
    let mut out = RgbImage::new(surface.w as u32, surface.h as u32);
    for (y, row) in surface.rows().enumerate() {
        for (x, &p) in row.iter().enumerate() {
            out.put_pixel(x as u32, y as u32, Rgb(heatmap_color(p)));
        }
    }
    out
}

pub fn save_probability_heatmap(surface: &ImageF32, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    render_heatmap(surface)
        .save(path)
        .map_err(|e| DetectionError::Io(format!("Failed to save {}: {e}", path.display())))
}

/// Render a true-colour preview; rasters with fewer than three bands yield `None`.
pub fn render_rgb_preview(raster: &RasterF32, clip: (f32, f32)) -> Option<RgbImage> {
    if raster.channels < 3 {
        return None;
    }
    let (lo, mut hi) = clip;
    if hi <= lo {
        hi = lo + 1.0;
    }
    let mut out = RgbImage::new(raster.w as u32, raster.h as u32);
    for y in 0..raster.h {
        for x in 0..raster.w {
            let px = raster.pixel(x, y);
            let scale = |v: f32| (((v - lo) / (hi - lo)).clamp(0.0, 1.0) * 255.0) as u8;
            out.put_pixel(x as u32, y as u32, Rgb([scale(px[2]), scale(px[1]), scale(px[0])]));
        }
    }
    Some(out)
}

pub fn save_rgb_preview(raster: &RasterF32, path: &Path) -> Result<()> {
    let preview = render_rgb_preview(raster, PREVIEW_CLIP).ok_or_else(|| {
        DetectionError::InvalidInput(format!(
            "RGB preview needs at least 3 bands, raster has {}",
            raster.channels
        ))
    })?;
    ensure_parent_dir(path)?;
    preview
        .save(path)
        .map_err(|e| DetectionError::Io(format!("Failed to save {}: {e}", path.display())))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        DetectionError::Io(format!("Failed to serialize JSON for {}: {e}", path.display()))
    })?;
    fs::write(path, json).map_err(|e| {
        DetectionError::Io(format!("Failed to write JSON {}: {e}", path.display()))
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                DetectionError::Io(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
    }
    Ok(())
}
