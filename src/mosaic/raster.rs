use crate::error::{DetectionError, Result};
use crate::georef::{AffineTransform, GeoBounds, GeoReference, DEFAULT_CRS};
use crate::image::RasterF32;

/// Pixel payload for one fetched tile.
///
/// A tile may arrive without pixel data (the fetch failed) or without a
/// transform (only its planned bounds are known). The former is skipped by
/// the assembler; the latter gets a transform derived from its bounds.
#[derive(Clone, Debug)]
pub struct TileRaster {
    pub tile_id: String,
    pub data: Option<RasterF32>,
    pub transform: Option<AffineTransform>,
    pub bounds: Option<GeoBounds>,
    pub crs: Option<String>,
}

impl TileRaster {
    pub fn new(tile_id: impl Into<String>, data: RasterF32) -> Self {
        Self {
            tile_id: tile_id.into(),
            data: Some(data),
            transform: None,
            bounds: None,
            crs: None,
        }
    }

    /// Placeholder for a tile whose fetch produced no pixels.
    pub fn missing(tile_id: impl Into<String>) -> Self {
        Self {
            tile_id: tile_id.into(),
            data: None,
            transform: None,
            bounds: None,
            crs: None,
        }
    }

    pub fn with_transform(mut self, transform: AffineTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_bounds(mut self, bounds: GeoBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// The explicit transform, or one fitted linearly from bounds and pixel shape.
    pub fn resolve_georeference(&self) -> Result<GeoReference> {
        let crs = self.crs.clone().unwrap_or_else(|| DEFAULT_CRS.to_string());
        if let Some(transform) = self.transform {
            return Ok(GeoReference::new(transform, crs));
        }
        let data = self.data.as_ref().ok_or_else(|| {
            DetectionError::InvalidInput(format!("tile {} has no pixel data", self.tile_id))
        })?;
        let bounds = self.bounds.ok_or_else(|| {
            DetectionError::InvalidInput(format!(
                "tile {} has neither a transform nor bounds",
                self.tile_id
            ))
        })?;
        let transform = AffineTransform::from_bounds(&bounds, data.w, data.h).ok_or_else(|| {
            DetectionError::InvalidInput(format!(
                "cannot derive a transform for tile {} from bounds {:?} and shape {}x{}",
                self.tile_id, bounds, data.w, data.h
            ))
        })?;
        Ok(GeoReference::new(transform, crs))
    }
}
