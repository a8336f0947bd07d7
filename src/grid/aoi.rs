use crate::error::{DetectionError, Result};
use crate::georef::GeoBounds;
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon};

/// User-drawn AOI in geographic `(lon, lat)` coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum AoiGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl AoiGeometry {
    /// Polygon from a single exterior ring of `[lon, lat]` pairs.
    pub fn from_ring(ring: &[[f64; 2]]) -> Self {
        let coords: Vec<Coord<f64>> = ring.iter().map(|p| Coord { x: p[0], y: p[1] }).collect();
        AoiGeometry::Polygon(Polygon::new(LineString::new(coords), vec![]))
    }

    /// Bounding box of all rings; fails when the AOI has no coordinates or
    /// collapses to a line or point.
    pub fn bounds(&self) -> Result<GeoBounds> {
        let rect = match self {
            AoiGeometry::Polygon(p) => p.bounding_rect(),
            AoiGeometry::MultiPolygon(mp) => mp.bounding_rect(),
        }
        .ok_or_else(|| DetectionError::InvalidGeometry("AOI has no coordinates".to_string()))?;
        let bounds = GeoBounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
        if bounds.is_degenerate() {
            return Err(DetectionError::InvalidGeometry(format!(
                "AOI bounding box is degenerate: {:?}",
                bounds
            )));
        }
        Ok(bounds)
    }
}

impl From<Polygon<f64>> for AoiGeometry {
    fn from(p: Polygon<f64>) -> Self {
        AoiGeometry::Polygon(p)
    }
}

impl From<MultiPolygon<f64>> for AoiGeometry {
    fn from(mp: MultiPolygon<f64>) -> Self {
        AoiGeometry::MultiPolygon(mp)
    }
}
