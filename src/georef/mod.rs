//! Georeferencing primitives shared by every stage.
//!
//! - [`AffineTransform`] maps pixel `(col, row)` to CRS `(x, y)` using the
//!   six-coefficient convention `x = a·col + b·row + c`, `y = d·col + e·row + f`.
//! - [`GeoBounds`] is an axis-aligned extent with a closed 5-point ring view.
//! - [`GeoReference`] pairs a transform with its CRS identifier and is shared
//!   (not copied) between the mosaic and the probability surface.

mod affine;
mod bounds;
mod crs;

pub use affine::AffineTransform;
pub use bounds::{GeoBounds, Ring};
pub use crs::{CrsKind, DEFAULT_CRS, METERS_PER_DEGREE};

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoReference {
    pub transform: AffineTransform,
    pub crs: String,
}

impl GeoReference {
    pub fn new(transform: AffineTransform, crs: impl Into<String>) -> Self {
        Self {
            transform,
            crs: crs.into(),
        }
    }

    pub fn crs_kind(&self) -> CrsKind {
        CrsKind::classify(&self.crs)
    }

    /// Ground area of one pixel in square metres.
    ///
    /// Geographic CRSs use the flat-Earth approximation of
    /// [`METERS_PER_DEGREE`] per degree on both axes, which is only
    /// reasonable for small areas away from the poles.
    pub fn pixel_area_m2(&self) -> f64 {
        let area = self.transform.pixel_area();
        match self.crs_kind() {
            CrsKind::Geographic => area * METERS_PER_DEGREE * METERS_PER_DEGREE,
            CrsKind::Projected => area,
        }
    }
}
