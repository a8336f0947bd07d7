use super::bounds::GeoBounds;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-15;

/// Pixel → CRS affine mapping backed by a 3×3 homogeneous matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct AffineTransform {
    mtx: Matrix3<f64>,
}

impl AffineTransform {
    /// Build from coefficients in `(a, b, c, d, e, f)` order.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            mtx: Matrix3::new(a, b, c, d, e, f, 0.0, 0.0, 1.0),
        }
    }

    pub fn identity() -> Self {
        Self {
            mtx: Matrix3::identity(),
        }
    }

    /// North-up transform stretching `bounds` linearly over a `width × height`
    /// pixel grid; the origin is the north-west corner.
    pub fn from_bounds(bounds: &GeoBounds, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 || bounds.is_degenerate() {
            return None;
        }
        let a = bounds.width() / width as f64;
        let e = -bounds.height() / height as f64;
        Some(Self::new(a, 0.0, bounds.min_x, 0.0, e, bounds.max_y))
    }

    /// Coefficients in `(a, b, c, d, e, f)` order.
    pub fn coefficients(&self) -> [f64; 6] {
        let m = &self.mtx;
        [m[(0, 0)], m[(0, 1)], m[(0, 2)], m[(1, 0)], m[(1, 1)], m[(1, 2)]]
    }

    /// Coefficients in GDAL geotransform order `(c, a, b, f, d, e)`.
    pub fn to_gdal(&self) -> [f64; 6] {
        let [a, b, c, d, e, f] = self.coefficients();
        [c, a, b, f, d, e]
    }

    #[inline]
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let v = self.mtx * Vector3::new(col, row, 1.0);
        (v[0], v[1])
    }

    pub fn inverse(&self) -> Option<Self> {
        if self.pixel_area() <= EPS {
            return None;
        }
        self.mtx.try_inverse().map(|mtx| Self { mtx })
    }

    pub fn is_identity(&self) -> bool {
        self.mtx == Matrix3::identity()
    }

    /// True when the transform has no rotation/shear terms.
    pub fn is_axis_aligned(&self) -> bool {
        let [_, b, _, d, _, _] = self.coefficients();
        b == 0.0 && d == 0.0
    }

    /// Pixel width and (signed) pixel height, i.e. `(a, e)`.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.mtx[(0, 0)], self.mtx[(1, 1)])
    }

    /// Area of one pixel in CRS units squared.
    pub fn pixel_area(&self) -> f64 {
        let [a, b, _, d, e, _] = self.coefficients();
        (a * e - b * d).abs()
    }

    /// Extent covered by a `height × width` raster under this transform.
    pub fn array_bounds(&self, height: usize, width: usize) -> GeoBounds {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(width as f64, 0.0),
            self.apply(0.0, height as f64),
            self.apply(width as f64, height as f64),
        ];
        GeoBounds::from_points(corners.iter().copied()).unwrap_or_default()
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 6]> for AffineTransform {
    fn from(c: [f64; 6]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }
}

impl From<AffineTransform> for [f64; 6] {
    fn from(t: AffineTransform) -> Self {
        t.coefficients()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bounds_maps_corners() {
        let b = GeoBounds::new(10.0, 20.0, 12.0, 21.0);
        let t = AffineTransform::from_bounds(&b, 200, 100).expect("transform");
        assert_eq!(t.apply(0.0, 0.0), (10.0, 21.0));
        let (x, y) = t.apply(200.0, 100.0);
        assert!((x - 12.0).abs() < 1e-12 && (y - 20.0).abs() < 1e-12);
        assert!((t.pixel_area() - 0.01 * 0.01).abs() < 1e-15);
    }

    #[test]
    fn inverse_round_trips() {
        let t = AffineTransform::new(0.5, 0.0, 100.0, 0.0, -0.25, 50.0);
        let inv = t.inverse().expect("invertible");
        let (x, y) = t.apply(7.0, 3.0);
        let (c, r) = inv.apply(x, y);
        assert!((c - 7.0).abs() < 1e-9 && (r - 3.0).abs() < 1e-9);
    }

    #[test]
    fn gdal_order() {
        let t = AffineTransform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(t.to_gdal(), [3.0, 1.0, 2.0, 6.0, 4.0, 5.0]);
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        assert!(AffineTransform::new(0.0, 0.0, 1.0, 0.0, 1.0, 1.0).inverse().is_none());
    }
}
