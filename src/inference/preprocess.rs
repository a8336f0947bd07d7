use crate::image::RasterF32;

/// Model-specific input transform applied after `[0, 255]` normalisation.
pub trait Preprocessor: Send + Sync {
    fn apply(&self, raster: &mut RasterF32);
}

/// Pass-through preprocessing for models that normalise internally.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityPreprocessor;

impl Preprocessor for IdentityPreprocessor {
    fn apply(&self, _raster: &mut RasterF32) {}
}

/// Rescale every band together to `[0, 255]` using the global min/max.
///
/// A constant raster (`min == max`) is left untouched. Returns the original
/// `(min, max)`.
pub fn normalize_to_byte_range(raster: &mut RasterF32) -> Option<(f32, f32)> {
    let (lo, hi) = raster.min_max()?;
    if hi > lo {
        let scale = 255.0 / (hi - lo);
        for v in &mut raster.data {
            *v = (*v - lo) * scale;
        }
    }
    Some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_uses_global_range() {
        let mut r = RasterF32::from_vec(2, 1, 2, vec![100.0, 200.0, 300.0, 500.0]).expect("raster");
        assert_eq!(normalize_to_byte_range(&mut r), Some((100.0, 500.0)));
        assert_eq!(r.data, vec![0.0, 63.75, 127.5, 255.0]);
    }

    #[test]
    fn constant_raster_passes_through() {
        let mut r = RasterF32::from_fn(3, 3, 1, |_, _, _| 42.0);
        normalize_to_byte_range(&mut r);
        assert!(r.data.iter().all(|&v| v == 42.0));
    }
}
