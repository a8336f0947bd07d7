use crate::image::ImageF32;

/// Minimum blending weight; keeps patch corners contributing.
pub const MIN_WEIGHT: f32 = 0.1;

/// Radial blending mask: `clip(1 − d / d_max, 0.1, 1.0)` where `d` is the
/// distance from the integer patch centre and `d_max` the centre-to-corner
/// distance.
pub fn radial_weight_mask(size: usize) -> ImageF32 {
    let mut mask = ImageF32::filled(size, size, 1.0);
    let center = (size / 2) as f32;
    let max_dist = (2.0 * center * center).sqrt();
    if max_dist <= 0.0 {
        return mask;
    }
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let d = (dx * dx + dy * dy).sqrt();
            mask.set(x, y, (1.0 - d / max_dist).clamp(MIN_WEIGHT, 1.0));
        }
    }
    mask
}
