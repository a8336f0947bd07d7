//! Binarisation of the probability surface.

use super::options::ThresholdPolicy;
use crate::image::{ImageF32, MaskU8};
use log::{info, warn};

/// Binary mask plus the cutoff that produced it.
pub struct Thresholded {
    pub mask: MaskU8,
    pub threshold: f32,
}

/// Apply `policy` to `surface`.
pub fn apply_threshold(surface: &ImageF32, policy: ThresholdPolicy) -> Thresholded {
    match policy {
        ThresholdPolicy::Fixed { cutoff } => {
            info!("ProbabilityVectorizer: fixed threshold {:.3}", cutoff);
            Thresholded {
                mask: binarize(surface, cutoff),
                threshold: cutoff,
            }
        }
        ThresholdPolicy::Adaptive { floor } => {
            let levels = quantize(surface);
            let otsu = otsu_level(&levels);
            let threshold = otsu as f32 / 255.0;
            if threshold < floor {
                warn!(
                    "ProbabilityVectorizer: Otsu threshold {:.3} below floor, using {:.3}",
                    threshold, floor
                );
                return Thresholded {
                    mask: binarize(surface, floor),
                    threshold: floor,
                };
            }
            info!("ProbabilityVectorizer: Otsu threshold {:.3}", threshold);
            let mut mask = MaskU8::new(surface.w, surface.h);
            for (dst, &q) in mask.data.iter_mut().zip(&levels) {
                *dst = u8::from(q > otsu);
            }
            Thresholded { mask, threshold }
        }
    }
}

/// `p > cutoff`, with NaN treated as background.
pub fn binarize(surface: &ImageF32, cutoff: f32) -> MaskU8 {
    let mut mask = MaskU8::new(surface.w, surface.h);
    for (dst, &p) in mask.data.iter_mut().zip(&surface.data) {
        *dst = u8::from(p > cutoff);
    }
    mask
}

/// Probability to 8-bit level, truncating like an integer cast.
fn quantize(surface: &ImageF32) -> Vec<u8> {
    surface
        .data
        .iter()
        .map(|&p| (p * 255.0).clamp(0.0, 255.0) as u8)
        .collect()
}

/// Histogram level maximising between-class variance; ties keep the lowest.
pub fn otsu_level(levels: &[u8]) -> u8 {
    if levels.is_empty() {
        return 0;
    }
    let mut hist = [0u64; 256];
    for &v in levels {
        hist[v as usize] += 1;
    }
    let scale = 1.0 / levels.len() as f64;
    let mu: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum::<f64>()
        * scale;

    let (mut q1, mut mu1) = (0.0f64, 0.0f64);
    let (mut best_sigma, mut best_level) = (0.0f64, 0u8);
    for (i, &h) in hist.iter().enumerate() {
        let p_i = h as f64 * scale;
        mu1 *= q1;
        q1 += p_i;
        let q2 = 1.0 - q1;
        if q1.min(q2) < f64::EPSILON || q1.max(q2) > 1.0 - f64::EPSILON {
            continue;
        }
        mu1 = (mu1 + i as f64 * p_i) / q1;
        let mu2 = (mu - q1 * mu1) / q2;
        let sigma = q1 * q2 * (mu1 - mu2) * (mu1 - mu2);
        if sigma > best_sigma {
            best_sigma = sigma;
            best_level = i as u8;
        }
    }
    best_level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let mut levels = vec![20u8; 500];
        levels.extend(std::iter::repeat(220u8).take(500));
        let t = otsu_level(&levels);
        assert!((20..220).contains(&t), "otsu level {t}");
    }

    #[test]
    fn adaptive_policy_respects_floor() {
        let mut surface = ImageF32::new(10, 10);
        for x in 0..10 {
            surface.set(x, 0, 0.2);
        }
        let out = apply_threshold(&surface, ThresholdPolicy::Adaptive { floor: 0.3 });
        assert_eq!(out.threshold, 0.3);
        assert_eq!(out.mask.count(), 0);
    }

    #[test]
    fn adaptive_policy_uses_otsu_above_floor() {
        let mut surface = ImageF32::filled(10, 10, 0.5);
        for y in 0..5 {
            for x in 0..10 {
                surface.set(x, y, 0.9);
            }
        }
        let out = apply_threshold(&surface, ThresholdPolicy::adaptive());
        assert!(out.threshold > 0.3 && out.threshold < 0.9);
        assert_eq!(out.mask.count(), 50);
    }

    #[test]
    fn fixed_threshold_is_strict() {
        let surface = ImageF32::filled(2, 2, 0.55);
        assert_eq!(binarize(&surface, 0.55).count(), 0);
        assert_eq!(binarize(&surface, 0.5).count(), 4);
    }
}
