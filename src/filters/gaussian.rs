use super::SeparableFilter;
use crate::image::{ImageF32, RasterView, RasterViewMut};

/// Kernel radius in standard deviations.
const TRUNCATE: f32 = 4.0;

/// Sampled, normalised Gaussian with radius `round(4σ)`.
#[derive(Clone, Debug)]
pub struct GaussianFilter {
    sigma: f32,
    taps: Vec<f32>,
}

impl GaussianFilter {
    pub fn new(sigma: f32) -> Self {
        if !(sigma > 0.0) || !sigma.is_finite() {
            return Self {
                sigma: 0.0,
                taps: vec![1.0],
            };
        }
        let radius = (TRUNCATE * sigma + 0.5) as i32;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / denom).exp())
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { sigma, taps }
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    pub fn apply(&self, image: &ImageF32) -> ImageF32 {
        apply_separable_reflect(self, image)
    }
}

impl SeparableFilter for GaussianFilter {
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Horizontal then vertical pass with reflective borders.
pub fn apply_separable_reflect(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    if taps.len() <= 1 || src.w == 0 || src.h == 0 {
        let gain = taps.first().copied().unwrap_or(1.0);
        let mut out = src.clone();
        out.data.iter_mut().for_each(|v| *v *= gain);
        return out;
    }
    let radius = (taps.len() / 2) as isize;

    let mut horiz = ImageF32::new(src.w, src.h);
    for (src_row, dst_row) in src.rows().zip(horiz.rows_mut()) {
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let sx = reflect_index(x as isize + k as isize - radius, src.w);
                acc += tap * src_row[sx];
            }
            *dst_px = acc;
        }
    }

    let mut out = ImageF32::new(src.w, src.h);
    for y in 0..src.h {
        for (k, &tap) in taps.iter().enumerate() {
            let sy = reflect_index(y as isize + k as isize - radius, src.h);
            let src_row = horiz.row(sy);
            let dst_row = out.row_mut(y);
            for (dst_px, &v) in dst_row.iter_mut().zip(src_row) {
                *dst_px += tap * v;
            }
        }
    }
    out
}

/// Half-sample symmetric reflection of `idx` into `[0, len)`.
fn reflect_index(idx: isize, len: usize) -> usize {
    let len = len as isize;
    if len == 1 {
        return 0;
    }
    let period = 2 * len;
    let mut i = idx.rem_euclid(period);
    if i >= len {
        i = period - 1 - i;
    }
    i as usize
}
