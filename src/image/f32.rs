//! Owned single-channel f32 image in row-major layout.
//!
//! Used for weight masks, score patches, accumulation canvases and the final
//! probability surface.
use super::traits::{RasterView, RasterViewMut};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order (`w * h` samples)
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h],
        }
    }

    /// Wrap an existing buffer, returning `None` when the length does not match.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Copy of the top-left `w × h` window.
    pub fn crop(&self, w: usize, h: usize) -> ImageF32 {
        let w = w.min(self.w);
        let h = h.min(self.h);
        let mut out = ImageF32::new(w, h);
        for y in 0..h {
            out.row_mut(y).copy_from_slice(&self.row(y)[..w]);
        }
        out
    }

    /// `(min, max)` over finite samples, `None` for an empty image.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        min_max_finite(&self.data)
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }
}

pub(crate) fn min_max_finite(data: &[f32]) -> Option<(f32, f32)> {
    data.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

impl RasterView for ImageF32 {
    type Sample = f32;

    fn width(&self) -> usize {
        self.w
    }

    fn height(&self) -> usize {
        self.h
    }

    fn samples(&self) -> &[f32] {
        &self.data
    }
}

impl RasterViewMut for ImageF32 {
    fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
