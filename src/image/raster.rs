//! Owned multi-band f32 raster in band-interleaved-by-pixel layout (H×W×C).
//!
//! Tile payloads, the mosaic and the extracted inference patches all use this
//! container. Band order is never reshuffled by the pipeline.
use super::f32::{min_max_finite, ImageF32};
use super::traits::{RasterView, RasterViewMut};
use crate::error::{DetectionError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct RasterF32 {
    pub w: usize,
    pub h: usize,
    /// Number of bands per pixel
    pub channels: usize,
    /// `h * w * channels` samples, pixel-interleaved
    pub data: Vec<f32>,
}

impl RasterF32 {
    pub fn new(w: usize, h: usize, channels: usize) -> Self {
        Self {
            w,
            h,
            channels,
            data: vec![0.0; w * h * channels],
        }
    }

    pub fn from_vec(w: usize, h: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        if channels == 0 {
            return Err(DetectionError::InvalidInput(
                "raster must have at least one band".to_string(),
            ));
        }
        if data.len() != w * h * channels {
            return Err(DetectionError::InvalidInput(format!(
                "raster buffer holds {} samples, expected {}x{}x{}",
                data.len(),
                h,
                w,
                channels
            )));
        }
        Ok(Self {
            w,
            h,
            channels,
            data,
        })
    }

    /// Build a raster by evaluating `f(x, y, band)` for every sample.
    pub fn from_fn(
        w: usize,
        h: usize,
        channels: usize,
        mut f: impl FnMut(usize, usize, usize) -> f32,
    ) -> Self {
        let mut out = Self::new(w, h, channels);
        for y in 0..h {
            for x in 0..w {
                for c in 0..channels {
                    let i = out.idx(x, y, c);
                    out.data[i] = f(x, y, c);
                }
            }
        }
        out
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, c: usize) -> usize {
        (y * self.w + x) * self.channels + c
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> f32 {
        self.data[self.idx(x, y, c)]
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let start = (y * self.w + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [f32] {
        let start = (y * self.w + x) * self.channels;
        &mut self.data[start..start + self.channels]
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Global `(min, max)` over every finite sample in every band.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        min_max_finite(&self.data)
    }

    /// Copy one band out as a single-channel image.
    /// A band index past the last band yields an all-zero image.
    pub fn band(&self, c: usize) -> ImageF32 {
        let mut out = ImageF32::new(self.w, self.h);
        if c >= self.channels {
            return out;
        }
        for (dst, px) in out.data.iter_mut().zip(self.data.chunks_exact(self.channels)) {
            *dst = px[c];
        }
        out
    }

    /// Copy the `size × size` window with top-left corner `(x0, y0)`.
    /// Samples outside the raster read as zero (bottom/right padding).
    pub fn window_zero_padded(&self, x0: usize, y0: usize, size: usize) -> RasterF32 {
        let mut out = RasterF32::new(size, size, self.channels);
        if x0 >= self.w || y0 >= self.h {
            return out;
        }
        let copy_w = size.min(self.w - x0);
        let copy_h = size.min(self.h - y0);
        let stride = self.channels;
        for dy in 0..copy_h {
            let src_start = ((y0 + dy) * self.w + x0) * stride;
            let dst_start = dy * size * stride;
            out.data[dst_start..dst_start + copy_w * stride]
                .copy_from_slice(&self.data[src_start..src_start + copy_w * stride]);
        }
        out
    }
}

impl RasterView for RasterF32 {
    type Sample = f32;

    fn width(&self) -> usize {
        self.w
    }

    fn height(&self) -> usize {
        self.h
    }

    fn bands(&self) -> usize {
        self.channels
    }

    fn samples(&self) -> &[f32] {
        &self.data
    }
}

impl RasterViewMut for RasterF32 {
    fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
