//! Owned binary mask (0 / 1 bytes) produced by thresholding.
use super::traits::RasterView;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskU8 {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl MaskU8 {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x] != 0
    }

    /// Out-of-bounds coordinates read as background.
    #[inline]
    pub fn get_signed(&self, x: isize, y: isize) -> bool {
        self.in_bounds(x, y) && self.get(x as usize, y as usize)
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        let i = y * self.w + x;
        self.data[i] = on as u8;
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }
}

impl RasterView for MaskU8 {
    type Sample = u8;

    fn width(&self) -> usize {
        self.w
    }

    fn height(&self) -> usize {
        self.h
    }

    fn samples(&self) -> &[u8] {
        &self.data
    }
}
