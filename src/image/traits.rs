//! Row access shared by the owned raster containers.
//!
//! Every container stores `height` rows of `width · bands` samples back to
//! back; the default methods slice rows out of that flat buffer.

use std::slice::{Chunks, ChunksMut};

pub trait RasterView {
    type Sample: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn bands(&self) -> usize {
        1
    }

    /// The whole row-major buffer.
    fn samples(&self) -> &[Self::Sample];

    #[inline]
    fn row_len(&self) -> usize {
        self.width() * self.bands()
    }

    #[inline]
    fn row(&self, y: usize) -> &[Self::Sample] {
        let n = self.row_len();
        &self.samples()[y * n..(y + 1) * n]
    }

    /// Rows from north to south. Yields nothing for a zero-width raster.
    fn rows(&self) -> Chunks<'_, Self::Sample> {
        let n = self.row_len().max(1);
        let len = if self.row_len() == 0 { 0 } else { self.samples().len() };
        self.samples()[..len].chunks(n)
    }

    #[inline]
    fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }
}

pub trait RasterViewMut: RasterView {
    fn samples_mut(&mut self) -> &mut [Self::Sample];

    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [Self::Sample] {
        let n = self.row_len();
        &mut self.samples_mut()[y * n..(y + 1) * n]
    }

    fn rows_mut(&mut self) -> ChunksMut<'_, Self::Sample> {
        let n = self.row_len().max(1);
        let len = if self.row_len() == 0 { 0 } else { self.samples_mut().len() };
        self.samples_mut()[..len].chunks_mut(n)
    }
}
