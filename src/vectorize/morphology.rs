//! Binary opening with an elliptical structuring element.

use crate::image::{MaskU8, RasterView};

/// Structuring element as offsets `(dx, dy)` relative to its anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuringElement {
    offsets: Vec<(isize, isize)>,
}

impl StructuringElement {
    /// Ellipse inscribed in a `size × size` box, anchored at `(size/2, size/2)`.
    pub fn ellipse(size: usize) -> Self {
        let size = size.max(1);
        let r = (size / 2) as isize;
        let mut offsets = Vec::new();
        for i in 0..size as isize {
            let dy = i - r;
            let half = if r > 0 {
                (r as f64 * (((r * r - dy * dy) as f64) / (r * r) as f64).sqrt()).round() as isize
            } else {
                0
            };
            let (j1, j2) = ((r - half).max(0), (r + half + 1).min(size as isize));
            for j in j1..j2 {
                offsets.push((j - r, dy));
            }
        }
        Self { offsets }
    }

    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }
}

/// Keep a pixel only if every element offset lands on foreground.
/// Offsets outside the image are ignored.
pub fn erode(mask: &MaskU8, se: &StructuringElement) -> MaskU8 {
    let mut out = MaskU8::new(mask.w, mask.h);
    for y in 0..mask.h {
        for x in 0..mask.w {
            let keep = se.offsets().iter().all(|&(dx, dy)| {
                let (sx, sy) = (x as isize + dx, y as isize + dy);
                !mask.in_bounds(sx, sy) || mask.get_signed(sx, sy)
            });
            out.set(x, y, keep);
        }
    }
    out
}

/// Stamp the element at every foreground pixel (Minkowski sum).
pub fn dilate(mask: &MaskU8, se: &StructuringElement) -> MaskU8 {
    let mut out = MaskU8::new(mask.w, mask.h);
    for y in 0..mask.h {
        for x in 0..mask.w {
            if !mask.get(x, y) {
                continue;
            }
            for &(dx, dy) in se.offsets() {
                let (tx, ty) = (x as isize + dx, y as isize + dy);
                if mask.in_bounds(tx, ty) {
                    out.set(tx as usize, ty as usize, true);
                }
            }
        }
    }
    out
}

/// Erosion followed by dilation. Never adds foreground.
pub fn open(mask: &MaskU8, kernel: usize) -> MaskU8 {
    if kernel <= 1 {
        return mask.clone();
    }
    let se = StructuringElement::ellipse(kernel);
    dilate(&erode(mask, &se), &se)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(w: usize, h: usize, x0: usize, y0: usize, side: usize) -> MaskU8 {
        let mut m = MaskU8::new(w, h);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                m.set(x, y, true);
            }
        }
        m
    }

    #[test]
    fn ellipse_shapes() {
        let two = StructuringElement::ellipse(2);
        assert_eq!(two.offsets(), &[(0, -1), (-1, 0), (0, 0)]);
        let three = StructuringElement::ellipse(3);
        assert_eq!(three.offsets().len(), 5);
        let five = StructuringElement::ellipse(5);
        assert!(five.offsets().contains(&(0, -2)));
        assert!(!five.offsets().contains(&(-2, -2)));
    }

    #[test]
    fn opening_removes_isolated_pixels() {
        let mut m = square(20, 20, 5, 5, 8);
        m.set(1, 1, true);
        m.set(18, 3, true);
        let out = open(&m, 2);
        assert!(!out.get(1, 1));
        assert!(!out.get(18, 3));
        assert!(out.get(10, 10));
    }

    #[test]
    fn opening_is_anti_extensive_and_keeps_squares() {
        let m = square(30, 30, 4, 6, 10);
        let out = open(&m, 2);
        for (a, b) in m.data.iter().zip(&out.data) {
            assert!(*b <= *a);
        }
        assert!(out.count() >= 99);
        let out3 = open(&m, 3);
        assert!(out3.count() >= 96);
    }
}
