//! External boundary extraction from a binary mask.
//!
//! Foreground is grouped into 8-connected components. Only components
//! reachable from the image border through 4-connected background are
//! reported; anything nested inside another component's hole is dropped.
//! Each boundary is traced through pixel centres with Moore-neighbour
//! tracing, every boundary pixel kept (no polyline compression).

use crate::image::{ImageF32, MaskU8};
use std::collections::VecDeque;

/// Neighbour offsets, clockwise on screen starting east.
const DIRS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

/// Pixels enclosed by an outer boundary, holes included.
#[derive(Clone, Debug)]
pub struct FilledRegion {
    pub x0: usize,
    pub y0: usize,
    pub w: usize,
    pub h: usize,
    inside: Vec<bool>,
}

impl FilledRegion {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0
            && y >= self.y0
            && x < self.x0 + self.w
            && y < self.y0 + self.h
            && self.inside[(y - self.y0) * self.w + (x - self.x0)]
    }

    pub fn pixel_count(&self) -> usize {
        self.inside.iter().filter(|&&v| v).count()
    }

    /// Mean of `image` over the region.
    pub fn mean_of(&self, image: &ImageF32) -> f64 {
        let mut sum = 0.0f64;
        let mut n = 0usize;
        for ly in 0..self.h {
            for lx in 0..self.w {
                if self.inside[ly * self.w + lx] {
                    sum += image.get(self.x0 + lx, self.y0 + ly) as f64;
                    n += 1;
                }
            }
        }
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }
}

/// One outer boundary.
#[derive(Clone, Debug)]
pub struct Contour {
    /// Boundary pixels `[x, y]` in tracing order, not closed
    pub points: Vec<[i32; 2]>,
    pub region: FilledRegion,
}

impl Contour {
    /// Shoelace area of the polygon through the boundary pixel centres.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0i64;
        for i in 0..n {
            let [x0, y0] = self.points[i];
            let [x1, y1] = self.points[(i + 1) % n];
            twice += x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64;
        }
        (twice as f64 / 2.0).abs()
    }
}

struct Component {
    label: u32,
    start: (usize, usize),
    min: (usize, usize),
    max: (usize, usize),
}

/// Trace the outer boundary of every outermost component of `mask`.
/// Contours are returned in raster order of their first pixel.
pub fn external_contours(mask: &MaskU8) -> Vec<Contour> {
    let (w, h) = (mask.w, mask.h);
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let (labels, components) = label_components(mask);
    let outside = outer_background(mask);

    let mut external = vec![false; components.len() + 1];
    for y in 0..h {
        for x in 0..w {
            let label = labels[y * w + x];
            if label == 0 || external[label as usize] {
                continue;
            }
            let on_border = x == 0 || y == 0 || x + 1 == w || y + 1 == h;
            let touches_outside = on_border
                || outside[y * w + x - 1]
                || outside[y * w + x + 1]
                || outside[(y - 1) * w + x]
                || outside[(y + 1) * w + x];
            if touches_outside {
                external[label as usize] = true;
            }
        }
    }

    components
        .iter()
        .filter(|c| external[c.label as usize])
        .map(|c| Contour {
            points: trace_boundary(&labels, w, h, c),
            region: fill_component(&labels, w, c),
        })
        .collect()
}

/// 8-connected labelling; components are numbered in raster order from 1.
fn label_components(mask: &MaskU8) -> (Vec<u32>, Vec<Component>) {
    let (w, h) = (mask.w, mask.h);
    let mut labels = vec![0u32; w * h];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();
    for y in 0..h {
        for x in 0..w {
            if !mask.get(x, y) || labels[y * w + x] != 0 {
                continue;
            }
            let label = components.len() as u32 + 1;
            let mut comp = Component {
                label,
                start: (x, y),
                min: (x, y),
                max: (x, y),
            };
            labels[y * w + x] = label;
            queue.push_back((x, y));
            while let Some((cx, cy)) = queue.pop_front() {
                comp.min = (comp.min.0.min(cx), comp.min.1.min(cy));
                comp.max = (comp.max.0.max(cx), comp.max.1.max(cy));
                for &(dx, dy) in &DIRS {
                    let (nx, ny) = (cx as isize + dx, cy as isize + dy);
                    if !mask.get_signed(nx, ny) {
                        continue;
                    }
                    let i = ny as usize * w + nx as usize;
                    if labels[i] == 0 {
                        labels[i] = label;
                        queue.push_back((nx as usize, ny as usize));
                    }
                }
            }
            components.push(comp);
        }
    }
    (labels, components)
}

/// Background reachable from the border through 4-connected background.
fn outer_background(mask: &MaskU8) -> Vec<bool> {
    let (w, h) = (mask.w, mask.h);
    let mut outside = vec![false; w * h];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let seed = |x: usize, y: usize, outside: &mut [bool], queue: &mut VecDeque<(usize, usize)>| {
        if !mask.get(x, y) && !outside[y * w + x] {
            outside[y * w + x] = true;
            queue.push_back((x, y));
        }
    };
    for x in 0..w {
        seed(x, 0, &mut outside, &mut queue);
        seed(x, h - 1, &mut outside, &mut queue);
    }
    for y in 0..h {
        seed(0, y, &mut outside, &mut queue);
        seed(w - 1, y, &mut outside, &mut queue);
    }
    while let Some((x, y)) = queue.pop_front() {
        for &(dx, dy) in DIRS.iter().step_by(2) {
            let (nx, ny) = (x as isize + dx, y as isize + dy);
            if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let i = ny * w + nx;
            if !outside[i] && !mask.get(nx, ny) {
                outside[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    outside
}

/// Moore-neighbour tracing with Jacob's stopping criterion.
fn trace_boundary(labels: &[u32], w: usize, h: usize, comp: &Component) -> Vec<[i32; 2]> {
    let is_fg = |x: isize, y: isize| {
        x >= 0
            && y >= 0
            && (x as usize) < w
            && (y as usize) < h
            && labels[y as usize * w + x as usize] == comp.label
    };
    let next_dir = |x: isize, y: isize, back: usize| {
        (1..=8)
            .map(|k| (back + k) % 8)
            .find(|&d| is_fg(x + DIRS[d].0, y + DIRS[d].1))
    };

    let start = (comp.start.0 as isize, comp.start.1 as isize);
    let mut points = vec![[start.0 as i32, start.1 as i32]];
    // The first pixel in raster order has background to the west.
    let Some(first) = next_dir(start.0, start.1, WEST) else {
        return points;
    };
    let (mut cur, mut dir) = (start, first);
    loop {
        cur = (cur.0 + DIRS[dir].0, cur.1 + DIRS[dir].1);
        let back = if dir % 2 == 0 { (dir + 6) % 8 } else { (dir + 5) % 8 };
        let Some(next) = next_dir(cur.0, cur.1, back) else {
            break;
        };
        if cur == start && next == first {
            break;
        }
        points.push([cur.0 as i32, cur.1 as i32]);
        dir = next;
    }
    points
}

/// Component pixels plus every hole they enclose, within the bounding box.
fn fill_component(labels: &[u32], w: usize, comp: &Component) -> FilledRegion {
    let (x0, y0) = comp.min;
    let bw = comp.max.0 - x0 + 1;
    let bh = comp.max.1 - y0 + 1;
    let is_comp = |lx: usize, ly: usize| labels[(y0 + ly) * w + x0 + lx] == comp.label;

    let mut reached = vec![false; bw * bh];
    let mut queue = VecDeque::new();
    for ly in 0..bh {
        for lx in 0..bw {
            let border = lx == 0 || ly == 0 || lx + 1 == bw || ly + 1 == bh;
            if border && !is_comp(lx, ly) {
                reached[ly * bw + lx] = true;
                queue.push_back((lx, ly));
            }
        }
    }
    while let Some((lx, ly)) = queue.pop_front() {
        for &(dx, dy) in DIRS.iter().step_by(2) {
            let (nx, ny) = (lx as isize + dx, ly as isize + dy);
            if nx < 0 || ny < 0 || nx as usize >= bw || ny as usize >= bh {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let i = ny * bw + nx;
            if !reached[i] && !is_comp(nx, ny) {
                reached[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    FilledRegion {
        x0,
        y0,
        w: bw,
        h: bh,
        inside: reached.into_iter().map(|r| !r).collect(),
    }
}
