use mine_detector::georef::{AffineTransform, GeoBounds, GeoReference};
use mine_detector::image::{ImageF32, RasterF32};
use mine_detector::mosaic::TileRaster;

/// Axis-aligned rectangle painted into a probability surface.
#[derive(Clone, Copy, Debug)]
pub struct Rect {
    pub x0: usize,
    pub y0: usize,
    pub w: usize,
    pub h: usize,
    pub value: f32,
}

impl Rect {
    pub fn square(x0: usize, y0: usize, side: usize, value: f32) -> Self {
        Self {
            x0,
            y0,
            w: side,
            h: side,
            value,
        }
    }
}

/// Zero surface of `w × h` with `rects` painted in order.
pub fn surface_with_rects(w: usize, h: usize, rects: &[Rect]) -> ImageF32 {
    let mut img = ImageF32::new(w, h);
    for r in rects {
        for y in r.y0..(r.y0 + r.h).min(h) {
            for x in r.x0..(r.x0 + r.w).min(w) {
                img.set(x, y, r.value);
            }
        }
    }
    img
}

/// North-up geographic reference with square pixels of `pixel_deg` degrees.
pub fn geographic_reference(west: f64, north: f64, pixel_deg: f64) -> GeoReference {
    GeoReference::new(
        AffineTransform::new(pixel_deg, 0.0, west, 0.0, -pixel_deg, north),
        "EPSG:4326",
    )
}

/// Deterministic multi-band texture in a reflectance-like range.
pub fn textured_raster(w: usize, h: usize, bands: usize) -> RasterF32 {
    RasterF32::from_fn(w, h, bands, |x, y, c| {
        500.0 + ((x * 31 + y * 17 + c * 7) % 97) as f32 * 10.0
    })
}

/// Raster whose every band equals `background`, with `bright` inside the
/// rectangle `[x0, x0 + side) × [y0, y0 + side)`.
pub fn raster_with_bright_square(
    w: usize,
    h: usize,
    bands: usize,
    square: (usize, usize, usize),
    background: f32,
    bright: f32,
) -> RasterF32 {
    let (x0, y0, side) = square;
    RasterF32::from_fn(w, h, bands, |x, y, _| {
        if x >= x0 && x < x0 + side && y >= y0 && y < y0 + side {
            bright
        } else {
            background
        }
    })
}

/// Cut `raster` into a `cols × rows` grid of georeferenced tiles, each
/// `tile_px` pixels square, with the north-west corner at `(west, north)`.
pub fn split_into_tiles(
    raster: &RasterF32,
    tile_px: usize,
    west: f64,
    north: f64,
    pixel_deg: f64,
) -> Vec<TileRaster> {
    let cols = raster.w / tile_px;
    let rows = raster.h / tile_px;
    let mut tiles = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let data = RasterF32::from_fn(tile_px, tile_px, raster.channels, |x, y, c| {
                raster.get(col * tile_px + x, row * tile_px + y, c)
            });
            let tile_west = west + (col * tile_px) as f64 * pixel_deg;
            let tile_north = north - (row * tile_px) as f64 * pixel_deg;
            let bounds = GeoBounds::new(
                tile_west,
                tile_north - tile_px as f64 * pixel_deg,
                tile_west + tile_px as f64 * pixel_deg,
                tile_north,
            );
            tiles.push(
                TileRaster::new(format!("tile_{}", row * cols + col + 1), data)
                    .with_bounds(bounds)
                    .with_crs("EPSG:4326"),
            );
        }
    }
    tiles
}
