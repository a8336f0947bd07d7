use super::aoi::AoiGeometry;
use super::tile::Tile;
use crate::error::{DetectionError, Result};
use crate::georef::GeoBounds;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Spherical approximation used to convert tile size to degrees.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Options controlling the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    /// Tile edge length in pixels.
    pub tile_size_px: usize,
    /// Ground resolution in metres per pixel.
    pub resolution_m: f64,
    /// Buffer added on each side of the AOI box, as a fraction of one tile.
    pub buffer_fraction: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            tile_size_px: 512,
            resolution_m: 10.0,
            buffer_fraction: 0.1,
        }
    }
}

impl GridOptions {
    pub fn new(tile_size_px: usize, resolution_m: f64) -> Self {
        Self {
            tile_size_px,
            resolution_m,
            ..Default::default()
        }
    }

    pub fn with_buffer_fraction(mut self, buffer_fraction: f64) -> Self {
        self.buffer_fraction = buffer_fraction;
        self
    }

    /// Tile edge length in kilometres.
    pub fn tile_size_km(&self) -> f64 {
        self.tile_size_px as f64 * self.resolution_m / 1000.0
    }
}

/// Planned tiles plus the geometry used to lay them out.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileGrid {
    pub tiles: Vec<Tile>,
    pub rows: usize,
    pub cols: usize,
    pub tile_deg_lon: f64,
    pub tile_deg_lat: f64,
    /// AOI box after buffering
    pub extent: GeoBounds,
}

/// Compute the regular tile grid covering `aoi_bounds` (geographic degrees).
///
/// Tiles are emitted row-major from the buffered south-west corner: `row`
/// increments per latitude step and `col` restarts at 0 on every row.
pub fn compute_tile_grid(aoi_bounds: &GeoBounds, options: &GridOptions) -> Result<TileGrid> {
    if aoi_bounds.is_degenerate() {
        return Err(DetectionError::InvalidGeometry(format!(
            "AOI bounding box is degenerate: {:?}",
            aoi_bounds
        )));
    }
    if options.tile_size_px == 0 || !(options.resolution_m > 0.0) {
        return Err(DetectionError::InvalidInput(format!(
            "tile size ({} px) and resolution ({} m) must be positive",
            options.tile_size_px, options.resolution_m
        )));
    }
    if !(options.buffer_fraction >= 0.0) {
        return Err(DetectionError::InvalidInput(format!(
            "buffer fraction must be non-negative, got {}",
            options.buffer_fraction
        )));
    }

    let (_, center_lat) = aoi_bounds.center();
    let cos_lat = center_lat.to_radians().cos();
    if cos_lat <= 1e-6 {
        return Err(DetectionError::InvalidGeometry(format!(
            "cannot tile an AOI centred at latitude {center_lat}"
        )));
    }

    let tile_km = options.tile_size_km();
    let tile_deg_lat = tile_km / KM_PER_DEGREE;
    let tile_deg_lon = tile_km / (KM_PER_DEGREE * cos_lat);

    let buffer_lat = tile_deg_lat * options.buffer_fraction;
    let buffer_lon = tile_deg_lon * options.buffer_fraction;
    let extent = GeoBounds::new(
        aoi_bounds.min_x - buffer_lon,
        aoi_bounds.min_y - buffer_lat,
        aoi_bounds.max_x + buffer_lon,
        aoi_bounds.max_y + buffer_lat,
    );

    // Positions are computed from the step index, not accumulated, so long
    // rows do not drift.
    let rows = steps_to_cover(extent.height(), tile_deg_lat);
    let cols = steps_to_cover(extent.width(), tile_deg_lon);
    debug!(
        "GridPlanner: tile {:.6}°×{:.6}° ({} km), buffered extent {:?}",
        tile_deg_lon, tile_deg_lat, tile_km, extent
    );

    let mut tiles = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let lat = extent.min_y + row as f64 * tile_deg_lat;
        for col in 0..cols {
            let lon = extent.min_x + col as f64 * tile_deg_lon;
            let cell = GeoBounds::new(lon, lat, lon + tile_deg_lon, lat + tile_deg_lat);
            let id = tiles.len();
            tiles.push(Tile {
                id,
                label: format!("tile_{}", id + 1),
                row,
                col,
                bounds: cell.ring(),
                center: [lon + tile_deg_lon / 2.0, lat + tile_deg_lat / 2.0],
                resolution_m: options.resolution_m,
                size_px: options.tile_size_px,
            });
        }
    }

    info!(
        "GridPlanner: {} tiles ({}×{} px at {} m, {} rows × {} cols)",
        tiles.len(),
        options.tile_size_px,
        options.tile_size_px,
        options.resolution_m,
        rows,
        cols
    );
    Ok(TileGrid {
        tiles,
        rows,
        cols,
        tile_deg_lon,
        tile_deg_lat,
        extent,
    })
}

/// Convenience wrapper taking the AOI geometry instead of its bounding box.
pub fn plan_tiles_for_aoi(aoi: &AoiGeometry, options: &GridOptions) -> Result<TileGrid> {
    compute_tile_grid(&aoi.bounds()?, options)
}

/// Number of `step`-sized moves from the start until the walk reaches `span`.
fn steps_to_cover(span: f64, step: f64) -> usize {
    let mut n = (span / step).ceil().max(1.0) as usize;
    while (n as f64) * step < span {
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_aoi() -> GeoBounds {
        GeoBounds::new(30.00, -2.00, 30.12, -1.93)
    }

    #[test]
    fn tiles_are_row_major_from_south_west() {
        let grid = compute_tile_grid(&small_aoi(), &GridOptions::default()).expect("grid");
        assert!(grid.rows >= 1 && grid.cols >= 1);
        assert_eq!(grid.tiles.len(), grid.rows * grid.cols);
        for (i, tile) in grid.tiles.iter().enumerate() {
            assert_eq!(tile.id, i);
            assert_eq!(tile.row, i / grid.cols);
            assert_eq!(tile.col, i % grid.cols);
            assert_eq!(tile.label, format!("tile_{}", i + 1));
            assert_eq!(tile.bounds[0], tile.bounds[4]);
        }
        let first = grid.tiles[0].extent();
        assert!(first.min_x < small_aoi().min_x && first.min_y < small_aoi().min_y);
    }

    #[test]
    fn every_tile_has_the_same_footprint() {
        let grid = compute_tile_grid(&small_aoi(), &GridOptions::default()).expect("grid");
        for tile in &grid.tiles {
            let e = tile.extent();
            assert!((e.width() - grid.tile_deg_lon).abs() < 1e-9);
            assert!((e.height() - grid.tile_deg_lat).abs() < 1e-9);
        }
    }

    #[test]
    fn longitude_step_widens_with_latitude() {
        let opts = GridOptions::default();
        let eq = compute_tile_grid(&GeoBounds::new(0.0, 0.0, 0.1, 0.1), &opts).expect("grid");
        let north = compute_tile_grid(&GeoBounds::new(0.0, 60.0, 0.1, 60.1), &opts).expect("grid");
        assert!((eq.tile_deg_lat - north.tile_deg_lat).abs() < 1e-12);
        assert!(north.tile_deg_lon > 1.9 * eq.tile_deg_lon);
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        let line = GeoBounds::new(1.0, 1.0, 1.0, 2.0);
        let err = compute_tile_grid(&line, &GridOptions::default()).unwrap_err();
        assert!(matches!(err, DetectionError::InvalidGeometry(_)));
    }

    #[test]
    fn steps_cover_span() {
        assert_eq!(steps_to_cover(1.0, 0.5), 2);
        assert_eq!(steps_to_cover(1.01, 0.5), 3);
        assert_eq!(steps_to_cover(0.1, 0.5), 1);
    }
}
