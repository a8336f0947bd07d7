//! Regular tile grid covering an area of interest.
//!
//! Tile edge length in degrees comes from a spherical approximation
//! (1° latitude ≈ 111 km, longitude scaled by `cos(centre latitude)`). The AOI
//! bounding box is expanded by a fraction of one tile on every side and walked
//! south→north, west→east. Every tile has the same footprint; no tile is
//! clipped or dropped, even when it falls outside the AOI polygon itself.

mod aoi;
mod planner;
mod tile;

pub use aoi::AoiGeometry;
pub use planner::{compute_tile_grid, plan_tiles_for_aoi, GridOptions, TileGrid, KM_PER_DEGREE};
pub use tile::Tile;
