//! Assembly of independently fetched tiles into one aligned mosaic.
//!
//! Each tile is an independent raster source with its own transform and CRS.
//! The output grid uses the first usable tile's pixel size and CRS and spans
//! the union of all tile extents. Where footprints overlap, the tile that
//! appears first in the input keeps its pixels (first-wins, no averaging).
//! Cross-CRS inputs must be reprojected by the caller.

mod assembler;
mod raster;

pub use assembler::{assemble, Mosaic, MosaicOutput};
pub use raster::TileRaster;
