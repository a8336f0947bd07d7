use crate::georef::{GeoBounds, Ring};
use serde::Serialize;

/// One square cell of the planning grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// 0-based position in emission order
    pub id: usize,
    /// Human-facing name, `tile_{id + 1}`
    pub label: String,
    pub row: usize,
    pub col: usize,
    /// Closed 5-point ring in `(lon, lat)` order, counter-clockwise from south-west
    pub bounds: Ring,
    pub center: [f64; 2],
    pub resolution_m: f64,
    pub size_px: usize,
}

impl Tile {
    pub fn extent(&self) -> GeoBounds {
        GeoBounds::new(
            self.bounds[0][0],
            self.bounds[0][1],
            self.bounds[2][0],
            self.bounds[2][1],
        )
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.extent().contains(lon, lat)
    }
}
