//! Deterministic block identifiers.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Length of a persistent identifier in hex characters.
pub const PERSISTENT_ID_LEN: usize = 12;

const GLOBAL_SCOPE: &str = "global";

/// Canonical hash payload; fields are declared in sorted key order.
#[derive(Serialize)]
struct Signature<'a> {
    bounds: [f64; 4],
    centroid: [f64; 2],
    tile: &'a str,
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// First 12 hex characters of SHA-256 over the tile scope, the centroid and
/// the bounding box, both rounded to six decimals.
pub fn persistent_id(tile_label: Option<&str>, centroid: [f64; 2], bbox: [f64; 4]) -> String {
    let signature = Signature {
        bounds: bbox.map(round6),
        centroid: centroid.map(round6),
        tile: tile_label.unwrap_or(GLOBAL_SCOPE),
    };
    // Serializing plain floats and a string cannot fail.
    let payload = serde_json::to_string(&signature).unwrap_or_default();
    let digest = Sha256::digest(payload.as_bytes());
    let mut hex = String::with_capacity(PERSISTENT_ID_LEN);
    for byte in digest.iter().take(PERSISTENT_ID_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// `T{tile}B{index}` with a tile label, `B{index}` without.
pub fn block_code(tile_label: Option<&str>, index: usize) -> String {
    match tile_label {
        Some(tile) => format!("T{tile}B{index}"),
        None => format!("B{index}"),
    }
}

/// Display name: the block code for tiled runs, `Block {index}` otherwise.
pub fn block_name(tile_label: Option<&str>, index: usize) -> String {
    match tile_label {
        Some(_) => block_code(tile_label, index),
        None => format!("Block {index}"),
    }
}

/// Block code prefixed with the first eight characters of the analysis id.
pub fn block_id(analysis_id: Option<&str>, code: &str) -> String {
    match analysis_id {
        Some(id) => {
            let prefix: String = id.chars().take(8).collect();
            format!("{prefix}-{code}")
        }
        None => code.to_string(),
    }
}
