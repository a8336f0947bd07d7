use serde::{Deserialize, Serialize};

/// CRS assumed when a tile arrives without one.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Flat-Earth length of one degree, used for degree² → m² conversion.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

const GEOGRAPHIC_CODES: &[&str] = &["EPSG:4326", "EPSG:4269", "OGC:CRS84", "CRS84"];

/// Whether CRS units are degrees or metres.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrsKind {
    Geographic,
    Projected,
}

impl CrsKind {
    pub fn classify(crs: &str) -> Self {
        let norm = crs.trim().to_ascii_uppercase();
        if GEOGRAPHIC_CODES.iter().any(|code| norm.ends_with(code)) {
            CrsKind::Geographic
        } else {
            CrsKind::Projected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_codes() {
        assert_eq!(CrsKind::classify("EPSG:4326"), CrsKind::Geographic);
        assert_eq!(CrsKind::classify("epsg:4326"), CrsKind::Geographic);
        assert_eq!(CrsKind::classify("urn:ogc:def:crs:OGC:CRS84"), CrsKind::Geographic);
        assert_eq!(CrsKind::classify("EPSG:32633"), CrsKind::Projected);
    }
}
