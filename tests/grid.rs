mod common;

use geo::{LineString, MultiPolygon, Polygon};
use mine_detector::grid::{plan_tiles_for_aoi, AoiGeometry, GridOptions, TileGrid};
use mine_detector::DetectionError;

fn covered(grid: &TileGrid, lon: f64, lat: f64) -> bool {
    grid.tiles.iter().any(|t| t.contains(lon, lat))
}

fn square(west: f64, south: f64, size: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (west, south),
            (west + size, south),
            (west + size, south + size),
            (west, south + size),
            (west, south),
        ]),
        vec![],
    )
}

#[test]
fn grid_covers_every_aoi_point() {
    common::init_logger();
    let aoi = AoiGeometry::from_ring(&[
        [-60.20, -3.30],
        [-59.95, -3.28],
        [-59.90, -3.05],
        [-60.15, -3.02],
        [-60.20, -3.30],
    ]);
    let grid = plan_tiles_for_aoi(&aoi, &GridOptions::new(256, 10.0)).expect("grid");
    let b = aoi.bounds().expect("bounds");
    for i in 0..=20 {
        for j in 0..=20 {
            let lon = b.min_x + b.width() * i as f64 / 20.0;
            let lat = b.min_y + b.height() * j as f64 / 20.0;
            assert!(covered(&grid, lon, lat), "({lon}, {lat}) not covered");
        }
    }
    assert_eq!(grid.tiles.len(), grid.rows * grid.cols);
}

#[test]
fn tile_edge_follows_size_and_resolution() {
    let aoi = AoiGeometry::from(square(10.0, 0.0, 0.2));
    let grid = plan_tiles_for_aoi(&aoi, &GridOptions::new(512, 10.0)).expect("grid");
    // 5.12 km per tile; at the equator both axes are ≈ 0.0461°.
    assert!((grid.tile_deg_lat - 5.12 / 111.0).abs() < 1e-9);
    assert!((grid.tile_deg_lon - grid.tile_deg_lat).abs() < 1e-5);
    for tile in &grid.tiles {
        assert_eq!(tile.size_px, 512);
        assert_eq!(tile.resolution_m, 10.0);
    }
}

#[test]
fn multipolygon_aoi_spans_all_parts() {
    let aoi = AoiGeometry::from(MultiPolygon::new(vec![
        square(20.0, 45.0, 0.02),
        square(20.3, 45.2, 0.02),
    ]));
    let grid = plan_tiles_for_aoi(&aoi, &GridOptions::default()).expect("grid");
    assert!(covered(&grid, 20.01, 45.01));
    assert!(covered(&grid, 20.31, 45.21));
    // Tiles between the parts are kept.
    assert!(covered(&grid, 20.15, 45.1));
}

#[test]
fn degenerate_aoi_is_rejected() {
    let line = AoiGeometry::from_ring(&[[1.0, 2.0], [1.5, 2.0], [1.0, 2.0]]);
    assert!(matches!(
        plan_tiles_for_aoi(&line, &GridOptions::default()),
        Err(DetectionError::InvalidGeometry(_))
    ));
    let empty = AoiGeometry::from_ring(&[]);
    assert!(matches!(
        plan_tiles_for_aoi(&empty, &GridOptions::default()),
        Err(DetectionError::InvalidGeometry(_))
    ));
}

#[test]
fn zero_tile_size_is_invalid_input() {
    let aoi = AoiGeometry::from(square(0.0, 0.0, 0.1));
    assert!(matches!(
        plan_tiles_for_aoi(&aoi, &GridOptions::new(0, 10.0)),
        Err(DetectionError::InvalidInput(_))
    ));
}
