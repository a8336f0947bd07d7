mod common;

use common::synthetic::{geographic_reference, surface_with_rects, Rect};
use mine_detector::image::ImageF32;
use mine_detector::vectorize::{vectorize, ThresholdPolicy, VectorizeOptions, PERSISTENT_ID_LEN};

fn fixed(cutoff: f32) -> ThresholdPolicy {
    ThresholdPolicy::Fixed { cutoff }
}

#[test]
fn empty_surface_yields_empty_collection() {
    common::init_logger();
    let surface = ImageF32::new(120, 80);
    let georef = geographic_reference(30.0, -1.9, 0.0001);
    for policy in [fixed(0.0), fixed(0.55), ThresholdPolicy::adaptive()] {
        let opts = VectorizeOptions::default().with_threshold(policy);
        let out = vectorize(&surface, Some(&georef), &opts).expect("vectorize");
        let meta = &out.collection.metadata;
        assert!(out.collection.is_empty());
        assert_eq!(meta.block_count, 0);
        assert_eq!(meta.total_area_m2, 0.0);
        assert_eq!(meta.avg_confidence, 0.0);
        assert_eq!(meta.filtering_stats.total_detected, 0);
        assert_eq!(out.stage.mask_pixels, 0);
    }
}

#[test]
fn single_bright_square_becomes_one_block() {
    common::init_logger();
    let surface = surface_with_rects(200, 200, &[Rect::square(75, 75, 50, 0.9)]);
    let georef = geographic_reference(30.0, -1.9, 0.0001);
    let opts = VectorizeOptions::default()
        .with_threshold(fixed(0.5))
        .with_min_area_px(100.0);
    let out = vectorize(&surface, Some(&georef), &opts).expect("vectorize");

    assert_eq!(out.collection.blocks.len(), 1);
    let block = &out.collection.blocks[0];
    assert!(
        (2300..=2500).contains(&block.area_px),
        "area_px = {}",
        block.area_px
    );
    assert!((block.avg_confidence - 0.9).abs() < 1e-3);
    assert_eq!(block.block_index, 1);
    assert_eq!(block.block_id, "B1");
    assert_eq!(block.name, "Block 1");
    assert_eq!(block.persistent_id.len(), PERSISTENT_ID_LEN);
    assert_eq!(block.crs.as_deref(), Some("EPSG:4326"));

    // 0.0001° pixels ≈ 11.1 m on a side under the flat-Earth approximation.
    let area_m2 = block.area_m2.expect("area in m²");
    let expected = block.area_px as f64 * 0.0001 * 0.0001 * 111_000.0 * 111_000.0;
    assert!((area_m2 - expected).abs() / expected < 0.01);
    assert_eq!(out.collection.metadata.total_area_m2, area_m2);

    let [lon, lat] = block.centroid;
    assert!((lon - (30.0 + 100.0 * 0.0001)).abs() < 0.0002);
    assert!((lat - (-1.9 - 100.0 * 0.0001)).abs() < 0.0002);
}

#[test]
fn small_square_is_rejected_by_pixel_floor() {
    let surface = surface_with_rects(
        200,
        200,
        &[
            Rect {
                x0: 10,
                y0: 10,
                w: 5,
                h: 10,
                value: 0.9,
            },
            Rect {
                x0: 80,
                y0: 60,
                w: 40,
                h: 50,
                value: 0.8,
            },
        ],
    );
    let opts = VectorizeOptions::default()
        .with_threshold(fixed(0.5))
        .with_min_area_px(1000.0);
    let out = vectorize(&surface, None, &opts).expect("vectorize");
    let stats = &out.collection.metadata.filtering_stats;
    assert_eq!(stats.total_detected, 2);
    assert_eq!(stats.filtered_by_pixels, 1);
    assert_eq!(stats.filtered_by_area, 0);
    assert_eq!(stats.kept, 1);
    assert_eq!(out.collection.blocks.len(), 1);
    assert!((out.collection.blocks[0].avg_confidence - 0.8).abs() < 1e-3);
}

fn scattered_blobs() -> ImageF32 {
    surface_with_rects(
        240,
        180,
        &[
            Rect::square(10, 10, 20, 0.7),
            Rect::square(60, 20, 45, 0.95),
            Rect {
                x0: 150,
                y0: 100,
                w: 60,
                h: 30,
                value: 0.85,
            },
            Rect::square(20, 120, 35, 0.6),
        ],
    )
}

#[test]
fn vectorization_is_idempotent() {
    let surface = scattered_blobs();
    let georef = geographic_reference(12.5, 48.2, 0.00009);
    let opts = VectorizeOptions::default()
        .with_min_area_px(50.0)
        .with_tile_label("3")
        .with_analysis_id("a1b2c3d4e5f6");
    let first = vectorize(&surface, Some(&georef), &opts).expect("first run");
    let second = vectorize(&surface, Some(&georef), &opts).expect("second run");

    assert_eq!(first.collection, second.collection);
    let ids: Vec<_> = first.collection.blocks.iter().map(|b| &b.persistent_id).collect();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(first.collection.blocks[0].block_id, "a1b2c3d4-T3B1");
}

#[test]
fn blocks_are_numbered_by_descending_area() {
    let surface = scattered_blobs();
    let opts = VectorizeOptions::default()
        .with_threshold(fixed(0.5))
        .with_min_area_px(50.0);
    let out = vectorize(&surface, None, &opts).expect("vectorize");
    let blocks = &out.collection.blocks;
    assert_eq!(blocks.len(), 4);
    for (i, pair) in blocks.windows(2).enumerate() {
        assert!(pair[0].area_px >= pair[1].area_px, "blocks {i} and {}", i + 1);
    }
    for (i, b) in blocks.iter().enumerate() {
        assert_eq!(b.block_index, i + 1);
    }
    // 60×30 and 45×45 blobs: the square is larger.
    assert!((blocks[0].avg_confidence - 0.95).abs() < 1e-3);
}

#[test]
fn polygons_map_back_inside_the_mosaic() {
    let surface = surface_with_rects(
        150,
        100,
        &[Rect::square(0, 0, 30, 0.9), Rect::square(110, 60, 40, 0.9)],
    );
    let georef = geographic_reference(-60.1, -3.2, 0.0002);
    let inverse = georef.transform.inverse().expect("invertible");
    let opts = VectorizeOptions::default().with_min_area_px(100.0);
    let out = vectorize(&surface, Some(&georef), &opts).expect("vectorize");
    assert_eq!(out.collection.blocks.len(), 2);
    for block in &out.collection.blocks {
        for c in block.polygon.exterior().coords() {
            let (col, row) = inverse.apply(c.x, c.y);
            assert!(col > -1e-6 && col < 150.0 + 1e-6, "col {col}");
            assert!(row > -1e-6 && row < 100.0 + 1e-6, "row {row}");
        }
    }
}

#[test]
fn components_inside_holes_are_not_reported() {
    let mut rects = Vec::new();
    // 60×60 frame, 8 px thick, with a 12×12 island in the middle.
    rects.push(Rect {
        x0: 20,
        y0: 20,
        w: 60,
        h: 8,
        value: 0.9,
    });
    rects.push(Rect {
        x0: 20,
        y0: 72,
        w: 60,
        h: 8,
        value: 0.9,
    });
    rects.push(Rect {
        x0: 20,
        y0: 20,
        w: 8,
        h: 60,
        value: 0.9,
    });
    rects.push(Rect {
        x0: 72,
        y0: 20,
        w: 8,
        h: 60,
        value: 0.9,
    });
    rects.push(Rect::square(44, 44, 12, 0.9));
    let surface = surface_with_rects(100, 100, &rects);
    let opts = VectorizeOptions::default().with_min_area_px(10.0);
    let out = vectorize(&surface, None, &opts).expect("vectorize");
    assert_eq!(out.collection.metadata.filtering_stats.total_detected, 1);
    let block = &out.collection.blocks[0];
    assert!(block.polygon.interiors().is_empty());
    // The frame is filled solid; the island sits inside the outline.
    assert!(block.area_px > 3000);
}

#[test]
fn adaptive_threshold_splits_bimodal_surface() {
    let mut surface = surface_with_rects(100, 100, &[Rect::square(30, 30, 40, 0.9)]);
    for v in surface.data.iter_mut().filter(|v| **v == 0.0) {
        *v = 0.4;
    }
    let opts = VectorizeOptions::default()
        .with_threshold(ThresholdPolicy::adaptive())
        .with_min_area_px(100.0);
    let out = vectorize(&surface, None, &opts).expect("vectorize");
    let meta = &out.collection.metadata;
    assert!(meta.threshold_used > 0.3 && meta.threshold_used < 0.9);
    assert!(meta.processing_params.adaptive_threshold);
    assert_eq!(meta.block_count, 1);
}

#[test]
fn geojson_carries_required_properties() {
    let surface = surface_with_rects(120, 120, &[Rect::square(30, 30, 40, 0.9)]);
    let georef = geographic_reference(30.0, -1.9, 0.0001);
    let opts = VectorizeOptions::default().with_min_area_px(100.0);
    let out = vectorize(&surface, Some(&georef), &opts).expect("vectorize");
    let json = serde_json::to_value(&out.collection).expect("serialize");

    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["metadata"]["block_count"], 1);
    assert_eq!(json["visualization"]["fill_color"], "#FFD700");
    let feature = &json["features"][0];
    assert_eq!(feature["type"], "Feature");
    assert_eq!(feature["geometry"]["type"], "Polygon");
    let ring = feature["geometry"]["coordinates"][0]
        .as_array()
        .expect("exterior ring");
    assert_eq!(ring.first(), ring.last());
    let props = &feature["properties"];
    for key in [
        "block_id",
        "block_index",
        "area_px",
        "avg_confidence",
        "bbox",
        "persistent_id",
        "area_m2",
        "crs",
        "label_position",
        "pixel_coords",
    ] {
        assert!(!props[key].is_null(), "missing property {key}");
    }
}
