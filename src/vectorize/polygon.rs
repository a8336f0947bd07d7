//! Repair of traced boundaries into valid polygons.
//!
//! A pixel-traced outer boundary can touch itself at pinch points where a
//! one-pixel bridge is walked twice. Splitting the ring wherever a vertex
//! repeats yields simple loops; the largest becomes the block outline and the
//! rest are either discarded or, when holes are kept, attached as interiors.

use crate::error::{DetectionError, Result};
use crate::georef::AffineTransform;
use geo::{Area, Contains, Coord, LineString, Polygon};
use std::collections::HashMap;

/// Outcome of repairing one boundary.
#[derive(Clone, Debug)]
pub struct RepairedPolygon {
    pub polygon: Polygon<f64>,
    /// Positive-area loops that were not kept
    pub discarded_fragments: usize,
}

/// Split a cyclic pixel ring into loops at repeated vertices.
///
/// Loops with fewer than three vertices are dropped.
pub fn split_loops(ring: &[[i32; 2]]) -> Vec<Vec<[i32; 2]>> {
    let mut points: Vec<[i32; 2]> = Vec::with_capacity(ring.len() + 1);
    for &p in ring {
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    points.push(first);

    let mut loops = Vec::new();
    let mut path: Vec<[i32; 2]> = Vec::with_capacity(points.len());
    let mut seen: HashMap<[i32; 2], usize> = HashMap::new();
    for p in points {
        if let Some(&k) = seen.get(&p) {
            let tail = path.split_off(k + 1);
            for q in &tail {
                seen.remove(q);
            }
            if tail.len() >= 2 {
                let mut lp = Vec::with_capacity(tail.len() + 1);
                lp.push(p);
                lp.extend(tail);
                loops.push(lp);
            }
        } else {
            seen.insert(p, path.len());
            path.push(p);
        }
    }
    loops
}

fn to_polygon(points: &[[i32; 2]], transform: &AffineTransform) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = points
        .iter()
        .map(|&[x, y]| {
            let (gx, gy) = transform.apply(x as f64, y as f64);
            Coord { x: gx, y: gy }
        })
        .collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Map `ring` through `transform` and repair it into one simple polygon.
///
/// Returns `Ok(None)` for rings with fewer than three distinct vertices.
pub fn repair_ring(
    ring: &[[i32; 2]],
    transform: &AffineTransform,
    keep_holes: bool,
) -> Result<Option<RepairedPolygon>> {
    let mut distinct: Vec<[i32; 2]> = ring.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 3 {
        return Ok(None);
    }

    let mut pieces: Vec<(Polygon<f64>, f64)> = split_loops(ring)
        .iter()
        .map(|lp| {
            let poly = to_polygon(lp, transform);
            let signed = poly.signed_area();
            (poly, signed)
        })
        .collect();
    if pieces
        .iter()
        .any(|(p, _)| p.exterior().coords().any(|c| !c.x.is_finite() || !c.y.is_finite()))
    {
        return Err(DetectionError::GeometryRepair {
            reason: "transform produced non-finite coordinates".into(),
        });
    }
    pieces.retain(|(_, signed)| *signed != 0.0);
    let Some(best) = pieces
        .iter()
        .enumerate()
        .max_by(|a, b| a.1 .1.abs().total_cmp(&b.1 .1.abs()))
        .map(|(i, _)| i)
    else {
        return Err(DetectionError::GeometryRepair {
            reason: "no simple loop with positive area".into(),
        });
    };

    let (outer, outer_signed) = pieces.swap_remove(best);
    let mut interiors = Vec::new();
    let mut discarded = 0usize;
    for (piece, signed) in pieces {
        let is_hole = signed.signum() != outer_signed.signum() && outer.contains(&piece);
        if keep_holes && is_hole {
            interiors.push(piece.exterior().clone());
        } else {
            discarded += 1;
        }
    }
    let polygon = Polygon::new(outer.exterior().clone(), interiors);
    Ok(Some(RepairedPolygon {
        polygon,
        discarded_fragments: discarded,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_ring_stays_whole() {
        let ring = [[0, 0], [4, 0], [4, 4], [0, 4]];
        let out = repair_ring(&ring, &AffineTransform::identity(), false)
            .expect("repair")
            .expect("polygon");
        assert_eq!(out.polygon.unsigned_area(), 16.0);
        assert_eq!(out.discarded_fragments, 0);
    }

    #[test]
    fn pinched_ring_keeps_largest_loop() {
        // Two squares sharing the vertex (2, 2).
        let ring = [
            [0, 0],
            [2, 0],
            [2, 2],
            [5, 2],
            [5, 5],
            [2, 5],
            [2, 2],
            [0, 2],
        ];
        let loops = split_loops(&ring);
        assert_eq!(loops.len(), 2);
        let out = repair_ring(&ring, &AffineTransform::identity(), false)
            .expect("repair")
            .expect("polygon");
        assert_eq!(out.polygon.unsigned_area(), 9.0);
        assert_eq!(out.discarded_fragments, 1);
    }

    #[test]
    fn spur_is_dropped() {
        let ring = [[0, 0], [3, 0], [4, 0], [3, 0], [3, 3], [0, 3]];
        let out = repair_ring(&ring, &AffineTransform::identity(), false)
            .expect("repair")
            .expect("polygon");
        assert_eq!(out.polygon.unsigned_area(), 9.0);
    }

    #[test]
    fn collinear_ring_fails_repair() {
        let ring = [[0, 0], [1, 1], [2, 2], [1, 1]];
        assert!(matches!(
            repair_ring(&ring, &AffineTransform::identity(), false),
            Err(DetectionError::GeometryRepair { .. })
        ));
        assert!(repair_ring(&[[0, 0], [1, 0]], &AffineTransform::identity(), false)
            .expect("degenerate")
            .is_none());
    }

    #[test]
    fn geographic_transform_maps_vertices() {
        let t = AffineTransform::new(0.5, 0.0, 10.0, 0.0, -0.5, 20.0);
        let ring = [[0, 0], [2, 0], [2, 2], [0, 2]];
        let out = repair_ring(&ring, &t, false).expect("repair").expect("polygon");
        assert_eq!(out.polygon.unsigned_area(), 1.0);
        let first = out.polygon.exterior().0[0];
        assert_eq!((first.x, first.y), (10.0, 20.0));
    }
}
