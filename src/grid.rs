//! Probe grid generation over a region boundary.

use geo::{Distance, Haversine, Point};
use tracing::{debug, warn};

use crate::boundary::BoundaryPolygon;
use crate::models::GeoPoint;

/// Upper bound on grid candidates tested against the boundary
pub const MAX_GRID_CELLS: f64 = 250_000.0;

/// Cover a boundary with probe points spaced `radius_meters` apart.
///
/// Points are generated over the boundary's bounding box, centred so the
/// leftover margin is split evenly, and kept only when strictly inside the
/// boundary. When nothing survives the mask the single probe is the
/// boundary centroid.
pub fn tile(boundary: &BoundaryPolygon, radius_meters: f64) -> Vec<GeoPoint> {
    let points = grid_points(boundary, radius_meters);
    if !points.is_empty() {
        debug!("Tiled boundary into {} probe points", points.len());
        return points;
    }

    match boundary.centroid() {
        Some(center) => {
            debug!("Boundary smaller than one grid cell, probing centroid only");
            vec![GeoPoint::from(center)]
        }
        None => {
            warn!("Boundary has no centroid, no probe points generated");
            Vec::new()
        }
    }
}

fn grid_points(boundary: &BoundaryPolygon, radius_meters: f64) -> Vec<GeoPoint> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        warn!("Non-positive probe radius {}, skipping grid", radius_meters);
        return Vec::new();
    }

    let Some(rect) = boundary.bounding_rect() else {
        return Vec::new();
    };

    let (west, south) = (rect.min().x, rect.min().y);
    let (east, north) = (rect.max().x, rect.max().y);
    let width = east - west;
    let height = north - south;

    let span_x = Haversine.distance(Point::new(west, south), Point::new(east, south));
    let span_y = Haversine.distance(Point::new(west, south), Point::new(west, north));
    if span_x <= 0.0 || span_y <= 0.0 {
        return Vec::new();
    }

    let mut cell_width = radius_meters / span_x * width;
    let mut cell_height = radius_meters / span_y * height;

    // Coarsen tiny cells over large regions; the request budget only
    // applies after the grid exists
    let grid_size = |cw: f64, ch: f64| ((width / cw).floor() + 1.0) * ((height / ch).floor() + 1.0);
    let candidates = grid_size(cell_width, cell_height);
    if candidates > MAX_GRID_CELLS {
        let scale = (candidates / MAX_GRID_CELLS).sqrt();
        cell_width *= scale;
        cell_height *= scale;
        while grid_size(cell_width, cell_height) > MAX_GRID_CELLS {
            cell_width *= 1.01;
            cell_height *= 1.01;
        }
        warn!(
            "Probe radius {} m would need ~{:.0} grid cells, widening spacing by {:.1}x",
            radius_meters,
            candidates,
            cell_width * span_x / width / radius_meters
        );
    }

    let columns = (width / cell_width).floor();
    let rows = (height / cell_height).floor();
    let delta_x = (width - columns * cell_width) / 2.0;
    let delta_y = (height - rows * cell_height) / 2.0;

    let mut points = Vec::new();
    let mut x = west + delta_x;
    while x <= east {
        let mut y = south + delta_y;
        while y <= north {
            let candidate = Point::new(x, y);
            if boundary.contains_point(&candidate) {
                points.push(GeoPoint::from(candidate));
            }
            y += cell_height;
        }
        x += cell_width;
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Centroid, Coord, LineString, Polygon};

    fn polygon(coords: &[(f64, f64)]) -> Polygon<f64> {
        Polygon::new(
            LineString::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect()),
            vec![],
        )
    }

    #[test]
    fn test_small_square_single_centroid_probe() {
        let square = polygon(&[
            (-81.0, 34.0),
            (-80.99, 34.0),
            (-80.99, 34.01),
            (-81.0, 34.01),
            (-81.0, 34.0),
        ]);
        let center = square.centroid().unwrap();
        let boundary = BoundaryPolygon::SimpleRing(square);

        let probes = tile(&boundary, 20_000.0);
        assert_eq!(probes.len(), 1);
        assert!((probes[0].lon - center.x()).abs() < 1e-9);
        assert!((probes[0].lat - center.y()).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_fallback_when_grid_misses() {
        // The bbox centre lies on the hypotenuse, which is not strictly inside.
        let triangle = polygon(&[(0.0, 0.0), (0.01, 0.0), (0.0, 0.01), (0.0, 0.0)]);
        let center = triangle.centroid().unwrap();
        let boundary = BoundaryPolygon::SimpleRing(triangle);

        let probes = tile(&boundary, 20_000.0);
        assert_eq!(probes.len(), 1);
        assert!((probes[0].lon - center.x()).abs() < 1e-9);
        assert!((probes[0].lat - center.y()).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_radius_grid_is_capped() {
        let square = polygon(&[(-82.0, 34.0), (-81.0, 34.0), (-81.0, 35.0), (-82.0, 35.0), (-82.0, 34.0)]);
        let boundary = BoundaryPolygon::SimpleRing(square);

        let probes = tile(&boundary, 1.0);
        assert!(probes.len() > 1);
        assert!(probes.len() as f64 <= MAX_GRID_CELLS);
    }

    #[test]
    fn test_large_region_grid_inside_boundary() {
        // Roughly 111 km x 92 km at this latitude
        let square = polygon(&[(-82.0, 34.0), (-81.0, 34.0), (-81.0, 35.0), (-82.0, 35.0), (-82.0, 34.0)]);
        let boundary = BoundaryPolygon::SimpleRing(square);

        let probes = tile(&boundary, 20_000.0);

        // 4 whole cells across (~92 km), 5 along (~111 km), inclusive edges
        assert_eq!(probes.len(), 5 * 6);
        for p in &probes {
            assert!(boundary.contains_geo(*p));
        }
    }

    #[test]
    fn test_grid_order_is_column_major() {
        let square = polygon(&[(-82.0, 34.0), (-81.0, 34.0), (-81.0, 35.0), (-82.0, 35.0), (-82.0, 34.0)]);
        let boundary = BoundaryPolygon::SimpleRing(square);

        let probes = tile(&boundary, 20_000.0);
        assert!(probes[0].lon <= probes[1].lon);
        assert!(probes[0].lat < probes[1].lat);
        assert!(probes.first().unwrap().lon < probes.last().unwrap().lon);

        let again = tile(&boundary, 20_000.0);
        assert_eq!(probes, again);
    }

    #[test]
    fn test_zero_radius_falls_back() {
        let square = polygon(&[(-82.0, 34.0), (-81.0, 34.0), (-81.0, 35.0), (-82.0, 35.0), (-82.0, 34.0)]);
        let boundary = BoundaryPolygon::SimpleRing(square);
        assert_eq!(tile(&boundary, 0.0).len(), 1);
    }
}
