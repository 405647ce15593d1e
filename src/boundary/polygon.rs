//! Region boundary geometry.

use geo::{BoundingRect, Centroid, Contains, MultiPolygon, Point, Polygon, Rect};
use serde::Serialize;

use crate::models::GeoPoint;

/// Resolved boundary of a region.
///
/// Most cities and counties are a single outer ring. Regions with exclaves
/// or enclaves (islands, holes for independent cities) need the multi form.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryPolygon {
    /// One closed outer ring, no holes
    SimpleRing(Polygon<f64>),
    /// Several outer rings and/or rings with holes
    MultiRing(MultiPolygon<f64>),
}

/// Serializable tag for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    SimpleRing,
    MultiRing,
}

impl BoundaryPolygon {
    /// Pick the variant for a list of assembled polygons.
    pub fn from_polygons(mut polygons: Vec<Polygon<f64>>) -> Option<Self> {
        match polygons.len() {
            0 => None,
            1 if polygons[0].interiors().is_empty() => {
                Some(BoundaryPolygon::SimpleRing(polygons.remove(0)))
            }
            _ => Some(BoundaryPolygon::MultiRing(MultiPolygon::new(polygons))),
        }
    }

    pub fn kind(&self) -> BoundaryKind {
        match self {
            BoundaryPolygon::SimpleRing(_) => BoundaryKind::SimpleRing,
            BoundaryPolygon::MultiRing(_) => BoundaryKind::MultiRing,
        }
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            BoundaryPolygon::SimpleRing(p) => p.bounding_rect(),
            BoundaryPolygon::MultiRing(mp) => mp.bounding_rect(),
        }
    }

    /// Strict containment: points on the border are outside.
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        match self {
            BoundaryPolygon::SimpleRing(p) => p.contains(point),
            BoundaryPolygon::MultiRing(mp) => mp.contains(point),
        }
    }

    pub fn contains_geo(&self, point: GeoPoint) -> bool {
        self.contains_point(&Point::from(point))
    }

    pub fn centroid(&self) -> Option<Point<f64>> {
        match self {
            BoundaryPolygon::SimpleRing(p) => p.centroid(),
            BoundaryPolygon::MultiRing(mp) => mp.centroid(),
        }
    }

    /// Number of outer rings
    pub fn ring_count(&self) -> usize {
        match self {
            BoundaryPolygon::SimpleRing(_) => 1,
            BoundaryPolygon::MultiRing(mp) => mp.0.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::new(vec![
                Coord { x: x0, y: y0 },
                Coord { x: x0 + size, y: y0 },
                Coord {
                    x: x0 + size,
                    y: y0 + size,
                },
                Coord { x: x0, y: y0 + size },
                Coord { x: x0, y: y0 },
            ]),
            vec![],
        )
    }

    #[test]
    fn test_variant_selection() {
        assert!(BoundaryPolygon::from_polygons(vec![]).is_none());

        let simple = BoundaryPolygon::from_polygons(vec![square(0.0, 0.0, 1.0)]).unwrap();
        assert_eq!(simple.kind(), BoundaryKind::SimpleRing);

        let multi =
            BoundaryPolygon::from_polygons(vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)])
                .unwrap();
        assert_eq!(multi.kind(), BoundaryKind::MultiRing);
        assert_eq!(multi.ring_count(), 2);
    }

    #[test]
    fn test_holed_single_polygon_is_multi() {
        let (exterior, _) = square(0.0, 0.0, 10.0).into_inner();
        let (hole, _) = square(4.0, 4.0, 2.0).into_inner();
        let holed = Polygon::new(exterior, vec![hole]);

        let boundary = BoundaryPolygon::from_polygons(vec![holed]).unwrap();
        assert_eq!(boundary.kind(), BoundaryKind::MultiRing);
        assert!(!boundary.contains_point(&Point::new(5.0, 5.0)));
        assert!(boundary.contains_point(&Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_contains_and_bbox() {
        let boundary = BoundaryPolygon::SimpleRing(square(-81.1, 33.9, 0.2));
        assert!(boundary.contains_geo(GeoPoint::new(34.0, -81.0)));
        assert!(!boundary.contains_geo(GeoPoint::new(35.0, -81.0)));

        let rect = boundary.bounding_rect().unwrap();
        assert!((rect.min().x - -81.1).abs() < 1e-9);
        assert!((rect.max().y - 34.1).abs() < 1e-9);
    }
}
