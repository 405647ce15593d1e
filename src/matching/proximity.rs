//! Coordinate proximity lookups against the secondary source.

use geo::{Distance, Haversine, Point};
use rstar::{RTree, AABB};
use serde::{Deserialize, Serialize};

use crate::models::GeoPoint;

/// Metres per degree of latitude, rounded down so envelopes stay generous
const MIN_METERS_PER_DEGREE: f64 = 110_000.0;

/// Distance rule for the proximity fallback.
///
/// `PlanarDegrees` treats lat/lon as a flat plane, so its east-west reach
/// shrinks with latitude (0.001 is about 111 m north-south everywhere, but
/// only about 79 m east-west at 45°).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum ProximityMetric {
    PlanarDegrees {
        #[serde(default = "default_threshold_degrees")]
        threshold_degrees: f64,
    },
    Haversine {
        #[serde(default = "default_threshold_meters")]
        threshold_meters: f64,
    },
}

fn default_threshold_degrees() -> f64 {
    0.001
}

fn default_threshold_meters() -> f64 {
    100.0
}

impl Default for ProximityMetric {
    fn default() -> Self {
        ProximityMetric::PlanarDegrees {
            threshold_degrees: default_threshold_degrees(),
        }
    }
}

impl ProximityMetric {
    pub fn threshold(&self) -> f64 {
        match *self {
            ProximityMetric::PlanarDegrees { threshold_degrees } => threshold_degrees,
            ProximityMetric::Haversine { threshold_meters } => threshold_meters,
        }
    }

    /// Distance between two points in the metric's own unit
    pub fn distance(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        match self {
            ProximityMetric::PlanarDegrees { .. } => {
                let d_lat = a.lat - b.lat;
                let d_lon = a.lon - b.lon;
                (d_lat * d_lat + d_lon * d_lon).sqrt()
            }
            ProximityMetric::Haversine { .. } => {
                Haversine.distance(Point::from(a), Point::from(b))
            }
        }
    }

    /// Search box around a point that holds every point within threshold.
    fn envelope(&self, p: GeoPoint) -> AABB<[f64; 2]> {
        let (d_lon, d_lat) = match *self {
            ProximityMetric::PlanarDegrees { threshold_degrees } => {
                (threshold_degrees, threshold_degrees)
            }
            ProximityMetric::Haversine { threshold_meters } => {
                let d_lat = threshold_meters / MIN_METERS_PER_DEGREE;
                let cos_lat = p.lat.to_radians().cos().abs().max(0.01);
                (d_lat / cos_lat, d_lat)
            }
        };
        AABB::from_corners([p.lon - d_lon, p.lat - d_lat], [p.lon + d_lon, p.lat + d_lat])
    }
}

/// R-tree over secondary coordinates
pub struct ProximityIndex {
    tree: RTree<[f64; 2]>,
    metric: ProximityMetric,
}

impl ProximityIndex {
    pub fn build(points: impl IntoIterator<Item = GeoPoint>, metric: ProximityMetric) -> Self {
        let coords: Vec<[f64; 2]> = points.into_iter().map(|p| [p.lon, p.lat]).collect();
        Self {
            tree: RTree::bulk_load(coords),
            metric,
        }
    }

    /// Closest indexed distance to `point`, if any lies within the threshold
    pub fn nearest_within(&self, point: GeoPoint) -> Option<f64> {
        let threshold = self.metric.threshold();
        let envelope = self.metric.envelope(point);

        // Envelope intersection gives candidates, exact distance decides
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|c| self.metric.distance(point, GeoPoint::new(c[1], c[0])))
            .filter(|d| *d <= threshold)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn is_match(&self, point: GeoPoint) -> bool {
        self.nearest_within(point).is_some()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
