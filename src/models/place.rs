//! Place results returned by the nearby-search provider.

use geo::Point;
use serde::{Deserialize, Serialize};

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Node => write!(f, "node"),
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        GeoPoint {
            lat: p.y(),
            lon: p.x(),
        }
    }
}

/// A single result from one nearby-search page.
///
/// The same place routinely comes back from several neighbouring probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    /// Provider place identifier, stable across probes
    pub external_id: String,

    pub display_name: String,

    pub formatted_address: String,

    pub location: GeoPoint,

    /// Provider type tags (e.g. ["gym", "health", "point_of_interest"])
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_tags: Vec<String>,
}

impl PlaceResult {
    /// Fill empty fields from another result for the same place.
    pub fn fill_gaps_from(&mut self, other: &PlaceResult) {
        if self.display_name.trim().is_empty() {
            self.display_name = other.display_name.clone();
        }
        if self.formatted_address.trim().is_empty() {
            self.formatted_address = other.formatted_address.clone();
        }
        for tag in &other.category_tags {
            if !self.category_tags.contains(tag) {
                self.category_tags.push(tag.clone());
            }
        }
    }

    /// Street part of the formatted address (text before the first comma)
    pub fn street(&self) -> &str {
        self.formatted_address
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
    }
}

/// A place that has been de-duplicated by `external_id` and confirmed
/// inside the region boundary.
///
/// Only [`crate::pip::BoundaryFilter`] hands these out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UniquePlace(PlaceResult);

impl UniquePlace {
    pub(crate) fn confirmed(place: PlaceResult) -> Self {
        Self(place)
    }

    pub(crate) fn place_mut(&mut self) -> &mut PlaceResult {
        &mut self.0
    }

    pub fn into_inner(self) -> PlaceResult {
        self.0
    }
}

impl std::ops::Deref for UniquePlace {
    type Target = PlaceResult;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, name: &str, address: &str) -> PlaceResult {
        PlaceResult {
            external_id: id.to_string(),
            display_name: name.to_string(),
            formatted_address: address.to_string(),
            location: GeoPoint::new(34.0, -81.0),
            category_tags: vec!["gym".to_string()],
        }
    }

    #[test]
    fn test_street_prefix() {
        let p = place("a", "Iron Gym", "123 Main St, Columbia, SC 29201, USA");
        assert_eq!(p.street(), "123 Main St");

        let no_comma = place("b", "Iron Gym", "123 Main St");
        assert_eq!(no_comma.street(), "123 Main St");
    }

    #[test]
    fn test_fill_gaps_keeps_existing_values() {
        let mut first = place("a", "", "123 Main St");
        let mut later = place("a", "Iron Gym", "999 Other Rd");
        later.category_tags.push("health".to_string());

        first.fill_gaps_from(&later);

        assert_eq!(first.display_name, "Iron Gym");
        assert_eq!(first.formatted_address, "123 Main St");
        assert_eq!(first.category_tags, vec!["gym", "health"]);
    }

    #[test]
    fn test_point_conversion_axis_order() {
        let p: Point<f64> = GeoPoint::new(34.5, -81.25).into();
        assert_eq!(p.x(), -81.25);
        assert_eq!(p.y(), 34.5);
        assert_eq!(GeoPoint::from(p), GeoPoint::new(34.5, -81.25));
    }
}
