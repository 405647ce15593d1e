//! Overpass API client for administrative boundary geometry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::BoundaryError;
use crate::models::{OsmType, RegionDescriptor};

pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Overpass JSON response (`[out:json]`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub osm_type: OsmType,
    pub id: i64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Only present on relations
    #[serde(default)]
    pub members: Vec<OverpassMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassMember {
    #[serde(rename = "type")]
    pub osm_type: OsmType,
    #[serde(rename = "ref")]
    pub id: i64,
    #[serde(default)]
    pub role: String,
    /// Way geometry from `out geom`
    #[serde(default)]
    pub geometry: Vec<LatLon>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Anything that can answer an Overpass QL query.
#[async_trait]
pub trait BoundarySource: Send + Sync {
    async fn query(&self, query: &str) -> Result<OverpassResponse, BoundaryError>;
}

/// Build the boundary query for a region: the named relation at the
/// region's admin level, restricted to the state's area.
pub fn boundary_query(region: &RegionDescriptor, timeout_secs: u64) -> String {
    format!(
        r#"[out:json][timeout:{timeout}];
area["name"="{state}"]["boundary"="administrative"]["admin_level"="4"]->.state;
relation["name"="{name}"]["boundary"="administrative"]["admin_level"="{level}"](area.state);
out geom;"#,
        timeout = timeout_secs,
        state = escape(&region.state),
        name = escape(&region.name),
        level = region.admin_level(),
    )
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// HTTP client for an Overpass interpreter endpoint
pub struct OverpassClient {
    client: Client,
    endpoint: Url,
}

impl OverpassClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, BoundaryError> {
        let endpoint = Url::parse(endpoint).map_err(|e| BoundaryError::Config(e.to_string()))?;
        let client = Client::builder()
            .user_agent(concat!("canopy/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl BoundarySource for OverpassClient {
    async fn query(&self, query: &str) -> Result<OverpassResponse, BoundaryError> {
        let url = Url::parse_with_params(self.endpoint.as_str(), &[("data", query)])
            .map_err(|e| BoundaryError::Config(e.to_string()))?;

        debug!("Overpass query: {}", query);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BoundaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionKind;

    #[test]
    fn test_query_uses_admin_level_and_state() {
        let region = RegionDescriptor::new("Orange County", RegionKind::County, "California");
        let q = boundary_query(&region, 90);

        assert!(q.starts_with("[out:json][timeout:90];"));
        assert!(q.contains(r#"area["name"="California"]"#));
        assert!(q.contains(r#"relation["name"="Orange County"]"#));
        assert!(q.contains(r#"["admin_level"="6"](area.state)"#));
        assert!(q.ends_with("out geom;"));
    }

    #[test]
    fn test_query_escapes_quotes() {
        let region = RegionDescriptor::new(r#"Odd "Name""#, RegionKind::City, "Texas");
        let q = boundary_query(&region, 25);
        assert!(q.contains(r#"relation["name"="Odd \"Name\""]"#));
        assert!(q.contains(r#"["admin_level"="8"]"#));
    }

    #[test]
    fn test_parse_relation_with_members() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {
                    "type": "relation",
                    "id": 396466,
                    "tags": {"name": "Orange County", "admin_level": "6"},
                    "members": [
                        {"type": "node", "ref": 1, "role": "admin_centre", "lat": 33.7, "lon": -117.8},
                        {"type": "way", "ref": 2, "role": "outer",
                         "geometry": [{"lat": 33.0, "lon": -118.0}, {"lat": 33.5, "lon": -117.5}]}
                    ]
                }
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.elements.len(), 1);

        let relation = &response.elements[0];
        assert_eq!(relation.osm_type, OsmType::Relation);
        assert_eq!(relation.members.len(), 2);
        assert_eq!(relation.members[0].osm_type, OsmType::Node);
        assert!(relation.members[0].geometry.is_empty());
        assert_eq!(relation.members[1].geometry.len(), 2);
        assert_eq!(relation.members[1].role, "outer");
    }

    #[test]
    fn test_parse_empty_response() {
        let response: OverpassResponse = serde_json::from_str(r#"{"elements": []}"#).unwrap();
        assert!(response.elements.is_empty());

        let response: OverpassResponse = serde_json::from_str("{}").unwrap();
        assert!(response.elements.is_empty());
    }
}
