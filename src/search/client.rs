//! Nearby-search client for the Places API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::SearchError;
use crate::models::{GeoPoint, PlaceResult};

pub const DEFAULT_NEARBY_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// One nearby-search call
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub location: GeoPoint,
    pub radius_meters: u32,
    pub keyword: String,
    /// Continuation token from the previous page
    pub page_token: Option<String>,
}

/// One page of nearby-search results
#[derive(Debug, Clone, Default)]
pub struct NearbyPage {
    pub results: Vec<PlaceResult>,
    pub next_page_token: Option<String>,
}

/// A provider that answers radius-bounded keyword searches.
#[async_trait]
pub trait NearbySearch: Send + Sync {
    async fn nearby(&self, request: &NearbyRequest) -> Result<NearbyPage, SearchError>;
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: Option<String>,
    /// Nearby search usually only returns the short `vicinity` form
    #[serde(default)]
    vicinity: Option<String>,
    geometry: NearbyGeometry,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyGeometry {
    location: NearbyLocation,
}

#[derive(Debug, Deserialize)]
struct NearbyLocation {
    lat: f64,
    lng: f64,
}

impl From<NearbyResult> for PlaceResult {
    fn from(r: NearbyResult) -> Self {
        PlaceResult {
            external_id: r.place_id,
            display_name: r.name,
            formatted_address: r.formatted_address.or(r.vicinity).unwrap_or_default(),
            location: GeoPoint {
                lat: r.geometry.location.lat,
                lon: r.geometry.location.lng,
            },
            category_tags: r.types,
        }
    }
}

/// Parse a nearby-search body into a page.
///
/// `OK` and `ZERO_RESULTS` succeed; every other status is a provider error.
fn parse_page(body: &str) -> Result<NearbyPage, SearchError> {
    let response: NearbyResponse = serde_json::from_str(body)?;

    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(NearbyPage {
            results: response.results.into_iter().map(PlaceResult::from).collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        }),
        _ => Err(SearchError::Provider {
            status: response.status,
            message: response
                .error_message
                .unwrap_or_else(|| "no error message".to_string()),
        }),
    }
}

/// HTTP client for the legacy Places nearby-search endpoint
pub struct PlacesClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl PlacesClient {
    pub fn new(endpoint: &str, api_key: String, timeout: Duration) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| SearchError::Config(e.to_string()))?;
        let client = Client::builder()
            .user_agent(concat!("canopy/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    fn request_url(&self, request: &NearbyRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair(
                    "location",
                    &format!("{},{}", request.location.lat, request.location.lon),
                )
                .append_pair("radius", &request.radius_meters.to_string())
                .append_pair("keyword", &request.keyword)
                .append_pair("key", &self.api_key);
            if let Some(token) = &request.page_token {
                pairs.append_pair("pagetoken", token);
            }
        }
        url
    }
}

#[async_trait]
impl NearbySearch for PlacesClient {
    async fn nearby(&self, request: &NearbyRequest) -> Result<NearbyPage, SearchError> {
        debug!(
            "Nearby search at ({}, {}) radius {} page_token={}",
            request.location.lat,
            request.location.lon,
            request.radius_meters,
            request.page_token.is_some()
        );

        let response = self.client.get(self.request_url(request)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_page(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_page() {
        let body = r#"{
            "status": "OK",
            "next_page_token": "tok-2",
            "results": [{
                "place_id": "ChIJ1",
                "name": "Iron Gym",
                "vicinity": "123 Main St, Columbia",
                "geometry": {"location": {"lat": 34.0, "lng": -81.0}},
                "types": ["gym", "health"]
            }]
        }"#;

        let page = parse_page(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("tok-2"));
        assert_eq!(page.results.len(), 1);

        let place = &page.results[0];
        assert_eq!(place.external_id, "ChIJ1");
        assert_eq!(place.formatted_address, "123 Main St, Columbia");
        assert_eq!(place.location, GeoPoint::new(34.0, -81.0));
        assert_eq!(place.category_tags, vec!["gym", "health"]);
    }

    #[test]
    fn test_formatted_address_preferred_over_vicinity() {
        let body = r#"{"status": "OK", "results": [{
            "place_id": "x", "name": "n",
            "formatted_address": "1 A St, B, SC 29000, USA",
            "vicinity": "1 A St, B",
            "geometry": {"location": {"lat": 1.0, "lng": 2.0}}
        }]}"#;
        let page = parse_page(body).unwrap();
        assert_eq!(page.results[0].formatted_address, "1 A St, B, SC 29000, USA");
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_zero_results_is_empty_page() {
        let page = parse_page(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(page.results.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_provider_status_is_error() {
        let err = parse_page(
            r#"{"status": "OVER_QUERY_LIMIT", "error_message": "quota", "results": []}"#,
        )
        .unwrap_err();
        match err {
            SearchError::Provider { status, message } => {
                assert_eq!(status, "OVER_QUERY_LIMIT");
                assert_eq!(message, "quota");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_url_parameters() {
        let client = PlacesClient::new(
            DEFAULT_NEARBY_ENDPOINT,
            "secret".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        let url = client.request_url(&NearbyRequest {
            location: GeoPoint::new(34.5, -81.25),
            radius_meters: 20_000,
            keyword: "self storage".to_string(),
            page_token: Some("tok".to_string()),
        });

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("location".into(), "34.5,-81.25".into())));
        assert!(pairs.contains(&("radius".into(), "20000".into())));
        assert!(pairs.contains(&("keyword".into(), "self storage".into())));
        assert!(pairs.contains(&("key".into(), "secret".into())));
        assert!(pairs.contains(&("pagetoken".into(), "tok".into())));
    }
}
