//! Structured property records and match verdicts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::place::{GeoPoint, PlaceResult};

/// A record from the structured property dataset.
///
/// Only the address fields and the optional location take part in matching;
/// every other source column rides along in `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub street: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub zip: String,

    /// Pre-formatted mailing address when the source supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailing_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl PropertyRecord {
    /// "street, city, state zip" with empty parts left out
    pub fn composed_address(&self) -> String {
        let state_zip = join_non_empty(&[self.state.as_str(), self.zip.as_str()], " ");
        join_non_empty(
            &[self.street.as_str(), self.city.as_str(), state_zip.as_str()],
            ", ",
        )
    }

    /// Full mailing address, falling back to the composed address
    pub fn full_address(&self) -> String {
        match &self.mailing_address {
            Some(addr) if !addr.trim().is_empty() => addr.clone(),
            _ => self.composed_address(),
        }
    }

    /// Build a record from a provider place by splitting its formatted
    /// address ("123 Main St, Columbia, SC 29201, USA").
    pub fn from_place(place: &PlaceResult) -> Self {
        let parts: Vec<&str> = place
            .formatted_address
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let street = parts.first().copied().unwrap_or_default().to_string();
        let city = parts.get(1).copied().unwrap_or_default().to_string();

        let (state, zip) = match parts.get(2) {
            Some(state_zip) => {
                let mut tokens = state_zip.split_whitespace();
                let state = tokens.next().unwrap_or_default().to_string();
                let zip = tokens.collect::<Vec<_>>().join(" ");
                (state, zip)
            }
            None => (String::new(), String::new()),
        };

        let mut attributes = HashMap::new();
        attributes.insert("place_id".to_string(), place.external_id.clone());
        attributes.insert("name".to_string(), place.display_name.clone());

        Self {
            id: Some(place.external_id.clone()),
            street,
            city,
            state,
            zip,
            mailing_address: Some(place.formatted_address.clone()),
            location: Some(place.location),
            attributes,
        }
    }
}

fn join_non_empty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// How a record was corroborated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Address,
    Proximity,
    None,
}

/// Verdict for one primary record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDecision {
    pub record: PropertyRecord,
    pub matched: bool,
    pub match_kind: MatchKind,
}

impl MatchDecision {
    pub fn new(record: PropertyRecord, match_kind: MatchKind) -> Self {
        Self {
            record,
            matched: match_kind != MatchKind::None,
            match_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_address_skips_empty_parts() {
        let record = PropertyRecord {
            street: "123 Main St".into(),
            city: "Columbia".into(),
            state: "SC".into(),
            zip: "29201".into(),
            ..Default::default()
        };
        assert_eq!(record.composed_address(), "123 Main St, Columbia, SC 29201");

        let partial = PropertyRecord {
            street: "123 Main St".into(),
            zip: "29201".into(),
            ..Default::default()
        };
        assert_eq!(partial.composed_address(), "123 Main St, 29201");
    }

    #[test]
    fn test_full_address_prefers_mailing() {
        let record = PropertyRecord {
            street: "123 Main St".into(),
            mailing_address: Some("PO Box 9, Columbia, SC 29202".into()),
            ..Default::default()
        };
        assert_eq!(record.full_address(), "PO Box 9, Columbia, SC 29202");
    }

    #[test]
    fn test_from_place_splits_address() {
        let place = PlaceResult {
            external_id: "abc".into(),
            display_name: "Iron Gym".into(),
            formatted_address: "123 Main St, Columbia, SC 29201, USA".into(),
            location: GeoPoint::new(34.0, -81.0),
            category_tags: vec![],
        };

        let record = PropertyRecord::from_place(&place);
        assert_eq!(record.street, "123 Main St");
        assert_eq!(record.city, "Columbia");
        assert_eq!(record.state, "SC");
        assert_eq!(record.zip, "29201");
        assert_eq!(record.location, Some(GeoPoint::new(34.0, -81.0)));
        assert_eq!(record.attributes.get("name").map(String::as_str), Some("Iron Gym"));
    }

    #[test]
    fn test_decision_matched_flag() {
        let d = MatchDecision::new(PropertyRecord::default(), MatchKind::Proximity);
        assert!(d.matched);
        let d = MatchDecision::new(PropertyRecord::default(), MatchKind::None);
        assert!(!d.matched);
    }
}
