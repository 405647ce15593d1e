//! Reconciliation of property records against boundary-confirmed places.

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use tracing::{info, warn};

use super::normalize::normalize_address;
use super::proximity::{ProximityIndex, ProximityMetric};
use crate::models::{MatchDecision, MatchKind, PropertyRecord, UniquePlace};

/// Normalized addresses and coordinates of the secondary source
struct SecondaryIndex {
    addresses: HashSet<String>,
    proximity: ProximityIndex,
}

impl SecondaryIndex {
    fn build(places: &[UniquePlace], metric: ProximityMetric) -> Self {
        let mut addresses = HashSet::with_capacity(places.len() * 2);
        for place in places {
            let full = normalize_address(&place.formatted_address);
            if !full.is_empty() {
                addresses.insert(full);
            }
            let street = normalize_address(place.street());
            if !street.is_empty() {
                addresses.insert(street);
            }
        }

        let proximity = ProximityIndex::build(places.iter().map(|p| p.location), metric);

        Self {
            addresses,
            proximity,
        }
    }

    fn classify(&self, record: &PropertyRecord) -> MatchKind {
        let address_hit = address_variants(record)
            .iter()
            .any(|v| self.addresses.contains(v));
        if address_hit {
            return MatchKind::Address;
        }

        match record.location {
            Some(location) if self.proximity.is_match(location) => MatchKind::Proximity,
            _ => MatchKind::None,
        }
    }
}

/// Normalized candidate keys for a record: full address, street only, and
/// street/city/state/zip in two field orders.
fn address_variants(record: &PropertyRecord) -> Vec<String> {
    let raw = [
        record.full_address(),
        record.street.clone(),
        format!(
            "{} {} {} {}",
            record.street, record.city, record.state, record.zip
        ),
        format!(
            "{} {} {} {}",
            record.street, record.zip, record.city, record.state
        ),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(raw.len());
    for candidate in raw {
        let normalized = normalize_address(&candidate);
        if !normalized.is_empty() && !variants.contains(&normalized) {
            variants.push(normalized);
        }
    }
    variants
}

/// Merge key: normalized street plus zip
fn merge_key(record: &PropertyRecord) -> String {
    format!(
        "{}|{}",
        normalize_address(&record.street),
        record.zip.trim()
    )
}

/// Cross-references structured records with search results
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossReferencer {
    metric: ProximityMetric,
}

impl CrossReferencer {
    pub fn new(metric: ProximityMetric) -> Self {
        Self { metric }
    }

    /// Verdict for every primary record, in input order.
    pub fn decide(&self, primary: &[PropertyRecord], secondary: &[UniquePlace]) -> Vec<MatchDecision> {
        let index = SecondaryIndex::build(secondary, self.metric);

        primary
            .par_iter()
            .map(|record| MatchDecision::new(record.clone(), index.classify(record)))
            .collect()
    }

    /// Keep only the primary records corroborated by `secondary`.
    ///
    /// An empty `secondary` returns `primary` untouched.
    pub fn cross_reference(
        &self,
        primary: Vec<PropertyRecord>,
        secondary: &[UniquePlace],
    ) -> Vec<PropertyRecord> {
        self.reconcile(primary, secondary).0
    }

    /// Filter-mode records together with the decisions behind them.
    ///
    /// With no secondary places nothing is decided: the records pass through
    /// and the decisions are `None`.
    pub fn reconcile(
        &self,
        primary: Vec<PropertyRecord>,
        secondary: &[UniquePlace],
    ) -> (Vec<PropertyRecord>, Option<Vec<MatchDecision>>) {
        if secondary.is_empty() {
            warn!(
                "No secondary places to cross-reference against, passing {} records through unfiltered",
                primary.len()
            );
            return (primary, None);
        }

        let decisions = self.decide(&primary, secondary);
        let by_address = decisions
            .iter()
            .filter(|d| d.match_kind == MatchKind::Address)
            .count();
        let by_proximity = decisions
            .iter()
            .filter(|d| d.match_kind == MatchKind::Proximity)
            .count();

        info!(
            "Cross-reference kept {} of {} records ({} by address, {} by proximity)",
            by_address + by_proximity,
            primary.len(),
            by_address,
            by_proximity
        );

        let kept = decisions
            .iter()
            .filter(|d| d.matched)
            .map(|d| d.record.clone())
            .collect();

        (kept, Some(decisions))
    }

    /// Union of both sources keyed by normalized street and zip.
    ///
    /// Primary records win on collision; places only fill in missing keys.
    pub fn merge(
        &self,
        primary: Vec<PropertyRecord>,
        secondary: &[UniquePlace],
    ) -> Vec<PropertyRecord> {
        let mut merged: Vec<PropertyRecord> = Vec::with_capacity(primary.len() + secondary.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in primary {
            let key = merge_key(&record);
            if positions.contains_key(&key) {
                continue;
            }
            positions.insert(key, merged.len());
            merged.push(record);
        }

        let primary_count = merged.len();

        for place in secondary {
            let record = PropertyRecord::from_place(place);
            let key = merge_key(&record);
            if positions.contains_key(&key) {
                continue;
            }
            positions.insert(key, merged.len());
            merged.push(record);
        }

        info!(
            "Merged {} primary records with {} places into {} records",
            primary_count,
            secondary.len(),
            merged.len()
        );

        merged
    }
}
