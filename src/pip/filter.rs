//! De-duplication and boundary filtering of raw search results.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::boundary::BoundaryPolygon;
use crate::models::{PlaceResult, UniquePlace};

/// What to do when a place id shows up again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep the first occurrence untouched
    #[default]
    FirstWins,
    /// Keep the first occurrence, filling its empty fields from later ones
    FillGaps,
}

/// Result of one filter pass
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Unique, in-boundary places in first-seen order
    pub places: Vec<UniquePlace>,
    pub inserted: usize,
    pub duplicates: usize,
    /// Results whose coordinate fell outside the boundary
    pub outside: usize,
}

/// Point-in-polygon filter with id de-duplication
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryFilter {
    policy: DedupPolicy,
}

impl BoundaryFilter {
    pub fn new(policy: DedupPolicy) -> Self {
        Self { policy }
    }

    pub fn filter(&self, raw: &[PlaceResult], boundary: &BoundaryPolygon) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        let mut kept: HashMap<&str, usize> = HashMap::new();

        for result in raw {
            if let Some(&idx) = kept.get(result.external_id.as_str()) {
                outcome.duplicates += 1;
                if self.policy == DedupPolicy::FillGaps {
                    outcome.places[idx].place_mut().fill_gaps_from(result);
                }
                continue;
            }

            // Fixed-radius probes near the border spill into neighbouring regions
            if !boundary.contains_geo(result.location) {
                outcome.outside += 1;
                continue;
            }

            kept.insert(result.external_id.as_str(), outcome.places.len());
            outcome.places.push(UniquePlace::confirmed(result.clone()));
            outcome.inserted += 1;
        }

        info!(
            "Boundary filter kept {} unique places ({} duplicates, {} outside boundary)",
            outcome.inserted, outcome.duplicates, outcome.outside
        );

        outcome
    }
}
