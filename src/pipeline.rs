//! End-to-end sweep: boundary, probe grid, search, filter.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::boundary::{BoundaryKind, BoundaryResolver};
use crate::error::BoundaryError;
use crate::grid;
use crate::models::{MatchDecision, PropertyRecord, RegionDescriptor, UniquePlace};
use crate::pip::BoundaryFilter;
use crate::search::{ProbeFailure, SearchAggregator};

/// Everything one sweep produced, ready to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub region: String,
    pub keyword: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub boundary_kind: BoundaryKind,
    pub probes_planned: usize,
    pub probes_searched: usize,
    pub pages_fetched: usize,
    pub probe_failures: Vec<ProbeFailure>,
    /// Results before de-duplication and boundary filtering
    pub raw_results: usize,
    pub duplicates: usize,
    pub outside: usize,
    pub places: Vec<UniquePlace>,

    /// Filtered or merged property records, when a dataset was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<PropertyRecord>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decisions: Option<Vec<MatchDecision>>,
}

/// Per-sweep search settings
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    pub radius_meters: u32,
    pub max_requests: usize,
}

pub struct Sweeper {
    resolver: BoundaryResolver,
    aggregator: SearchAggregator,
    filter: BoundaryFilter,
    settings: SweepSettings,
}

impl Sweeper {
    pub fn new(
        resolver: BoundaryResolver,
        aggregator: SearchAggregator,
        filter: BoundaryFilter,
        settings: SweepSettings,
    ) -> Self {
        Self {
            resolver,
            aggregator,
            filter,
            settings,
        }
    }

    /// Enumerate `keyword` places inside `region`.
    ///
    /// Only boundary resolution can fail; search failures end up in
    /// `probe_failures`.
    pub async fn run(
        &self,
        region: &RegionDescriptor,
        keyword: &str,
    ) -> Result<SweepReport, BoundaryError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Sweep {} started for '{}' in {}", run_id, keyword, region);

        let boundary = self.resolver.resolve(region).await?;

        let probes = grid::tile(&boundary, f64::from(self.settings.radius_meters));
        info!(
            "Planned {} probe(s) at {} m radius, budget {}",
            probes.len(),
            self.settings.radius_meters,
            self.settings.max_requests
        );

        let aggregation = self
            .aggregator
            .aggregate(
                &probes,
                keyword,
                self.settings.radius_meters,
                self.settings.max_requests,
            )
            .await;

        let filtered = self.filter.filter(&aggregation.results, &boundary);

        let finished_at = Utc::now();
        info!(
            "Sweep {} finished in {} s with {} places",
            run_id,
            (finished_at - started_at).num_seconds(),
            filtered.places.len()
        );

        Ok(SweepReport {
            run_id,
            region: region.to_string(),
            keyword: keyword.to_string(),
            started_at,
            finished_at,
            boundary_kind: boundary.kind(),
            probes_planned: probes.len(),
            probes_searched: aggregation.probes_searched,
            pages_fetched: aggregation.pages_fetched,
            probe_failures: aggregation.failures,
            raw_results: aggregation.results.len(),
            duplicates: filtered.duplicates,
            outside: filtered.outside,
            places: filtered.places,
            records: None,
            decisions: None,
        })
    }
}
