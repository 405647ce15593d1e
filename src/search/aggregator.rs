//! Sequential, budgeted nearby-search sweep over probe points.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::client::{NearbyRequest, NearbySearch};
use super::pacing::Pacer;
use crate::error::SearchError;
use crate::models::{GeoPoint, PlaceResult};

/// A probe that was skipped because its search failed
#[derive(Debug, Clone, Serialize)]
pub struct ProbeFailure {
    /// Position of the probe in the input order
    pub index: usize,
    pub point: GeoPoint,
    pub error: String,
}

/// Everything collected by one aggregation run
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Concatenated pages of every successful probe, duplicates included
    pub results: Vec<PlaceResult>,
    /// Probe sessions started, failed ones included
    pub probes_searched: usize,
    pub pages_fetched: usize,
    pub failures: Vec<ProbeFailure>,
}

/// Per-run probe counter
#[derive(Debug)]
struct RequestBudget {
    max: usize,
    used: usize,
}

impl RequestBudget {
    fn new(max: usize) -> Self {
        Self { max, used: 0 }
    }

    /// Take one probe from the budget, or `false` when it is spent.
    fn try_acquire(&mut self) -> bool {
        if self.used >= self.max {
            return false;
        }
        self.used += 1;
        true
    }
}

/// Issues paged nearby searches at each probe point, one at a time.
pub struct SearchAggregator {
    client: Arc<dyn NearbySearch>,
    pacer: Arc<dyn Pacer>,
    max_pages_per_probe: usize,
}

impl SearchAggregator {
    pub fn new(
        client: Arc<dyn NearbySearch>,
        pacer: Arc<dyn Pacer>,
        max_pages_per_probe: usize,
    ) -> Self {
        Self {
            client,
            pacer,
            max_pages_per_probe: max_pages_per_probe.max(1),
        }
    }

    /// Search every probe in order until `max_requests` probes have run.
    ///
    /// A failed probe is logged and skipped; it still uses up budget.
    pub async fn aggregate(
        &self,
        points: &[GeoPoint],
        keyword: &str,
        radius_meters: u32,
        max_requests: usize,
    ) -> Aggregation {
        let mut budget = RequestBudget::new(max_requests);
        let mut aggregation = Aggregation::default();

        for (index, point) in points.iter().enumerate() {
            if !budget.try_acquire() {
                info!(
                    "Request budget of {} probes reached, skipping {} remaining probe(s)",
                    max_requests,
                    points.len() - index
                );
                break;
            }

            if index > 0 {
                self.pacer.before_probe().await;
            }
            aggregation.probes_searched += 1;

            match self.search_probe(*point, keyword, radius_meters).await {
                Ok((results, pages)) => {
                    debug!(
                        "Probe {} at ({}, {}): {} results over {} page(s)",
                        index,
                        point.lat,
                        point.lon,
                        results.len(),
                        pages
                    );
                    aggregation.pages_fetched += pages;
                    aggregation.results.extend(results);
                }
                Err(e) => {
                    warn!(
                        "Probe {} at ({}, {}) failed, skipping: {}",
                        index, point.lat, point.lon, e
                    );
                    aggregation.failures.push(ProbeFailure {
                        index,
                        point: *point,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Searched {} of {} probes ({} pages, {} failed), {} raw results",
            aggregation.probes_searched,
            points.len(),
            aggregation.pages_fetched,
            aggregation.failures.len(),
            aggregation.results.len()
        );

        aggregation
    }

    /// Fetch up to `max_pages_per_probe` pages at one point.
    async fn search_probe(
        &self,
        location: GeoPoint,
        keyword: &str,
        radius_meters: u32,
    ) -> Result<(Vec<PlaceResult>, usize), SearchError> {
        let mut request = NearbyRequest {
            location,
            radius_meters,
            keyword: keyword.to_string(),
            page_token: None,
        };
        let mut results = Vec::new();
        let mut pages = 0;

        loop {
            let page = self.client.nearby(&request).await?;
            pages += 1;
            results.extend(page.results);

            match page.next_page_token {
                Some(token) if pages < self.max_pages_per_probe => {
                    self.pacer.before_next_page().await;
                    request.page_token = Some(token);
                }
                _ => break,
            }
        }

        Ok((results, pages))
    }
}
