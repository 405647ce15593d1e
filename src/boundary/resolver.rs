//! Resolves a region descriptor into its boundary polygon.

use geo::Coord;
use std::sync::Arc;
use tracing::{debug, info};

use super::overpass::{boundary_query, BoundarySource, OverpassResponse};
use super::polygon::BoundaryPolygon;
use super::rings::{assemble_polygons, stitch_rings};
use crate::error::BoundaryError;
use crate::models::{OsmType, RegionDescriptor};

/// Boundary resolution service
pub struct BoundaryResolver {
    source: Arc<dyn BoundarySource>,
    timeout_secs: u64,
}

impl BoundaryResolver {
    pub fn new(source: Arc<dyn BoundarySource>, timeout_secs: u64) -> Self {
        Self {
            source,
            timeout_secs,
        }
    }

    /// Fetch and assemble the boundary for a region.
    pub async fn resolve(&self, region: &RegionDescriptor) -> Result<BoundaryPolygon, BoundaryError> {
        info!(
            "Resolving boundary for {} at admin level {}",
            region,
            region.admin_level()
        );

        let query = boundary_query(region, self.timeout_secs);
        let response = self.source.query(&query).await?;

        let boundary = polygon_from_response(&response).ok_or_else(|| BoundaryError::NotFound {
            region: region.to_string(),
        })?;

        info!(
            "Boundary for {} resolved as {:?} with {} outer ring(s)",
            region,
            boundary.kind(),
            boundary.ring_count()
        );

        Ok(boundary)
    }
}

/// Assemble a boundary from every relation in the response.
///
/// Only `way` members with an outer, inner or empty role contribute.
pub fn polygon_from_response(response: &OverpassResponse) -> Option<BoundaryPolygon> {
    let mut outer_chains = Vec::new();
    let mut inner_chains = Vec::new();

    for element in &response.elements {
        if element.osm_type != OsmType::Relation {
            continue;
        }

        for member in &element.members {
            if member.osm_type != OsmType::Way || member.geometry.is_empty() {
                continue;
            }

            let chain: Vec<Coord<f64>> = member
                .geometry
                .iter()
                .map(|p| Coord { x: p.lon, y: p.lat })
                .collect();

            match member.role.as_str() {
                "outer" | "" => outer_chains.push(chain),
                "inner" => inner_chains.push(chain),
                other => debug!("Ignoring way {} with role '{}'", member.id, other),
            }
        }
    }

    debug!(
        "Collected {} outer and {} inner way chains",
        outer_chains.len(),
        inner_chains.len()
    );

    let outers = stitch_rings(outer_chains);
    let inners = stitch_rings(inner_chains);

    BoundaryPolygon::from_polygons(assemble_polygons(outers, inners))
}
