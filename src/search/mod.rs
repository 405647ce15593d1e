//! Nearby-search aggregation across probe points.

mod aggregator;
mod client;
mod pacing;

pub use aggregator::{Aggregation, ProbeFailure, SearchAggregator};
pub use client::{NearbyPage, NearbyRequest, NearbySearch, PlacesClient, DEFAULT_NEARBY_ENDPOINT};
pub use pacing::{FixedDelayPacer, GovernedPacer, Pacer};
