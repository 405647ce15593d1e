//! Point-in-polygon filtering of search results.
//!
//! Drops repeated place ids and anything whose coordinate falls outside the
//! resolved region boundary.

mod filter;

pub use filter::{BoundaryFilter, DedupPolicy, FilterOutcome};
