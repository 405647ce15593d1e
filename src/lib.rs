//! Canopy - facility enumeration over administrative regions.
//!
//! Resolves a region boundary, tiles it with nearby-search probes, filters
//! the results to the boundary, and cross-references them against a
//! structured property dataset. The `sweep` binary drives the whole run.

pub mod boundary;
pub mod config;
pub mod error;
pub mod grid;
pub mod matching;
pub mod models;
pub mod pip;
pub mod pipeline;
pub mod records;
pub mod search;

pub use error::{BoundaryError, SearchError};
pub use models::{GeoPoint, PlaceResult, PropertyRecord, RegionDescriptor, RegionKind, UniquePlace};
pub use pipeline::{SweepReport, SweepSettings, Sweeper};
