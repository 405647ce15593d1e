//! Address normalization and cross-referencing of property records.

mod crossref;
mod normalize;
mod proximity;

pub use crossref::CrossReferencer;
pub use normalize::normalize_address;
pub use proximity::{ProximityIndex, ProximityMetric};
