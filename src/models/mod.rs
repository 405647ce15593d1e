//! Core data models shared by the sweep stages.

pub mod place;
pub mod property;
pub mod region;

pub use place::{GeoPoint, OsmType, PlaceResult, UniquePlace};
pub use property::{MatchDecision, MatchKind, PropertyRecord};
pub use region::{RegionDescriptor, RegionKind};
