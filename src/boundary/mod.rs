//! Administrative boundary resolution.
//!
//! Queries an Overpass-compatible service for the region's boundary relation
//! and assembles its member ways into a polygon.

mod overpass;
mod polygon;
mod resolver;
mod rings;

pub use overpass::{
    boundary_query, BoundarySource, OverpassClient, OverpassElement, OverpassMember,
    OverpassResponse, DEFAULT_OVERPASS_ENDPOINT,
};
pub use polygon::{BoundaryKind, BoundaryPolygon};
pub use resolver::{polygon_from_response, BoundaryResolver};
pub use rings::{assemble_polygons, stitch_rings};
