//! Administrative region descriptors.

use serde::{Deserialize, Serialize};

/// Kind of administrative region a sweep targets.
///
/// Maps onto OSM `admin_level` values as used in the United States.
/// See: https://wiki.openstreetmap.org/wiki/Tag:boundary%3Dadministrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// City / town (admin_level=8)
    City,
    /// County (admin_level=6)
    County,
}

impl RegionKind {
    /// Get the OSM admin_level number
    pub fn to_osm_level(&self) -> u8 {
        match self {
            RegionKind::City => 8,
            RegionKind::County => 6,
        }
    }
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionKind::City => write!(f, "city"),
            RegionKind::County => write!(f, "county"),
        }
    }
}

impl std::str::FromStr for RegionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city" => Ok(RegionKind::City),
            "county" => Ok(RegionKind::County),
            other => Err(format!("unknown region kind '{}', expected city or county", other)),
        }
    }
}

/// A named city or county inside a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    /// Region name as the boundary service knows it (e.g. "Orange County")
    pub name: String,

    pub kind: RegionKind,

    /// Full state name (e.g. "California"), never the postal abbreviation
    pub state: String,
}

impl RegionDescriptor {
    pub fn new(name: impl Into<String>, kind: RegionKind, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            state: state.into(),
        }
    }

    pub fn admin_level(&self) -> u8 {
        self.kind.to_osm_level()
    }
}

impl std::fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}), {}", self.name, self.kind, self.state)
    }
}
