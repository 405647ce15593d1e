use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::boundary::DEFAULT_OVERPASS_ENDPOINT;
use crate::matching::ProximityMetric;
use crate::pip::DedupPolicy;
use crate::search::{FixedDelayPacer, GovernedPacer, Pacer, DEFAULT_NEARBY_ENDPOINT};

/// Smallest probe radius accepted from config or the command line
pub const MIN_RADIUS_METERS: u32 = 100;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub boundary: BoundaryConfig,
    pub search: SearchConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
            timeout_secs: 90,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub radius_meters: u32,
    /// Probe sessions allowed per sweep
    pub max_requests: usize,
    pub max_pages_per_probe: usize,
    pub inter_probe_delay_ms: u64,
    /// Wait before a fresh page token is usable
    pub page_settle_delay_ms: u64,
    pub timeout_secs: u64,
    /// Switches probe pacing to a token bucket when set
    pub probes_per_second: Option<u32>,
    pub burst: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NEARBY_ENDPOINT.to_string(),
            radius_meters: 20_000,
            max_requests: 156,
            max_pages_per_probe: 3,
            inter_probe_delay_ms: 200,
            page_settle_delay_ms: 2_000,
            timeout_secs: 30,
            probes_per_second: None,
            burst: None,
        }
    }
}

impl SearchConfig {
    /// Build the pacer this section describes.
    pub fn pacer(&self) -> Result<Arc<dyn Pacer>> {
        let page_delay = Duration::from_millis(self.page_settle_delay_ms);

        match self.probes_per_second {
            Some(rate) => {
                let rate = NonZeroU32::new(rate).context("probes_per_second must be positive")?;
                let burst = match self.burst {
                    Some(b) => NonZeroU32::new(b).context("burst must be positive")?,
                    None => NonZeroU32::MIN,
                };
                Ok(Arc::new(GovernedPacer::new(rate, burst, page_delay)))
            }
            None => Ok(Arc::new(FixedDelayPacer::new(
                Duration::from_millis(self.inter_probe_delay_ms),
                page_delay,
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MatchingConfig {
    pub dedup: DedupPolicy,
    pub proximity: ProximityMetric,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.radius_meters < MIN_RADIUS_METERS {
            bail!(
                "search.radius_meters must be at least {}, got {}",
                MIN_RADIUS_METERS,
                self.search.radius_meters
            );
        }
        if self.search.max_pages_per_probe == 0 {
            bail!("search.max_pages_per_probe must be greater than zero");
        }
        if self.search.probes_per_second == Some(0) {
            bail!("search.probes_per_second must be greater than zero");
        }
        if self.search.burst == Some(0) {
            bail!("search.burst must be greater than zero");
        }

        let threshold = self.matching.proximity.threshold();
        if !threshold.is_finite() || threshold <= 0.0 {
            bail!(
                "matching.proximity threshold must be a positive number, got {}",
                threshold
            );
        }

        Ok(())
    }
}
