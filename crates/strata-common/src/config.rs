//! Compute configuration.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Default cap on distinct warnings surfaced per query
pub const DEFAULT_MAX_WARNINGS: usize = 20;

/// Default number of positions between cancellation checks
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 1024;

/// Settings shared by every evaluation unit of a query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Maximum number of distinct warnings recorded per query.
    pub max_warnings: usize,

    /// Per-row loops check for cancellation every this many positions.
    pub checkpoint_interval: usize,

    /// Number of evaluation units run concurrently.
    pub parallelism: usize,

    /// `tracing` filter directive, e.g. `"info"` or `"strata_compute=debug"`.
    pub log_filter: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        ComputeConfig {
            max_warnings: DEFAULT_MAX_WARNINGS,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            log_filter: "info".to_string(),
        }
    }
}

impl ComputeConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ComputeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_warnings == 0 {
            return Err(Error::InvalidConfig(
                "max_warnings must be greater than zero".to_string(),
            ));
        }
        if self.checkpoint_interval == 0 {
            return Err(Error::InvalidConfig(
                "checkpoint_interval must be greater than zero".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(Error::InvalidConfig(
                "parallelism must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_max_warnings(mut self, max_warnings: usize) -> Self {
        self.max_warnings = max_warnings;
        self
    }

    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}
