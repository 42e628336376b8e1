//! Pipeline configuration.
//!
//! Values come from [`PipelineConfig::default`] and may be overridden from
//! the process environment with [`PipelineConfig::from_env`].

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the sweep interval in seconds.
pub const SWEEP_INTERVAL_ENV: &str = "ATELIER_SWEEP_INTERVAL_SECS";
/// Environment variable holding the sweep batch size.
pub const SWEEP_BATCH_SIZE_ENV: &str = "ATELIER_SWEEP_BATCH_SIZE";

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_BATCH_SIZE: usize = 100;

/// Errors raised while reading configuration overrides.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("{name} must be a positive integer, got {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Settings for the event recorder, notifier and sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Time between two sweep ticks.
    pub sweep_interval: Duration,
    /// Maximum number of events handled by one sweep.
    pub batch_size: usize,
    /// Actor label used when an event carries no user name.
    pub unknown_actor_label: String,
    /// Placeholder for detail keys missing from an event payload.
    pub missing_detail_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            unknown_actor_label: "Unknown User".to_owned(),
            missing_detail_label: "N/A".to_owned(),
        }
    }
}

impl PipelineConfig {
    /// Sets the sweep interval.
    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the sweep batch size. Zero is raised to one.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = if batch_size == 0 { 1 } else { batch_size };
        self
    }

    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set to anything
    /// but a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads overrides through `lookup`, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is set to anything but a
    /// positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(seconds) = positive(SWEEP_INTERVAL_ENV, lookup(SWEEP_INTERVAL_ENV))? {
            config.sweep_interval = Duration::from_secs(seconds);
        }
        if let Some(size) = positive(SWEEP_BATCH_SIZE_ENV, lookup(SWEEP_BATCH_SIZE_ENV))? {
            config.batch_size = usize::try_from(size).map_err(|_| ConfigError::Invalid {
                name: SWEEP_BATCH_SIZE_ENV,
                value: size.to_string(),
            })?;
        }
        Ok(config)
    }
}

fn positive(name: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(value) = raw else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
