//! Configuration for the Stasis Gate.
//!
//! Loaded in layers: built-in defaults, then an optional file
//! (TOML, YAML or JSON), then `STASIS_*` environment variables.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use stasis_types::DEFAULT_QUORUM_MIN;

use crate::error::ConfigError;

/// Default contest lifetime: 72 hours.
pub const DEFAULT_TTL_MS: u64 = 72 * 60 * 60 * 1000;

/// Default audit records retained per invariant.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StasisConfig {
    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StasisConfig {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// Environment variables use the `STASIS` prefix and `__` as the section
    /// separator, e.g. `STASIS_GATE__QUORUM_MIN=3`.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&StasisConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("STASIS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: StasisConfig = builder.build()?.try_deserialize()?;
        loaded.gate.validate()?;
        Ok(loaded)
    }
}

/// Gate behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Contest lifetime in milliseconds. `None` disables expiry.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: Option<u64>,

    /// Audit records retained per invariant; oldest are dropped first.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Distinct attestations the gate requires before clearing a contest.
    #[serde(default = "default_quorum_min")]
    pub quorum_min: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            history_limit: default_history_limit(),
            quorum_min: default_quorum_min(),
        }
    }
}

impl GateConfig {
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl_ms = ttl.map(|d| d.num_milliseconds().max(0) as u64);
        self
    }

    pub fn with_ttl_ms(mut self, ttl_ms: Option<u64>) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_quorum_min(mut self, quorum_min: usize) -> Self {
        self.quorum_min = quorum_min;
        self
    }

    /// Contest lifetime, if expiry is enabled.
    pub fn ttl(&self) -> Option<Duration> {
        // Out-of-range values saturate at the largest representable delta.
        self.ttl_ms
            .and_then(|ms| Duration::try_milliseconds(i64::try_from(ms).unwrap_or(i64::MAX)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1".into(),
            ));
        }
        if self.quorum_min == 0 {
            return Err(ConfigError::Invalid(
                "quorum_min must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_ttl_ms() -> Option<u64> {
    Some(DEFAULT_TTL_MS)
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_quorum_min() -> usize {
    DEFAULT_QUORUM_MIN
}

fn default_log_level() -> String {
    "info".to_string()
}
