//! Solver configuration.
//!
//! Options can be set in code or loaded from TOML:
//!
//! ```
//! use u_schedule_smt::config::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     verbosity = true
//!     max_time = 5
//!     parallel = true
//! "#).unwrap();
//!
//! assert!(config.verbosity);
//! assert_eq!(config.timeout_ms(), 5_000);
//! assert_eq!(config.worker_threads(), 4);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Worker cap handed to the engine when `parallel` is enabled.
pub const PARALLEL_WORKERS: usize = 4;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Options of one solving session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Log every assertion, the engine statistics and variable bindings.
    pub verbosity: bool,
    /// Wall-clock budget of one check, in seconds.
    pub max_time: u64,
    /// Let the engine search with up to [`PARALLEL_WORKERS`] threads.
    pub parallel: bool,
    /// Seed for engines that randomise their search order.
    pub random_seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            verbosity: false,
            max_time: 60,
            parallel: false,
            random_seed: None,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_time == 0 {
            return Err(ConfigError::Invalid("max_time must be at least 1 second".into()));
        }
        Ok(())
    }

    pub fn with_verbosity(mut self, verbosity: bool) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Sets the time budget. Like TOML loading, it is at least one second.
    pub fn with_max_time(mut self, seconds: u64) -> Self {
        self.max_time = seconds.max(1);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Time budget as a duration.
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.max_time)
    }

    /// Time budget in the engine's native unit (milliseconds).
    pub fn timeout_ms(&self) -> u64 {
        self.max_time.saturating_mul(1000)
    }

    /// Number of search threads the engine may use.
    pub fn worker_threads(&self) -> usize {
        if self.parallel {
            PARALLEL_WORKERS
        } else {
            1
        }
    }
}
