//! Configuration for the Pledge conformance runner.
//!
//! ```toml
//! [scheduler]
//! max_turns = 100000
//!
//! [logging]
//! filter = "pledge=debug"
//!
//! [conformance]
//! chain_depth = 5
//! width = 3
//! ```
//!
//! Every section is optional. The file lives at `~/.pledge/config.toml`
//! unless `PLEDGE_CONFIG` points somewhere else.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "PLEDGE_CONFIG";

const DEFAULT_CHAIN_DEPTH: usize = 5;
const DEFAULT_WIDTH: usize = 3;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PledgeConfig {
    pub scheduler: Option<SchedulerConfig>,
    pub logging: Option<LoggingConfig>,
    pub conformance: Option<ConformanceConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Task queue limits.
#[derive(Debug, Default, Deserialize)]
pub struct SchedulerConfig {
    /// Stop draining the queue after this many tasks. Unset means unbounded.
    pub max_turns: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

/// Sizes used by the conformance scenarios.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConformanceConfig {
    /// Nesting depth for the deep thenable scenario. Default: 5.
    pub chain_depth: Option<usize>,
    /// Number of inputs for the race and all_of scenarios. Default: 3.
    pub width: Option<usize>,
}

impl ConformanceConfig {
    #[must_use]
    pub fn chain_depth(&self) -> usize {
        self.chain_depth.unwrap_or(DEFAULT_CHAIN_DEPTH).max(1)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width.unwrap_or(DEFAULT_WIDTH).max(2)
    }
}

impl PledgeConfig {
    /// Load from the default location. `Ok(None)` if no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Errors are returned, not logged. Callers report them after logging is
    /// initialized.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn max_turns(&self) -> Option<usize> {
        self.scheduler.as_ref().and_then(|s| s.max_turns)
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.filter.as_deref())
    }

    #[must_use]
    pub fn conformance(&self) -> ConformanceConfig {
        self.conformance.clone().unwrap_or_default()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".pledge").join("config.toml"))
}
