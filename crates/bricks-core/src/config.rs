//! Workspace configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use bricks_tabs::TabViewConfig;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter directives, used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Settings for every tab view the workspace opens
    pub tabs: TabViewConfig,
}

impl Config {
    /// Load the configuration from a JSON file.
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        let config = Self::from_json(&json)?;

        tracing::info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        EnvFilter::try_new(&self.log_filter).map_err(|err| {
            CoreError::Config(format!("invalid log filter {:?}: {err}", self.log_filter))
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            tabs: TabViewConfig::default(),
        }
    }
}
