//! Configuration loading from TOML files
//!
//! Every section and field is optional; missing values fall back to the
//! public themeparks.wiki API and wait-time ordering.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::aggregate::BoardSort;
use crate::client::ClientConfig;
use crate::error::ProcessingError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub board: BoardSort,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ProcessingError> {
        let config: AppConfig = toml::from_str(content)?;
        if config.client.timeout_ms == 0 {
            return Err(ProcessingError::ConfigError(
                "client.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProcessingError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if given, falling back to defaults when it cannot be used.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default configuration");
                Self::default()
            }
        }
    }
}
