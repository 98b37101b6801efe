use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::check::CheckConfig;
use crate::cost::CostModel;
use crate::errors::{Result, TripleIfError};
use crate::simplify::SimplifyConfig;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "triple-if.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cost: CostModel,

    #[serde(default)]
    pub simplify: SimplifyConfig,

    #[serde(default)]
    pub check: CheckConfig,
}

impl Config {
    /// Load from `path` if given; otherwise from the first default location
    /// that exists, falling back to built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    TripleIfError::Config(format!("failed to read config from {}: {}", p, e))
                })?;
                Self::from_toml(&content, p)
            }
            None => {
                for p in default_paths() {
                    if let Ok(content) = std::fs::read_to_string(&p) {
                        return Self::from_toml(&content, &p.display().to_string());
                    }
                }
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn from_toml(content: &str, origin: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| {
            TripleIfError::Config(format!("failed to parse config {}: {}", origin, e))
        })?;
        config.validate()?;
        info!(path = origin, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.cost.validate().map_err(TripleIfError::Config)
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("triple-if").join("config.toml"));
    }
    paths
}
