use std::{fs, path::Path};

use serde::Deserialize;

use crate::{PipeforgeError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// backend config
    #[serde(default)]
    pub backend: BackendConfig,
    /// maximum number of algorithms kept in the catalog cache, defaults to 512
    #[serde(default = "default_algorithm_cache_capacity")]
    pub algorithm_cache_capacity: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    /// backend type
    #[serde(default)]
    pub backend_type: BackendType,
    /// http config
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    #[default]
    Mem,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// workflow manager base url, e.g. `http://localhost:8080/workflow-manager/`
    pub base_url: String,
    /// request timeout in milliseconds, defaults to 30000
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_algorithm_cache_capacity() -> u64 {
    512
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            algorithm_cache_capacity: default_algorithm_cache_capacity(),
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|err| PipeforgeError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), err)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        if config.backend.backend_type == BackendType::Http && config.backend.http.is_none() {
            return Err(PipeforgeError::Config("http configuration is required when backend type is http".to_string()));
        }
        Ok(config)
    }
}
