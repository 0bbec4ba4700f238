use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api-mainnet.magiceden.dev/v2/ord/btc/tokens";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    pub output_dir: PathBuf,
    pub cors: bool,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    /// Upper bound on the pages a single collection may span, `None` for no bound.
    pub max_pages: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            output_dir: PathBuf::from("."),
            cors: true,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            max_pages: Some(1000),
            request_timeout_secs: None,
        }
    }
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Loads the config file (if any) and applies the `EDEN_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml(&raw)?
            }
            None => Self::default(),
        };

        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(raw)?)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("EDEN_API_KEY") {
            self.upstream.api_key = key;
        }
        if let Some(addr) = lookup("EDEN_BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(dir) = lookup("EDEN_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|_| ConfigError::BindAddress(self.bind_address.clone()))
    }
}
