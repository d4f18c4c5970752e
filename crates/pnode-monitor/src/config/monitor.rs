use pnode_types::{PnodeError, PnodeResult, DEFAULT_HISTORY_WINDOW, MAX_HISTORY_SAMPLES};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::constants::{
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEEDS, DEFAULT_SEED_RPC_PATH,
    DEFAULT_SEED_RPC_PORT,
};
use super::geo::GeoConfig;
use super::logging::LoggingConfig;
use super::types::LogLevel;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Gossip JSON-RPC endpoint. Derived from the first seed when unset.
    pub rpc_endpoint: Option<String>,
    pub seeds: Vec<String>,
    pub seed_rpc_port: u16,
    pub seed_rpc_path: String,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub history_window: usize,
    pub geo: GeoConfig,
    pub logging: LoggingConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: None,
            seeds: DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect(),
            seed_rpc_port: DEFAULT_SEED_RPC_PORT,
            seed_rpc_path: DEFAULT_SEED_RPC_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            history_window: DEFAULT_HISTORY_WINDOW,
            geo: GeoConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pnode")
            .join("config.toml")
    }

    pub fn load(path: impl AsRef<Path>) -> PnodeResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| PnodeError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| PnodeError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file {:?} not found, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PnodeResult<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PnodeError::Io(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| PnodeError::Io(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    pub fn to_toml(&self) -> PnodeResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PnodeError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `PNODE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("PNODE_RPC_ENDPOINT") {
            let endpoint = endpoint.trim().to_string();
            if !endpoint.is_empty() {
                self.rpc_endpoint = Some(endpoint);
            }
        }

        if let Some(seeds) = lookup("PNODE_SEEDS") {
            self.seeds = parse_seed_list(&seeds);
        }

        if let Some(interval) = lookup("PNODE_POLL_INTERVAL") {
            match interval.parse() {
                Ok(secs) => self.poll_interval_secs = secs,
                Err(_) => warn!("Ignoring invalid PNODE_POLL_INTERVAL: {}", interval),
            }
        }

        if lookup("PNODE_GEO_DISABLED").is_some() {
            self.geo.enabled = false;
        }

        if let Some(level) = lookup("PNODE_LOG_LEVEL") {
            self.logging.level = LogLevel::parse(&level);
        }

        if lookup("PNODE_LOG_JSON").is_some() {
            self.logging.json = true;
        }
    }

    pub fn validate(&self) -> PnodeResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(PnodeError::Config("Poll interval cannot be 0".into()));
        }

        if self.request_timeout_secs == 0 {
            return Err(PnodeError::Config("Request timeout cannot be 0".into()));
        }

        if self.seed_rpc_port == 0 {
            return Err(PnodeError::Config("Seed RPC port cannot be 0".into()));
        }

        if self.history_window == 0 || self.history_window > MAX_HISTORY_SAMPLES {
            return Err(PnodeError::Config(format!(
                "History window must be between 1 and {}",
                MAX_HISTORY_SAMPLES
            )));
        }

        if self.geo.enabled && self.geo.timeout_secs == 0 {
            return Err(PnodeError::Config("Geo lookup timeout cannot be 0".into()));
        }

        match &self.rpc_endpoint {
            Some(endpoint) => validate_http_url(endpoint)?,
            None if self.seeds.is_empty() => {
                return Err(PnodeError::Config(
                    "No rpc_endpoint configured and no seeds to derive one from".into(),
                ));
            }
            None => {}
        }

        if self.seeds.is_empty() {
            warn!("No seed hosts configured - gossip failures will not fall back");
        }

        Ok(())
    }

    /// The gossip endpoint actually queried.
    pub fn resolved_rpc_endpoint(&self) -> String {
        match (&self.rpc_endpoint, self.seeds.first()) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(first)) => format!("http://{}:{}{}", first, self.seed_rpc_port, self.seed_rpc_path),
            (None, None) => format!(
                "http://{}:{}{}",
                DEFAULT_SEEDS[0], self.seed_rpc_port, self.seed_rpc_path
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Splits a comma-separated seed list, trimming entries and dropping empties.
pub fn parse_seed_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn validate_http_url(endpoint: &str) -> PnodeResult<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| PnodeError::Config(format!("Invalid rpc_endpoint {}: {}", endpoint, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(PnodeError::Config(format!(
            "rpc_endpoint must use http or https, got {}",
            other
        ))),
    }
}
