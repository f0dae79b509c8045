// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Node configuration.
//!
//! Resolution order: built-in defaults, then a JSON file (`TINTA_CONFIG`, or
//! `./config.json` when present), then `TINTA_*` environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tinta_kernel::config::{DEFAULT_FLUSH_DELAY_MS, DEFAULT_SUGGESTION_LIMIT};
use tinta_kernel::dist::ColorMetric;

use crate::store::StoreConfig;

const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    /// Document backing the product store; `None` keeps it in memory only.
    pub store_path: Option<PathBuf>,
    pub flush_delay_ms: u64,
    pub color_metric: ColorMetric,
    pub default_suggestions: usize,
    /// Base URL of the image-analysis service, e.g. `https://vision.googleapis.com`.
    pub vision_endpoint: Option<String>,
    pub vision_api_key: Option<String>,
    /// Bearer token required on `/admin` routes when set.
    pub auth_token: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9090)),
            store_path: Some(PathBuf::from("data/products.json")),
            flush_delay_ms: DEFAULT_FLUSH_DELAY_MS,
            color_metric: ColorMetric::default(),
            default_suggestions: DEFAULT_SUGGESTION_LIMIT,
            vision_endpoint: None,
            vision_api_key: None,
            auth_token: None,
        }
    }
}

impl NodeConfig {
    /// Defaults, overlaid by the config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var_os("TINTA_CONFIG").map(PathBuf::from).or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        });

        let mut cfg = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks values that deserialize fine but cannot be served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_suggestions == 0 {
            return Err(ConfigError::InvalidValue {
                key: "default_suggestions",
                value: self.default_suggestions.to_string(),
            });
        }
        Ok(())
    }

    /// Applies `TINTA_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TINTA_BIND_ADDR") {
            self.bind_addr = parse("TINTA_BIND_ADDR", v)?;
        }
        if let Some(v) = lookup("TINTA_STORE_PATH") {
            // Empty means volatile
            self.store_path = (!v.trim().is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = lookup("TINTA_FLUSH_DELAY_MS") {
            self.flush_delay_ms = parse("TINTA_FLUSH_DELAY_MS", v)?;
        }
        if let Some(v) = lookup("TINTA_COLOR_METRIC") {
            self.color_metric = parse("TINTA_COLOR_METRIC", v)?;
        }
        if let Some(v) = lookup("TINTA_DEFAULT_SUGGESTIONS") {
            let n: usize = parse("TINTA_DEFAULT_SUGGESTIONS", v.clone())?;
            if n == 0 {
                return Err(ConfigError::InvalidValue { key: "TINTA_DEFAULT_SUGGESTIONS", value: v });
            }
            self.default_suggestions = n;
        }
        if let Some(v) = lookup("TINTA_VISION_ENDPOINT") {
            self.vision_endpoint = non_empty(v);
        }
        if let Some(v) = lookup("TINTA_VISION_KEY") {
            self.vision_api_key = non_empty(v);
        }
        if let Some(v) = lookup("TINTA_AUTH_TOKEN") {
            self.auth_token = non_empty(v);
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            flush_delay: Duration::from_millis(self.flush_delay_ms),
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

fn non_empty(v: String) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}
