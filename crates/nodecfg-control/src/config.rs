//! Daemon configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::ControlConfig;

/// Configuration for the `nodecfg-control` daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Listen address (e.g., "0.0.0.0:8510").
    #[serde(default = "NodeConfig::default_listen_addr")]
    pub listen_addr: String,

    /// JSON registry catalog to serve patterns and definitions from.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Architecture override.
    #[serde(default)]
    pub arch: Option<String>,
}

impl NodeConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8510".to_string()
    }

    /// Load configuration from `LISTEN_ADDR`, `CATALOG_PATH` and `NODE_ARCH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            listen_addr: non_empty("LISTEN_ADDR").unwrap_or_else(Self::default_listen_addr),
            catalog_path: non_empty("CATALOG_PATH").map(PathBuf::from),
            arch: non_empty("NODE_ARCH"),
        }
    }

    /// The controller configuration derived from this one.
    #[must_use]
    pub fn control_config(&self) -> ControlConfig {
        ControlConfig {
            arch: self.arch.clone(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            catalog_path: None,
            arch: None,
        }
    }
}
