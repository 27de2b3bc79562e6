// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{retry, DEFAULT_CONFIG_PATH, DEFAULT_WATCH_NAMESPACE};
use crate::error::{DavyJonesError, Result};
use crate::reconcilers::RetryPolicy;
use crate::types::taint::TaintEffect;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Process settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path of the YAML configuration file
    pub config_path: PathBuf,
    /// Namespace whose pods are watched
    pub namespace: String,
    /// Verbose logging for this crate when RUST_LOG is unset
    pub debug: bool,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Self {
        let config_path = env::var("DAVYJONES_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let namespace =
            env::var("DAVYJONES_NAMESPACE").unwrap_or_else(|_| DEFAULT_WATCH_NAMESPACE.to_string());
        let debug: bool = env::var("DAVYJONES_DEBUG")
            .unwrap_or("false".to_string())
            .parse()
            .unwrap_or(false);

        Settings {
            config_path,
            namespace,
            debug,
        }
    }
}

/// A DaemonSet whose pods drive taint decisions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DaemonSetRef {
    pub namespace: String,
    pub name: String,
}

/// Reserved for node filtering; parsed but not consulted by decisions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeLabel {
    pub label: String,
    pub value: String,
}

/// How a pod update is turned into the wanted taint state of its node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionMode {
    /// Taint while any watched pod on the node is unhealthy
    #[default]
    Aggregated,
    /// The latest pod update alone decides, last writer wins
    PerEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RetryKind {
    #[default]
    None,
    Backoff,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    pub policy: RetryKind,
    pub max_attempts: Option<u32>,
    pub initial_interval_ms: Option<u64>,
    pub max_interval_ms: Option<u64>,
}

/// Controller configuration read from the YAML file.
/// Immutable once loaded; shared as `Arc<Config>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    #[serde(rename = "daemonSets", alias = "watchedDaemonSets", alias = "daemonsets")]
    pub watched_daemon_sets: Vec<DaemonSetRef>,
    #[serde(rename = "evict", alias = "evictOnTaint")]
    pub evict_on_taint: bool,
    #[serde(alias = "nodelabels")]
    pub node_labels: Vec<NodeLabel>,
    pub decision_mode: DecisionMode,
    pub retry: RetryConfig,
}

impl Config {
    /// Read and validate the configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DavyJonesError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(raw)
            .map_err(|e| DavyJonesError::ConfigError(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for ds in &self.watched_daemon_sets {
            if ds.namespace.is_empty() || ds.name.is_empty() {
                return Err(DavyJonesError::ConfigError(format!(
                    "DaemonSet entry needs both namespace and name, got {:?}",
                    ds
                )));
            }
        }
        if self.retry.max_attempts == Some(0) {
            return Err(DavyJonesError::ConfigError(
                "retry.maxAttempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The effect the taint carries under this configuration
    pub fn taint_effect(&self) -> TaintEffect {
        if self.evict_on_taint {
            TaintEffect::NoExecute
        } else {
            TaintEffect::NoSchedule
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.retry.policy {
            RetryKind::None => RetryPolicy::None,
            RetryKind::Backoff => RetryPolicy::Backoff {
                max_attempts: self.retry.max_attempts.unwrap_or(retry::MAX_ATTEMPTS),
                initial_interval: Duration::from_millis(
                    self.retry
                        .initial_interval_ms
                        .unwrap_or(retry::INITIAL_INTERVAL_MS),
                ),
                max_interval: Duration::from_millis(
                    self.retry.max_interval_ms.unwrap_or(retry::MAX_INTERVAL_MS),
                ),
            },
        }
    }
}
