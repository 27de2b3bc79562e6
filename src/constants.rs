// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The well-known taint this controller owns on nodes
pub mod taint {
    /// Taint key; the controller never touches taints with any other key
    pub const KEY: &str = "taint.davyjones.github.com";
    pub const VALUE: &str = "true";
}

/// Owner reference kind that identifies daemonset pods
pub const DAEMONSET_KIND: &str = "DaemonSet";

/// Namespace the pod watcher observes unless overridden
pub const DEFAULT_WATCH_NAMESPACE: &str = "kube-system";

/// Configuration file path used when DAVYJONES_CONFIG is unset
pub const DEFAULT_CONFIG_PATH: &str = "/davyjones.yaml";

/// Defaults for the backoff retry policy
pub mod retry {
    pub const MAX_ATTEMPTS: u32 = 5;
    pub const INITIAL_INTERVAL_MS: u64 = 200;
    /// Exponential backoff cap
    pub const MAX_INTERVAL_MS: u64 = 5_000;
}

/// Capacity of the channel between the pod watcher and the observer
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
