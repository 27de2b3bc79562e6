// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::{HashMap, HashSet};

/// Which watched pods are currently unhealthy on each node
#[derive(Debug, Default)]
pub struct UnhealthyTracker {
    by_node: HashMap<String, HashSet<String>>,
    node_of: HashMap<String, String>,
}

impl UnhealthyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest health of `pod` on `node`
    pub fn record(&mut self, pod: &str, node: &str, healthy: bool) {
        self.forget(pod);
        if !healthy {
            self.by_node
                .entry(node.to_string())
                .or_default()
                .insert(pod.to_string());
            self.node_of.insert(pod.to_string(), node.to_string());
        }
    }

    pub fn forget(&mut self, pod: &str) {
        let Some(node) = self.node_of.remove(pod) else {
            return;
        };
        if let Some(pods) = self.by_node.get_mut(&node) {
            pods.remove(pod);
            if pods.is_empty() {
                self.by_node.remove(&node);
            }
        }
    }

    pub fn is_unhealthy(&self, node: &str) -> bool {
        self.by_node.contains_key(node)
    }

    #[cfg(test)]
    pub fn unhealthy_count(&self, node: &str) -> usize {
        self.by_node.get(node).map_or(0, HashSet::len)
    }
}
