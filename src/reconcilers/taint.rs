// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Taint reconciler - makes a node's marker taint match a wanted boolean.

use crate::config::Config;
use crate::constants::taint;
use crate::error::{DavyJonesError, Result};
use crate::types::taint::{
    add_or_update_taint, delete_taints_by_key, marker, node_taints, taint_state,
};
use crate::types::TaintEffect;
use k8s_openapi::api::core::v1::Node;
use kube::{api::PostParams, Api, Client};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Anything that can apply a taint decision to a node
pub trait NodeTainter {
    fn set_node_taint(
        &self,
        node_name: &str,
        want_taint: bool,
    ) -> impl Future<Output = Result<Node>> + Send;
}

/// What to do when a taint change fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Return the first error
    #[default]
    None,
    /// Repeat the fetch-and-write cycle on retryable errors, doubling the
    /// delay between attempts up to `max_interval`
    Backoff {
        max_attempts: u32,
        initial_interval: Duration,
        max_interval: Duration,
    },
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::None => 1,
            RetryPolicy::Backoff { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    /// Delay before attempt `attempt + 1`, `attempt` counting from 1
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Backoff {
                initial_interval,
                max_interval,
                ..
            } => {
                let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                initial_interval
                    .checked_mul(factor)
                    .unwrap_or(*max_interval)
                    .min(*max_interval)
            }
        }
    }
}

pub struct TaintReconciler {
    client: Client,
    effect: TaintEffect,
    retry: RetryPolicy,
}

impl TaintReconciler {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            effect: config.taint_effect(),
            retry: config.retry_policy(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }

    /// Fetch the node, add or remove the marker taint, and write the node
    /// back if its taints changed. Returns the node as it stands afterwards.
    #[instrument(skip(self), fields(effect = %self.effect))]
    pub async fn set_node_taint(&self, node_name: &str, want_taint: bool) -> Result<Node> {
        let mut attempt = 1;
        loop {
            match self.apply(node_name, want_taint).await {
                Ok(node) => return Ok(node),
                Err(e) if attempt < self.retry.max_attempts() && e.is_retryable() => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        attempt,
                        error = %e,
                        "Taint change failed, retrying in {}ms",
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn apply(&self, node_name: &str, want_taint: bool) -> Result<Node> {
        let nodes = self.nodes();
        let mut node = nodes
            .get(node_name)
            .await
            .map_err(|e| DavyJonesError::fetch(node_name, e))?;

        let mut taints = node_taints(&node);
        let changed = if want_taint {
            add_or_update_taint(&mut taints, marker(self.effect))
        } else {
            delete_taints_by_key(&mut taints, taint::KEY)
        };

        if !changed {
            debug!(
                state = ?taint_state(&node),
                "Node {} already in wanted taint state",
                node_name
            );
            return Ok(node);
        }

        node.spec.get_or_insert_with(Default::default).taints =
            if taints.is_empty() { None } else { Some(taints) };

        let updated = nodes
            .replace(node_name, &PostParams::default(), &node)
            .await
            .map_err(|e| DavyJonesError::write(node_name, e))?;

        if want_taint {
            info!("Tainted node {} with {}", node_name, self.effect);
        } else {
            info!("Removed taint from node {}", node_name);
        }

        Ok(updated)
    }
}

impl NodeTainter for TaintReconciler {
    async fn set_node_taint(&self, node_name: &str, want_taint: bool) -> Result<Node> {
        TaintReconciler::set_node_taint(self, node_name, want_taint).await
    }
}
