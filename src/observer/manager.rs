// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod observer - turns pod notifications into node taint decisions.

use crate::config::{Config, DecisionMode};
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::observer::tracker::UnhealthyTracker;
use crate::reconcilers::NodeTainter;
use crate::types::PodObservation;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

/// Pod notifications delivered by the watcher
#[derive(Debug, Clone)]
pub enum PodEvent {
    /// A pod was seen for the first time
    Added(PodObservation),
    /// A known pod changed
    Updated {
        old: PodObservation,
        new: PodObservation,
    },
    /// A pod went away
    Deleted(PodObservation),
}

/// Handle to send events to the PodObserver
#[derive(Clone)]
pub struct PodEventHandle {
    event_tx: mpsc::Sender<PodEvent>,
}

impl PodEventHandle {
    /// Queue an event, waiting while the channel is full.
    /// Returns false once the observer has stopped.
    pub async fn send(&self, event: PodEvent) -> bool {
        if let Err(e) = self.event_tx.send(event).await {
            error!("Failed to send event to PodObserver: {}", e);
            return false;
        }
        true
    }
}

/// Consumes pod events one at a time and applies the resulting decisions
/// before taking the next event.
pub struct PodObserver<T> {
    tainter: T,
    config: Arc<Config>,
    event_rx: mpsc::Receiver<PodEvent>,
    tracker: UnhealthyTracker,
}

impl<T: NodeTainter> PodObserver<T> {
    pub fn new(tainter: T, config: Arc<Config>) -> (Self, PodEventHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let observer = Self {
            tainter,
            config,
            event_rx,
            tracker: UnhealthyTracker::new(),
        };

        let handle = PodEventHandle { event_tx };
        (observer, handle)
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(
            "PodObserver started, watching {} daemonsets in {:?} mode",
            self.config.watched_daemon_sets.len(),
            self.config.decision_mode
        );

        while let Some(event) = self.event_rx.recv().await {
            self.handle_event(event).await;
        }

        info!("Pod event stream closed, PodObserver stopping");
        Ok(())
    }

    /// Handle one notification. Returns the number of taint decisions issued.
    pub async fn handle_event(&mut self, event: PodEvent) -> usize {
        match event {
            PodEvent::Added(pod) => {
                info!(pod = %pod.name, namespace = %pod.namespace, "New pod detected");
                self.seed_tracker(&pod);
                0
            }
            PodEvent::Deleted(pod) => {
                info!(pod = %pod.name, namespace = %pod.namespace, "Pod has been deleted");
                if self.config.decision_mode == DecisionMode::Aggregated {
                    self.tracker.forget(&pod.key());
                }
                0
            }
            PodEvent::Updated { old, new } => self.handle_update(&old, &new).await,
        }
    }

    #[instrument(skip_all, fields(pod = %new.name, namespace = %new.namespace))]
    async fn handle_update(&mut self, old: &PodObservation, new: &PodObservation) -> usize {
        if old.phase != new.phase {
            info!(
                old_phase = %old.phase,
                new_phase = %new.phase,
                node = new.node().unwrap_or_default(),
                "Pod has changed status phase"
            );
        } else {
            debug!(phase = %new.phase, "Pod updated");
        }

        let config = Arc::clone(&self.config);
        let mut decisions = 0;

        for ds in config
            .watched_daemon_sets
            .iter()
            .filter(|ds| ds.namespace == new.namespace)
        {
            for owner in new.daemonset_owners(&ds.name) {
                debug!(daemonset = %owner.name, "Pod belongs to a watched daemonset");

                let Some(node) = new.node() else {
                    debug!("Pod has no node assigned, nothing to taint");
                    continue;
                };

                let want_taint = self.wanted_taint(new, node);
                self.issue(new, node, want_taint).await;
                decisions += 1;
            }
        }

        decisions
    }

    /// Record the health of a newly seen watched pod without deciding anything,
    /// so pods already unhealthy at startup keep their node tainted.
    fn seed_tracker(&mut self, pod: &PodObservation) {
        if self.config.decision_mode != DecisionMode::Aggregated || !self.is_watched(pod) {
            return;
        }
        if let Some(node) = pod.node() {
            debug!(pod = %pod.name, node, phase = %pod.phase, "Tracking pod health");
            self.tracker.record(&pod.key(), node, pod.phase.is_running());
        }
    }

    fn is_watched(&self, pod: &PodObservation) -> bool {
        self.config
            .watched_daemon_sets
            .iter()
            .filter(|ds| ds.namespace == pod.namespace)
            .any(|ds| pod.daemonset_owners(&ds.name).next().is_some())
    }

    fn wanted_taint(&mut self, pod: &PodObservation, node: &str) -> bool {
        let healthy = pod.phase.is_running();
        match self.config.decision_mode {
            DecisionMode::PerEvent => !healthy,
            DecisionMode::Aggregated => {
                self.tracker.record(&pod.key(), node, healthy);
                self.tracker.is_unhealthy(node)
            }
        }
    }

    async fn issue(&self, pod: &PodObservation, node: &str, want_taint: bool) {
        if want_taint {
            debug!(node, phase = %pod.phase, "Tainting node");
        } else {
            debug!(node, phase = %pod.phase, "Ensuring node is not tainted");
        }

        if let Err(e) = self.tainter.set_node_taint(node, want_taint).await {
            error!(
                pod = %pod.name,
                node,
                phase = %pod.phase,
                kind = ?e.kind(),
                error = %e,
                "Unable to change node taint"
            );
        }
    }
}
