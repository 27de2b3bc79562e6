// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod watch stream, translated into add/update/delete notifications.

use crate::error::DavyJonesError;
use crate::observer::{PodEvent, PodEventHandle};
use crate::types::PodObservation;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use kube_runtime::watcher::Event;
use kube_runtime::{watcher, WatchStreamExt};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Last seen observation of every pod, so that updates carry the old state.
///
/// A relist (Init .. InitDone) reports pods still present as updates and
/// pods that vanished while the watch was down as deletions.
#[derive(Debug, Default)]
pub struct PodCache {
    pods: HashMap<String, PodObservation>,
    relisted: Option<HashSet<String>>,
}

impl PodCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }

    pub fn apply(&mut self, event: Event<Pod>) -> Vec<PodEvent> {
        match event {
            Event::Init => {
                self.relisted = Some(HashSet::new());
                Vec::new()
            }
            Event::InitApply(pod) => {
                let obs = PodObservation::from(&pod);
                if let Some(seen) = self.relisted.as_mut() {
                    seen.insert(obs.key());
                }
                vec![self.upsert(obs)]
            }
            Event::InitDone => {
                let Some(seen) = self.relisted.take() else {
                    return Vec::new();
                };
                let gone: Vec<String> = self
                    .pods
                    .keys()
                    .filter(|k| !seen.contains(*k))
                    .cloned()
                    .collect();
                gone.into_iter()
                    .filter_map(|k| self.pods.remove(&k))
                    .map(PodEvent::Deleted)
                    .collect()
            }
            Event::Apply(pod) => vec![self.upsert(PodObservation::from(&pod))],
            Event::Delete(pod) => {
                let obs = PodObservation::from(&pod);
                self.pods.remove(&obs.key());
                vec![PodEvent::Deleted(obs)]
            }
        }
    }

    fn upsert(&mut self, new: PodObservation) -> PodEvent {
        match self.pods.insert(new.key(), new.clone()) {
            Some(old) => PodEvent::Updated { old, new },
            None => PodEvent::Added(new),
        }
    }
}

/// Watches pods in one namespace and feeds the observer
pub struct PodWatcher {
    client: Client,
    namespace: String,
    handle: PodEventHandle,
}

impl PodWatcher {
    pub fn new(client: Client, namespace: &str, handle: PodEventHandle) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            handle,
        }
    }

    /// Runs until the observer stops receiving events
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn run(self) -> anyhow::Result<()> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        let mut stream = watcher(pods, watcher::Config::default())
            .default_backoff()
            .boxed();
        let mut cache = PodCache::new();

        info!("Starting pod watch");

        while let Some(item) = stream.next().await {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    let err = DavyJonesError::WatchError(e.to_string());
                    warn!(kind = ?err.kind(), error = %err, "Backing off");
                    continue;
                }
            };

            for notification in cache.apply(event) {
                if !self.handle.send(notification).await {
                    info!("PodObserver gone, stopping pod watch");
                    return Ok(());
                }
            }
            debug!(cached = cache.len(), "Pod cache updated");
        }

        warn!("Pod watch stream ended");
        Ok(())
    }
}
