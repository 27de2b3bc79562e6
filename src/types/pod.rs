// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::DAEMONSET_KIND;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use std::fmt;

/// Coarse pod lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// A missing or unrecognized phase is Unknown
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => PodPhase::Pending,
            Some("Running") => PodPhase::Running,
            Some("Succeeded") => PodPhase::Succeeded,
            Some("Failed") => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }

    pub fn is_running(&self) -> bool {
        *self == PodPhase::Running
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

/// Read-only projection of a pod at the moment of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodObservation {
    pub name: String,
    pub namespace: String,
    pub phase: PodPhase,
    pub node_name: Option<String>,
    pub owners: Vec<OwnerRef>,
}

impl PodObservation {
    /// `namespace/name`, unique within the cluster
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Assigned node, if the pod has been scheduled
    pub fn node(&self) -> Option<&str> {
        self.node_name.as_deref().filter(|n| !n.is_empty())
    }

    /// Owner references naming a DaemonSet called `name`
    pub fn daemonset_owners<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OwnerRef> {
        self.owners
            .iter()
            .filter(move |o| o.kind == DAEMONSET_KIND && o.name == name)
    }
}

impl From<&Pod> for PodObservation {
    fn from(pod: &Pod) -> Self {
        PodObservation {
            name: pod.name_any(),
            namespace: pod.namespace().unwrap_or_default(),
            phase: PodPhase::parse(pod.status.as_ref().and_then(|s| s.phase.as_deref())),
            node_name: pod.spec.as_ref().and_then(|s| s.node_name.clone()),
            owners: pod
                .owner_references()
                .iter()
                .map(|o| OwnerRef {
                    kind: o.kind.clone(),
                    name: o.name.clone(),
                })
                .collect(),
        }
    }
}
