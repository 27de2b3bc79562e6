// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The well-known node taint and pure taint-list edits.

use crate::constants::taint;
use k8s_openapi::api::core::v1::{Node, Taint};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaintEffect {
    /// No new pods, existing pods left alone
    NoSchedule,
    /// No new pods, existing pods evicted
    NoExecute,
}

impl TaintEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaintEffect::NoSchedule => "NoSchedule",
            TaintEffect::NoExecute => "NoExecute",
        }
    }
}

impl fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived per-node state; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaintState {
    Tainted,
    Untainted,
}

/// Build the controller's marker taint with the given effect
pub fn marker(effect: TaintEffect) -> Taint {
    Taint {
        key: taint::KEY.to_string(),
        value: Some(taint::VALUE.to_string()),
        effect: effect.as_str().to_string(),
        time_added: None,
    }
}

/// Taints currently on the node, empty when it has none
pub fn node_taints(node: &Node) -> Vec<Taint> {
    node.spec
        .as_ref()
        .and_then(|spec| spec.taints.clone())
        .unwrap_or_default()
}

pub fn taint_state(node: &Node) -> TaintState {
    let tainted = node
        .spec
        .as_ref()
        .and_then(|spec| spec.taints.as_ref())
        .is_some_and(|taints| taints.iter().any(|t| t.key == taint::KEY));

    if tainted {
        TaintState::Tainted
    } else {
        TaintState::Untainted
    }
}

/// Put `new` into the list, replacing every taint with the same key.
/// The replacement keeps the position of the first replaced taint.
/// Returns whether the list changed.
pub fn add_or_update_taint(taints: &mut Vec<Taint>, new: Taint) -> bool {
    let same_key = taints.iter().filter(|t| t.key == new.key).count();
    let identical = taints
        .iter()
        .any(|t| t.key == new.key && t.value == new.value && t.effect == new.effect);
    if same_key == 1 && identical {
        return false;
    }

    let position = taints.iter().position(|t| t.key == new.key);
    taints.retain(|t| t.key != new.key);
    match position {
        Some(pos) => taints.insert(pos, new),
        None => taints.push(new),
    }
    true
}

/// Drop every taint with `key`. Returns whether anything was removed.
pub fn delete_taints_by_key(taints: &mut Vec<Taint>, key: &str) -> bool {
    let before = taints.len();
    taints.retain(|t| t.key != key);
    taints.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::NodeSpec;

    fn other_taint() -> Taint {
        Taint {
            key: "dedicated".to_string(),
            value: Some("gpu".to_string()),
            effect: "NoSchedule".to_string(),
            time_added: None,
        }
    }

    #[test]
    fn test_marker_shape() {
        let t = marker(TaintEffect::NoExecute);
        assert_eq!(t.key, "taint.davyjones.github.com");
        assert_eq!(t.value.as_deref(), Some("true"));
        assert_eq!(t.effect, "NoExecute");
    }

    #[test]
    fn test_add_appends_when_absent() {
        let mut taints = vec![other_taint()];
        assert!(add_or_update_taint(&mut taints, marker(TaintEffect::NoSchedule)));
        assert_eq!(taints.len(), 2);
        assert_eq!(taints[0], other_taint());
    }

    #[test]
    fn test_add_twice_keeps_one_marker() {
        let mut taints = Vec::new();
        assert!(add_or_update_taint(&mut taints, marker(TaintEffect::NoSchedule)));
        assert!(!add_or_update_taint(&mut taints, marker(TaintEffect::NoSchedule)));
        assert_eq!(taints.len(), 1);
    }

    #[test]
    fn test_add_updates_effect_in_place() {
        let mut taints = vec![marker(TaintEffect::NoSchedule), other_taint()];
        assert!(add_or_update_taint(&mut taints, marker(TaintEffect::NoExecute)));
        assert_eq!(taints.len(), 2);
        assert_eq!(taints[0].effect, "NoExecute");
        assert_eq!(taints[1], other_taint());
    }

    #[test]
    fn test_add_collapses_duplicate_markers() {
        let mut taints = vec![
            marker(TaintEffect::NoExecute),
            other_taint(),
            marker(TaintEffect::NoSchedule),
        ];
        assert!(add_or_update_taint(&mut taints, marker(TaintEffect::NoExecute)));
        assert_eq!(taints.iter().filter(|t| t.key == taint::KEY).count(), 1);
    }

    #[test]
    fn test_delete_leaves_other_taints() {
        let mut taints = vec![other_taint(), marker(TaintEffect::NoExecute)];
        assert!(delete_taints_by_key(&mut taints, taint::KEY));
        assert_eq!(taints, vec![other_taint()]);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut taints = vec![other_taint()];
        assert!(!delete_taints_by_key(&mut taints, taint::KEY));
        assert_eq!(taints.len(), 1);
    }

    #[test]
    fn test_taint_state() {
        let mut node = Node::default();
        assert_eq!(taint_state(&node), TaintState::Untainted);

        node.spec = Some(NodeSpec {
            taints: Some(vec![other_taint(), marker(TaintEffect::NoSchedule)]),
            ..Default::default()
        });
        assert_eq!(taint_state(&node), TaintState::Tainted);
        assert_eq!(node_taints(&node).len(), 2);
    }
}
