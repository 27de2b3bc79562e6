// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking the Kubernetes node API.

use crate::constants::taint;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::{Node, NodeSpec, Taint};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

const NODES_PATH: &str = "/api/v1/nodes/";

/// A mock API server that keeps nodes in memory.
///
/// GET returns the stored node, PUT replaces it when the resourceVersion
/// matches (409 otherwise) and bumps the version. One-shot responses queued
/// with [`MockService::respond_once`] take precedence over the stored state.
#[derive(Clone, Default)]
pub struct MockService {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    nodes: HashMap<String, Node>,
    one_shot: HashMap<(String, String), VecDeque<(u16, String)>>,
    requests: Vec<(String, String)>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node, assigning resourceVersion "1" if it has none
    pub fn with_node(self, mut node: Node) -> Self {
        let name = node.metadata.name.clone().unwrap_or_default();
        node.metadata
            .resource_version
            .get_or_insert_with(|| "1".to_string());
        self.state.lock().unwrap().nodes.insert(name, node);
        self
    }

    /// Answer the next request with this method and path with a fixed response
    pub fn respond_once(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .one_shot
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    pub fn node(&self, name: &str) -> Option<Node> {
        self.state.lock().unwrap().nodes.get(name).cloned()
    }

    /// Number of requests seen with the given method
    pub fn count(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

impl MockState {
    fn handle(&mut self, method: &str, path: &str, body: &[u8]) -> (u16, String) {
        self.requests.push((method.to_string(), path.to_string()));

        if let Some(queue) = self.one_shot.get_mut(&(method.to_string(), path.to_string())) {
            if let Some(resp) = queue.pop_front() {
                return resp;
            }
        }

        let Some(name) = path.strip_prefix(NODES_PATH) else {
            return (404, not_found_json("path", path));
        };

        match method {
            "GET" => match self.nodes.get(name) {
                Some(node) => (200, serde_json::to_string(node).unwrap()),
                None => (404, not_found_json("nodes", name)),
            },
            "PUT" => {
                let Some(stored) = self.nodes.get(name) else {
                    return (404, not_found_json("nodes", name));
                };
                let mut incoming: Node = serde_json::from_slice(body).unwrap();
                let current = stored.metadata.resource_version.clone().unwrap_or_default();
                if incoming.metadata.resource_version.as_deref() != Some(current.as_str()) {
                    return (409, conflict_json(name));
                }
                let next = current.parse::<u64>().unwrap_or(0) + 1;
                incoming.metadata.resource_version = Some(next.to_string());
                let out = serde_json::to_string(&incoming).unwrap();
                self.nodes.insert(name.to_string(), incoming);
                (200, out)
            }
            _ => (405, not_found_json("method", method)),
        }
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let body = req.into_body().collect().await?.to_bytes();

            let (status, body) = state.lock().unwrap().handle(&method, &path, &body);

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A node carrying the given taints
pub fn make_node(name: &str, taints: Vec<Taint>) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(NodeSpec {
            taints: if taints.is_empty() { None } else { Some(taints) },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// A taint this controller does not own
pub fn foreign_taint() -> Taint {
    Taint {
        key: "dedicated".to_string(),
        value: Some("gpu".to_string()),
        effect: "NoSchedule".to_string(),
        time_added: None,
    }
}

/// Taints on a node that carry the controller's key
pub fn markers(node: &Node) -> Vec<Taint> {
    node.spec
        .as_ref()
        .and_then(|s| s.taints.clone())
        .unwrap_or_default()
        .into_iter()
        .filter(|t| t.key == taint::KEY)
        .collect()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a 409 conflict response
pub fn conflict_json(name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("Operation cannot be fulfilled on nodes \"{}\": the object has been modified", name),
        "reason": "Conflict",
        "code": 409
    })
    .to_string()
}

/// Create a 500 internal error response
pub fn internal_error_json() -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": "etcdserver: request timed out",
        "reason": "InternalError",
        "code": 500
    })
    .to_string()
}
