// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DavyJonesError {
    #[error("Failed to fetch node {node}: {source}")]
    NodeFetch {
        node: String,
        #[source]
        source: kube::Error,
    },

    #[error("Conflicting update on node {node}: {source}")]
    UpdateConflict {
        node: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to write node {node}: {source}")]
    NodeWrite {
        node: String,
        #[source]
        source: kube::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Pod watch failed: {0}")]
    WatchError(String),
}

/// Coarse classification of a [`DavyJonesError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Conflict,
    Write,
    Config,
    Watch,
}

impl DavyJonesError {
    /// Classify a failed node read
    pub fn fetch(node: &str, source: kube::Error) -> Self {
        DavyJonesError::NodeFetch {
            node: node.to_string(),
            source,
        }
    }

    /// Classify a failed node write; HTTP 409 is a lost optimistic-concurrency race
    pub fn write(node: &str, source: kube::Error) -> Self {
        match &source {
            kube::Error::Api(resp) if resp.code == 409 => DavyJonesError::UpdateConflict {
                node: node.to_string(),
                source,
            },
            _ => DavyJonesError::NodeWrite {
                node: node.to_string(),
                source,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DavyJonesError::NodeFetch { .. } => ErrorKind::Fetch,
            DavyJonesError::UpdateConflict { .. } => ErrorKind::Conflict,
            DavyJonesError::NodeWrite { .. } => ErrorKind::Write,
            DavyJonesError::ConfigError(_) => ErrorKind::Config,
            DavyJonesError::WatchError(_) => ErrorKind::Watch,
        }
    }

    /// Whether repeating the whole fetch-and-write cycle could succeed.
    /// A node that does not exist will not appear by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            DavyJonesError::NodeFetch {
                source: kube::Error::Api(resp),
                ..
            } => resp.code != 404,
            DavyJonesError::NodeFetch { .. }
            | DavyJonesError::UpdateConflict { .. }
            | DavyJonesError::NodeWrite { .. } => true,
            DavyJonesError::ConfigError(_) | DavyJonesError::WatchError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DavyJonesError>;
