// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes watch plumbing for pods.

pub mod watch;

pub use watch::{PodCache, PodWatcher};
