// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod observation and taint decisions.

pub mod manager;
mod tracker;

pub use manager::{PodEvent, PodEventHandle, PodObserver};
