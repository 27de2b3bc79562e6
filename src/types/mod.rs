// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod observations and the node taint marker.

pub mod pod;
pub mod taint;

pub use pod::{OwnerRef, PodObservation, PodPhase};
pub use taint::{TaintEffect, TaintState};
