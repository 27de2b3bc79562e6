// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Node reconcilers that apply taint decisions.

pub mod taint;

pub use taint::{NodeTainter, RetryPolicy, TaintReconciler};
