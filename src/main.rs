// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use davyjones::config::{Config, Settings};
use davyjones::kubernetes::PodWatcher;
use davyjones::observer::PodObserver;
use davyjones::reconcilers::TaintReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env();

    // Initialize tracing, RUST_LOG wins over the debug switch
    let default_filter = if settings.debug {
        "info,davyjones=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting davyjones taint controller");

    // Load configuration
    let config = Config::from_file(&settings.config_path).with_context(|| {
        format!(
            "Unable to read configuration file {}",
            settings.config_path.display()
        )
    })?;
    info!(
        "Configuration loaded from {}: {} daemonsets, evict={}, namespace={}",
        settings.config_path.display(),
        config.watched_daemon_sets.len(),
        config.evict_on_taint,
        settings.namespace
    );
    for ds in &config.watched_daemon_sets {
        debug!("Watching daemonset {}/{}", ds.namespace, ds.name);
    }
    for label in &config.node_labels {
        debug!(
            "Node label {}={} is reserved and not used for filtering",
            label.label, label.value
        );
    }
    let config = Arc::new(config);

    // Create Kubernetes client
    let client = Client::try_default()
        .await
        .context("Unable to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    let reconciler = TaintReconciler::new(client.clone(), &config);
    let (observer, handle) = PodObserver::new(reconciler, config);
    let watcher = PodWatcher::new(client, &settings.namespace, handle);

    tokio::select! {
        res = async { tokio::try_join!(watcher.run(), observer.run()) } => {
            res?;
            warn!("Pod watch and observer stopped");
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
