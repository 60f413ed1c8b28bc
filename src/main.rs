// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ecr_credentials_refresher::config::Config;
use ecr_credentials_refresher::credentials::{CredentialRefresher, EcrTokenSource};
use ecr_credentials_refresher::kubernetes::create_client;
use ecr_credentials_refresher::sync::SyncManager;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // RUST_LOG wins over --log-level when both are set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting ECR credentials refresher");
    info!(
        "Configuration loaded: refresh_interval={:?}, target_namespaces={:?}",
        config.refresh_interval, config.target_namespaces
    );

    let client = create_client(config.path_to_kubeconfig.as_deref()).await?;
    info!("Connected to Kubernetes cluster");

    let source = EcrTokenSource::from_env().await;
    let refresher = Arc::new(CredentialRefresher::new(Arc::new(source)));

    let sync_manager = SyncManager::new(
        client,
        refresher.clone(),
        config.namespace_selector(),
        config.refresh_interval,
    )
    .with_max_concurrency(config.max_concurrency);

    let shutdown = CancellationToken::new();
    let sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(cancel_on_signal(sigterm, shutdown.clone()));

    // Both loops run until the shutdown token is cancelled
    tokio::join!(
        refresher.run(shutdown.clone()),
        sync_manager.run(shutdown.clone())
    );

    info!("Shut down cleanly");
    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM
async fn cancel_on_signal(mut sigterm: Signal, shutdown: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
    }
    shutdown.cancel();
}
