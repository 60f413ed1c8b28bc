// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation

use crate::error::{RefresherError, Result};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config as KConfig,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Create a Kubernetes client from an explicit kubeconfig file, or infer one
/// (in-cluster service account or `$KUBECONFIG`) when no path is given.
#[instrument]
pub async fn create_client(kubeconfig_path: Option<&Path>) -> Result<Client> {
    let config = match kubeconfig_path {
        Some(path) => {
            info!("Loading kubeconfig from {}", path.display());
            let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                RefresherError::KubeconfigError(format!(
                    "Failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            config_from_kubeconfig(&contents).await?
        }
        None => {
            debug!("No kubeconfig path given, inferring configuration");
            KConfig::infer().await.map_err(|e| {
                RefresherError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?
        }
    };

    Client::try_from(config)
        .map_err(|e| RefresherError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Build a client configuration from a kubeconfig document
async fn config_from_kubeconfig(kubeconfig: &str) -> Result<KConfig> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig).map_err(|e| {
        RefresherError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e))
    })?;

    KConfig::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
        .await
        .map_err(|e| RefresherError::KubeconfigError(format!("Failed to create config: {}", e)))
}
