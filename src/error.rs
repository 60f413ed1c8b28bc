// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefresherError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Token source error: {0}")]
    SourceError(String),

    #[error("Registry returned a malformed token: {0}")]
    MalformedToken(String),

    #[error("Expected a single authorization record (got {0})")]
    UnexpectedResultCount(usize),

    #[error("No registry credential is currently available")]
    NotReady,

    #[error("Failed to list target namespaces: {0}")]
    ListError(String),

    #[error("Failed to write secret {namespace}/{name}: {reason}")]
    SecretWriteError {
        namespace: String,
        name: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RefresherError>;
