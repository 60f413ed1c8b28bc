// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;

/// The operator name, recorded on the secrets it creates
pub const OPERATOR_NAME: &str = "ecr-credentials-refresher";

/// Kubernetes label keys set on projected secrets
pub mod labels {
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
}

/// Docker registry secret layout
pub mod dockerconfig {
    pub const SECRET_TYPE: &str = "kubernetes.io/dockerconfigjson";
    pub const DATA_KEY: &str = ".dockerconfigjson";
    /// Placeholder email; the registry ignores it but the format requires one
    pub const EMAIL: &str = "none";
}

/// Credential refresh scheduling
pub mod refresh {
    use super::Duration;

    /// How long before expiry a token is replaced
    pub const SAFETY_MARGIN: Duration = Duration::from_secs(60);
    /// Wait after a failed refresh before trying again
    pub const FAILURE_BACKOFF: Duration = Duration::from_secs(60);
}
