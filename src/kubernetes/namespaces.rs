// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Target namespace resolution

use crate::error::{RefresherError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::{debug, instrument};

/// Which namespaces receive the registry secret
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamespaceSelector {
    /// Every namespace in the cluster, resolved at each cycle
    All,
    /// A fixed list, used verbatim
    Explicit(Vec<String>),
}

impl NamespaceSelector {
    /// An empty selector means all namespaces; anything else is split on `,`
    /// without trimming or validation.
    pub fn parse(selector: &str) -> Self {
        if selector.is_empty() {
            NamespaceSelector::All
        } else {
            NamespaceSelector::Explicit(selector.split(',').map(str::to_string).collect())
        }
    }
}

/// Resolve the selector into namespace names. Only `All` queries the cluster.
#[instrument(skip(client))]
pub async fn list_target_namespaces(
    client: &Client,
    selector: &NamespaceSelector,
) -> Result<Vec<String>> {
    match selector {
        NamespaceSelector::Explicit(names) => Ok(names.clone()),
        NamespaceSelector::All => {
            let namespaces: Api<Namespace> = Api::all(client.clone());
            let list = namespaces
                .list(&ListParams::default())
                .await
                .map_err(|e| RefresherError::ListError(e.to_string()))?;

            let names: Vec<String> = list.items.iter().map(|n| n.name_any()).collect();
            debug!("Found {} namespaces in the cluster", names.len());
            Ok(names)
        }
    }
}
