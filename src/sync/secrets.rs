// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry secret projection and idempotent create-or-update

use crate::constants::{dockerconfig, labels, OPERATOR_NAME};
use crate::credentials::Credential;
use crate::error::{RefresherError, Result};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, trace};

/// What `create_or_update_secret` did in one namespace
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
    Unchanged,
}

/// The `.dockerconfigjson` document
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DockerConfigJson {
    pub auths: BTreeMap<String, DockerConfigEntry>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DockerConfigEntry {
    pub username: String,
    pub password: String,
    pub email: String,
    pub auth: String,
}

impl DockerConfigJson {
    pub fn from_credential(credential: &Credential) -> Self {
        let entry = DockerConfigEntry {
            username: credential.username.clone(),
            password: credential.password.clone(),
            email: dockerconfig::EMAIL.to_string(),
            auth: credential.auth_token(),
        };
        DockerConfigJson {
            auths: BTreeMap::from([(credential.registry_host.clone(), entry)]),
        }
    }
}

/// Build the secret that materializes `credential` in `namespace`.
/// The secret is named after the registry host.
pub fn project_secret(credential: &Credential, namespace: &str) -> Result<Secret> {
    let payload = serde_json::to_vec(&DockerConfigJson::from_credential(credential))?;

    Ok(Secret {
        metadata: ObjectMeta {
            name: Some(credential.registry_host.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                labels::MANAGED_BY.to_string(),
                OPERATOR_NAME.to_string(),
            )])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            dockerconfig::DATA_KEY.to_string(),
            ByteString(payload),
        )])),
        type_: Some(dockerconfig::SECRET_TYPE.to_string()),
        ..Default::default()
    })
}

/// Create `desired` in `namespace`, or bring an existing secret's data in line with it.
///
/// An existing secret whose data already matches is left untouched. Otherwise
/// only its data is replaced; all other metadata on the stored object is kept.
#[instrument(skip(client, desired), fields(secret = %desired.metadata.name.as_deref().unwrap_or_default()))]
pub async fn create_or_update_secret(
    client: &Client,
    namespace: &str,
    desired: &Secret,
) -> Result<ReconcileOutcome> {
    let name = desired.metadata.name.clone().unwrap_or_default();
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let write_error = |reason: String| RefresherError::SecretWriteError {
        namespace: namespace.to_string(),
        name: name.clone(),
        reason,
    };

    trace!("Attempting to create secret {}/{}", namespace, name);
    match secrets.create(&PostParams::default(), desired).await {
        Ok(_) => {
            info!("Created secret {}/{}", namespace, name);
            return Ok(ReconcileOutcome::Created);
        }
        Err(kube::Error::Api(err)) if err.code == 409 => {
            trace!("Secret {}/{} already exists", namespace, name);
        }
        Err(e) => return Err(write_error(format!("create failed: {}", e))),
    }

    let mut existing = secrets
        .get(&name)
        .await
        .map_err(|e| write_error(format!("get failed: {}", e)))?;

    if existing.data == desired.data {
        debug!("Secret {}/{} is up to date", namespace, name);
        return Ok(ReconcileOutcome::Unchanged);
    }

    existing.data = desired.data.clone();
    secrets
        .replace(&name, &PostParams::default(), &existing)
        .await
        .map_err(|e| write_error(format!("update failed: {}", e)))?;

    info!("Updated secret {}/{}", namespace, name);
    Ok(ReconcileOutcome::Updated)
}
