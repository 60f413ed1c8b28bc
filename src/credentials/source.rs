// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry token sources

use async_trait::async_trait;
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::AuthorizationData as EcrAuthorizationData;
use aws_sdk_ecr::Client as EcrClient;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::error::{RefresherError, Result};

/// One authorization record as issued by the registry
#[derive(Clone, Debug, Default)]
pub struct AuthorizationData {
    /// Registry endpoint, usually `https://<host>`
    pub proxy_endpoint: Option<String>,
    /// Base64-encoded `username:password`
    pub authorization_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Issues registry authorization tokens on demand
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetch authorization data for the configured registry.
    async fn authorization_data(&self) -> Result<Vec<AuthorizationData>>;
}

/// Token source backed by the Amazon ECR `GetAuthorizationToken` API
#[derive(Clone, Debug)]
pub struct EcrTokenSource {
    client: EcrClient,
}

impl EcrTokenSource {
    pub fn new(client: EcrClient) -> Self {
        Self { client }
    }

    /// Build a client from the AWS environment (region, credentials, profile)
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(EcrClient::new(&config))
    }
}

#[async_trait]
impl TokenSource for EcrTokenSource {
    #[instrument(skip(self))]
    async fn authorization_data(&self) -> Result<Vec<AuthorizationData>> {
        let output = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| RefresherError::SourceError(DisplayErrorContext(&e).to_string()))?;

        let records: Vec<AuthorizationData> = output
            .authorization_data()
            .iter()
            .map(AuthorizationData::from)
            .collect();

        debug!("ECR returned {} authorization record(s)", records.len());
        Ok(records)
    }
}

/// An expiry outside chrono's range becomes `None`, which later decodes as a
/// malformed token.
impl From<&EcrAuthorizationData> for AuthorizationData {
    fn from(data: &EcrAuthorizationData) -> Self {
        AuthorizationData {
            proxy_endpoint: data.proxy_endpoint().map(str::to_string),
            authorization_token: data.authorization_token().map(str::to_string),
            expires_at: data
                .expires_at()
                .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
        }
    }
}
