// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decoded registry credentials

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use std::fmt;

use crate::credentials::source::AuthorizationData;
use crate::error::{RefresherError, Result};

/// A decoded registry credential. Never mutated; a refresh produces a new value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub registry_host: String,
    pub username: String,
    pub password: String,
    pub valid_until: DateTime<Utc>,
}

impl Credential {
    /// Decode a registry authorization record into a credential.
    ///
    /// The token must be base64 of exactly `username:password`; anything else,
    /// or a record missing its endpoint, token or expiry, is a malformed token.
    pub fn from_authorization_data(data: &AuthorizationData) -> Result<Self> {
        let endpoint = data
            .proxy_endpoint
            .as_deref()
            .ok_or_else(|| RefresherError::MalformedToken("missing proxy endpoint".to_string()))?;
        let token = data
            .authorization_token
            .as_deref()
            .ok_or_else(|| RefresherError::MalformedToken("missing authorization token".to_string()))?;
        let valid_until = data
            .expires_at
            .ok_or_else(|| RefresherError::MalformedToken("missing expiry".to_string()))?;

        let decoded = STANDARD
            .decode(token)
            .map_err(|e| RefresherError::MalformedToken(format!("invalid base64: {}", e)))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|e| RefresherError::MalformedToken(format!("invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = decoded.split(':').collect();
        let [username, password] = parts.as_slice() else {
            return Err(RefresherError::MalformedToken(format!(
                "expected 'username:password', got {} part(s)",
                parts.len()
            )));
        };

        Ok(Credential {
            registry_host: endpoint.strip_prefix("https://").unwrap_or(endpoint).to_string(),
            username: username.to_string(),
            password: password.to_string(),
            valid_until,
        })
    }

    /// The base64 `username:password` token used in docker config `auth` fields
    pub fn auth_token(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("registry_host", &self.registry_host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("valid_until", &self.valid_until)
            .finish()
    }
}
