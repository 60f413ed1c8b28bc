// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Background credential refresher.
//!
//! The refresher owns a single credential slot. Its loop is the only writer;
//! every write replaces the whole value, so readers see either no credential
//! or a complete one. A failed refresh clears the slot so an expiring
//! credential is never handed out.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::constants::refresh::{FAILURE_BACKOFF, SAFETY_MARGIN};
use crate::credentials::{Credential, TokenSource};
use crate::error::{RefresherError, Result};

pub struct CredentialRefresher {
    source: Arc<dyn TokenSource>,
    current: watch::Sender<Option<Arc<Credential>>>,
    safety_margin: Duration,
    failure_backoff: Duration,
}

impl CredentialRefresher {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            source,
            current,
            safety_margin: SAFETY_MARGIN,
            failure_backoff: FAILURE_BACKOFF,
        }
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn with_failure_backoff(mut self, backoff: Duration) -> Self {
        self.failure_backoff = backoff;
        self
    }

    /// The current credential, or `NotReady` if none is held. Never waits on a refresh.
    pub fn get(&self) -> Result<Arc<Credential>> {
        self.current.borrow().clone().ok_or(RefresherError::NotReady)
    }

    /// Observe every replacement of the credential slot
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Credential>>> {
        self.current.subscribe()
    }

    /// Fetch and decode a fresh credential from the token source, exactly once.
    pub async fn refresh_once(&self) -> Result<Credential> {
        let records = self.source.authorization_data().await?;
        let [record] = records.as_slice() else {
            return Err(RefresherError::UnexpectedResultCount(records.len()));
        };
        Credential::from_authorization_data(record)
    }

    /// Refresh, publish the outcome to the slot, and return when the next
    /// refresh is due.
    #[instrument(skip(self))]
    pub async fn refresh_and_schedule(&self) -> Instant {
        debug!("Attempting to refresh registry credentials");

        let wait = match self.refresh_once().await {
            Ok(credential) => {
                let remaining = (credential.valid_until - Utc::now())
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                info!(
                    "Registry credentials for {} refreshed, valid until {}",
                    credential.registry_host,
                    credential.valid_until.to_rfc3339()
                );
                self.current.send_replace(Some(Arc::new(credential)));
                remaining.saturating_sub(self.safety_margin)
            }
            Err(e) => {
                error!("Failed to refresh registry credentials: {}", e);
                self.current.send_replace(None);
                self.failure_backoff
            }
        };

        debug!("Holding on refreshing registry credentials for {:?}", wait);
        Instant::now() + wait
    }

    /// Run the refresh loop until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Credential refresher started");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = self.refresh_and_schedule() => next,
            };

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = sleep_until(next) => {}
            }
        }

        info!("Credential refresher stopped");
    }
}
