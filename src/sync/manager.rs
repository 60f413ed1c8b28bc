// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cycle driver: periodically projects the current credential into every target namespace.

use crate::credentials::{Credential, CredentialRefresher};
use crate::error::Result;
use crate::kubernetes::{list_target_namespaces, NamespaceSelector};
use crate::sync::secrets::{create_or_update_secret, project_secret, ReconcileOutcome};
use kube::Client;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn, Instrument};

/// Per-cycle tally of namespace outcomes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &Result<ReconcileOutcome>) {
        match outcome {
            Ok(ReconcileOutcome::Created) => self.created += 1,
            Ok(ReconcileOutcome::Updated) => self.updated += 1,
            Ok(ReconcileOutcome::Unchanged) => self.unchanged += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.failed
    }
}

/// Drives reconcile cycles on a fixed interval. Cycles never overlap: each
/// one finishes its whole namespace fan-out before the next tick is taken.
pub struct SyncManager {
    client: Client,
    refresher: Arc<CredentialRefresher>,
    selector: NamespaceSelector,
    interval: Duration,
    max_concurrency: Option<NonZeroUsize>,
}

impl SyncManager {
    pub fn new(
        client: Client,
        refresher: Arc<CredentialRefresher>,
        selector: NamespaceSelector,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            refresher,
            selector,
            interval,
            max_concurrency: None,
        }
    }

    /// Cap the number of namespaces reconciled at once
    pub fn with_max_concurrency(mut self, max_concurrency: Option<NonZeroUsize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!("SyncManager started, waiting for registry credentials...");

        let mut credentials = self.refresher.subscribe();
        while self.refresher.get().is_err() {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                changed = credentials.changed() => {
                    if changed.is_err() {
                        warn!("Credential refresher went away before producing credentials");
                        return;
                    }
                }
            }
        }

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.run_cycle().await {
                Ok(report) => info!(
                    "Cycle complete: {} created, {} updated, {} unchanged, {} failed",
                    report.created, report.updated, report.unchanged, report.failed
                ),
                Err(e) => warn!("Cycle skipped: {}", e),
            }
        }

        info!("SyncManager stopped");
    }

    /// Run one cycle: project the current credential into every target namespace.
    ///
    /// Fails without writing anything if no credential is available or the
    /// namespaces cannot be listed. Per-namespace failures are logged and
    /// counted; they never stop the other namespaces.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let credential = self.refresher.get()?;
        let namespaces = list_target_namespaces(&self.client, &self.selector).await?;

        info!(
            "Reconciling secret {} in {} namespace(s)",
            credential.registry_host,
            namespaces.len()
        );

        let permits = self
            .max_concurrency
            .map_or(namespaces.len().max(1), NonZeroUsize::get);
        let limit = Arc::new(Semaphore::new(permits));

        let mut tasks = JoinSet::new();
        for namespace in namespaces {
            let client = self.client.clone();
            let credential = credential.clone();
            let limit = limit.clone();
            tasks.spawn(
                async move {
                    let _permit = limit.acquire_owned().await;
                    reconcile_namespace(&client, &credential, &namespace).await
                }
                .in_current_span(),
            );
        }

        let mut report = CycleReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    error!("Namespace task did not complete: {}", e);
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}

/// Project and write the secret for one namespace, logging any failure
async fn reconcile_namespace(
    client: &Client,
    credential: &Credential,
    namespace: &str,
) -> Result<ReconcileOutcome> {
    let outcome = match project_secret(credential, namespace) {
        Ok(desired) => create_or_update_secret(client, namespace, &desired).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &outcome {
        error!(
            "Failed to create or update secret in namespace {:?}: {}",
            namespace, e
        );
    }
    outcome
}
