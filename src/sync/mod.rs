// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret projection and the reconcile cycle.

pub mod manager;
pub mod secrets;

pub use manager::{CycleReport, SyncManager};
pub use secrets::{create_or_update_secret, project_secret, ReconcileOutcome};
